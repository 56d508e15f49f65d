//! Continuous mountain car trained with the online actor-critic agent.
//!
//! Fits the feature pipeline from 10,000 observation-space samples, then
//! trains for 50 episodes with a live step/episode counter.

use ascent::algorithms::{ActorCriticBuilder, ActorCriticConfig};
use ascent::env::{Environment, MountainCarContinuous};
use ascent::features::{FeatureConfig, FeaturePipeline};
use rand::thread_rng;

fn main() {
    println!("Mountain Car Continuous Actor-Critic");
    println!("====================================\n");

    let mut rng = thread_rng();
    let mut env = MountainCarContinuous::new();

    println!("Fitting feature pipeline...");
    let observation_samples: Vec<_> = (0..10_000)
        .map(|_| env.sample_observation(&mut rng))
        .collect();
    let pipeline = FeaturePipeline::fit(&observation_samples, FeatureConfig::default(), &mut rng)
        .expect("feature pipeline fit failed");
    println!("Feature dimension: {}\n", pipeline.feature_dim());

    let config = ActorCriticConfig {
        policy_lr: 0.001,
        value_lr: 0.1,
        discount_factor: 0.95,
        n_episodes: 50,
        progress: true,
        ..ActorCriticConfig::default()
    };

    let mut driver = ActorCriticBuilder::new(&pipeline)
        .action_bounds(env.action_low(), env.action_high())
        .config(config)
        .build()
        .expect("driver construction failed");

    println!("Training...");
    let stats = driver.train(&mut env, &mut rng).expect("training run failed");

    println!("\n\nEpisode summary");
    println!("---------------");
    for (i, (reward, length)) in stats
        .episode_rewards
        .iter()
        .zip(stats.episode_lengths.iter())
        .enumerate()
    {
        println!("Episode {:>2}: reward {:>10.2}, length {}", i + 1, reward, length + 1);
    }

    let best = stats
        .episode_rewards
        .iter()
        .cloned()
        .fold(f32::NEG_INFINITY, f32::max);
    println!("\nBest episode reward: {:.2}", best);
}
