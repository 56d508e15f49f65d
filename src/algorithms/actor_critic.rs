use std::io::Write;

use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::env::Environment;
use crate::error::{AscentError, Result};
use crate::estimator::{PolicyEstimator, ValueEstimator};
use crate::features::FeaturePipeline;

/// One environment step as seen by the learner. Built once per step and
/// consumed immediately by the TD update; never stored or replayed.
#[derive(Clone, Debug)]
pub struct Transition {
    pub state: Array1<f32>,
    pub action: f32,
    pub reward: f32,
    pub next_state: Array1<f32>,
    pub done: bool,
}

/// Per-episode accumulators, finalized when the episode ends.
/// `episode_lengths[i]` is the zero-based index of episode i's final step.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EpisodeStats {
    pub episode_rewards: Vec<f32>,
    pub episode_lengths: Vec<usize>,
}

/// Hyperparameters for the actor-critic run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActorCriticConfig {
    /// Actor step size
    pub policy_lr: f32,
    /// Critic step size; larger than the actor's so the advantage signal
    /// stays useful
    pub value_lr: f32,
    /// Decay on the bootstrapped next-state value (not on the immediate
    /// reward)
    pub discount_factor: f32,
    /// Fixed training budget; no early stopping
    pub n_episodes: usize,
    /// Force the bootstrap term to zero on terminal transitions. Off by
    /// default: the update bootstraps through terminals unless asked not to,
    /// which deviates from canonical TD learning.
    pub zero_terminal_bootstrap: bool,
    /// Call `render` on the environment every step
    pub render: bool,
    /// Stream the single-line step/episode progress counter to stdout
    pub progress: bool,
}

impl Default for ActorCriticConfig {
    fn default() -> Self {
        ActorCriticConfig {
            policy_lr: 0.01,
            value_lr: 0.1,
            discount_factor: 0.95,
            n_episodes: 50,
            zero_terminal_bootstrap: false,
            render: false,
            progress: false,
        }
    }
}

/// Online actor-critic driver: one policy, one critic, one environment,
/// sequential episodes with one TD update per step.
///
/// The fitted feature pipeline is borrowed for the driver's lifetime and
/// shared by both estimators; nothing here refits it.
pub struct ActorCritic<'a> {
    pipeline: &'a FeaturePipeline,
    pub policy: PolicyEstimator,
    pub value: ValueEstimator,
    pub config: ActorCriticConfig,
}

impl<'a> ActorCritic<'a> {
    pub fn new(
        pipeline: &'a FeaturePipeline,
        policy: PolicyEstimator,
        value: ValueEstimator,
        config: ActorCriticConfig,
    ) -> Self {
        ActorCritic {
            pipeline,
            policy,
            value,
            config,
        }
    }

    /// Run the full training budget against `env`, returning per-episode
    /// totals. Any estimator or featurization failure aborts the run.
    pub fn train<E: Environment, R: Rng>(
        &mut self,
        env: &mut E,
        rng: &mut R,
    ) -> Result<EpisodeStats> {
        let n_episodes = self.config.n_episodes;
        let mut stats = EpisodeStats::default();

        for ith_episode in 0..n_episodes {
            let mut state = env.reset();
            let mut episode_reward = 0.0;
            let mut final_step = 0;

            for t in 0.. {
                let action = self.policy.predict(self.pipeline, state.view(), rng)?;
                let (next_state, reward, done) = env.step(action);
                if self.config.render {
                    env.render();
                }

                let transition = Transition {
                    state,
                    action,
                    reward,
                    next_state,
                    done,
                };

                episode_reward += transition.reward;
                final_step = t;

                self.td_step(&transition)?;

                if self.config.progress {
                    let prev_reward = if ith_episode == 0 {
                        0.0
                    } else {
                        stats.episode_rewards[ith_episode - 1]
                    };
                    print!(
                        "\rStep {} @ Episode {}/{} ({})",
                        t,
                        ith_episode + 1,
                        n_episodes,
                        prev_reward
                    );
                    let _ = std::io::stdout().flush();
                }

                if transition.done {
                    break;
                }

                state = transition.next_state;
            }

            stats.episode_rewards.push(episode_reward);
            stats.episode_lengths.push(final_step);
        }

        Ok(stats)
    }

    /// One TD update from a single transition: critic toward the TD target,
    /// actor weighted by the TD error as its advantage estimate.
    fn td_step(&mut self, transition: &Transition) -> Result<()> {
        let value_next = if transition.done && self.config.zero_terminal_bootstrap {
            0.0
        } else {
            self.value.predict(self.pipeline, transition.next_state.view())?
        };
        let td_target = transition.reward + self.config.discount_factor * value_next;
        // Evaluated fresh here and again inside `update`; the two passes are
        // kept independent on purpose.
        let td_error = td_target - self.value.predict(self.pipeline, transition.state.view())?;

        self.value
            .update(self.pipeline, transition.state.view(), td_target)?;
        self.policy.update(
            self.pipeline,
            transition.state.view(),
            td_error,
            transition.action,
        )?;

        Ok(())
    }
}

/// Builder for [`ActorCritic`], in the crate's usual builder style. Action
/// bounds have no sane default and must be supplied.
pub struct ActorCriticBuilder<'a> {
    pipeline: &'a FeaturePipeline,
    action_bounds: Option<(f32, f32)>,
    config: ActorCriticConfig,
}

impl<'a> ActorCriticBuilder<'a> {
    pub fn new(pipeline: &'a FeaturePipeline) -> Self {
        ActorCriticBuilder {
            pipeline,
            action_bounds: None,
            config: ActorCriticConfig::default(),
        }
    }

    pub fn action_bounds(mut self, low: f32, high: f32) -> Self {
        self.action_bounds = Some((low, high));
        self
    }

    pub fn config(mut self, config: ActorCriticConfig) -> Self {
        self.config = config;
        self
    }

    pub fn policy_lr(mut self, lr: f32) -> Self {
        self.config.policy_lr = lr;
        self
    }

    pub fn value_lr(mut self, lr: f32) -> Self {
        self.config.value_lr = lr;
        self
    }

    pub fn discount_factor(mut self, gamma: f32) -> Self {
        self.config.discount_factor = gamma;
        self
    }

    pub fn n_episodes(mut self, n: usize) -> Self {
        self.config.n_episodes = n;
        self
    }

    pub fn build(self) -> Result<ActorCritic<'a>> {
        let (low, high) = self.action_bounds.ok_or_else(|| AscentError::InvalidParameter {
            name: "action_bounds".to_string(),
            reason: "Action bounds not specified".to_string(),
        })?;
        if low >= high {
            return Err(AscentError::invalid_parameter(
                "action_bounds",
                "low must be below high",
            ));
        }

        let feature_dim = self.pipeline.feature_dim();
        let policy = PolicyEstimator::new(feature_dim, low, high, self.config.policy_lr);
        let value = ValueEstimator::new(feature_dim, self.config.value_lr);

        Ok(ActorCritic::new(self.pipeline, policy, value, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureConfig;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Ignores actions, pays a fixed reward, terminates after a fixed number
    /// of steps.
    struct FixedLengthEnv {
        steps_taken: usize,
        episode_length: usize,
        reward: f32,
    }

    impl FixedLengthEnv {
        fn new(episode_length: usize, reward: f32) -> Self {
            FixedLengthEnv {
                steps_taken: 0,
                episode_length,
                reward,
            }
        }
    }

    impl Environment for FixedLengthEnv {
        fn reset(&mut self) -> Array1<f32> {
            self.steps_taken = 0;
            array![0.0, 0.0]
        }

        fn step(&mut self, _action: f32) -> (Array1<f32>, f32, bool) {
            self.steps_taken += 1;
            let done = self.steps_taken >= self.episode_length;
            (array![self.steps_taken as f32 * 0.01, 0.0], self.reward, done)
        }

        fn action_low(&self) -> f32 {
            -1.0
        }

        fn action_high(&self) -> f32 {
            1.0
        }

        fn observation_dim(&self) -> usize {
            2
        }

        fn sample_observation<R: Rng>(&self, rng: &mut R) -> Array1<f32> {
            array![rng.gen_range(-1.0f32..1.0), rng.gen_range(-1.0f32..1.0)]
        }
    }

    fn fitted_pipeline(rng: &mut StdRng) -> FeaturePipeline {
        let env = FixedLengthEnv::new(3, 1.0);
        let samples: Vec<_> = (0..200).map(|_| env.sample_observation(rng)).collect();
        FeaturePipeline::fit(&samples, FeatureConfig::default(), rng).unwrap()
    }

    #[test]
    fn test_builder_requires_action_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let pipeline = fitted_pipeline(&mut rng);

        assert!(ActorCriticBuilder::new(&pipeline).build().is_err());
        assert!(ActorCriticBuilder::new(&pipeline)
            .action_bounds(1.0, -1.0)
            .build()
            .is_err());
        assert!(ActorCriticBuilder::new(&pipeline)
            .action_bounds(-1.0, 1.0)
            .build()
            .is_ok());
    }

    #[test]
    fn test_builder_config_defaults() {
        let mut rng = StdRng::seed_from_u64(1);
        let pipeline = fitted_pipeline(&mut rng);

        let driver = ActorCriticBuilder::new(&pipeline)
            .action_bounds(-1.0, 1.0)
            .build()
            .unwrap();

        assert_eq!(driver.config.policy_lr, 0.01);
        assert_eq!(driver.config.value_lr, 0.1);
        assert_eq!(driver.config.discount_factor, 0.95);
        assert_eq!(driver.config.n_episodes, 50);
        assert!(!driver.config.zero_terminal_bootstrap);
    }

    #[test]
    fn test_single_episode_accounting() {
        // Constant reward 1.0, done after exactly 3 steps: the final step
        // index is 2 and the total reward is 3.0.
        let mut rng = StdRng::seed_from_u64(2);
        let pipeline = fitted_pipeline(&mut rng);
        let mut env = FixedLengthEnv::new(3, 1.0);

        let mut driver = ActorCriticBuilder::new(&pipeline)
            .action_bounds(-1.0, 1.0)
            .n_episodes(1)
            .build()
            .unwrap();

        let stats = driver.train(&mut env, &mut rng).unwrap();
        assert_eq!(stats.episode_lengths, vec![2]);
        assert!((stats.episode_rewards[0] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_multi_episode_totals() {
        let mut rng = StdRng::seed_from_u64(3);
        let pipeline = fitted_pipeline(&mut rng);
        let mut env = FixedLengthEnv::new(5, -0.5);

        let mut driver = ActorCriticBuilder::new(&pipeline)
            .action_bounds(-1.0, 1.0)
            .n_episodes(4)
            .build()
            .unwrap();

        let stats = driver.train(&mut env, &mut rng).unwrap();
        assert_eq!(stats.episode_rewards.len(), 4);
        assert_eq!(stats.episode_lengths, vec![4, 4, 4, 4]);
        for &total in &stats.episode_rewards {
            assert!((total - (-2.5)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_terminal_bootstrap_toggle() {
        // With the toggle on, a one-step episode's TD target is the raw
        // reward, so one critic update moves the value estimate toward it
        // and never past it.
        let mut rng = StdRng::seed_from_u64(4);
        let pipeline = fitted_pipeline(&mut rng);
        let mut env = FixedLengthEnv::new(1, 10.0);

        let mut config = ActorCriticConfig {
            n_episodes: 1,
            zero_terminal_bootstrap: true,
            ..ActorCriticConfig::default()
        };
        config.value_lr = 0.05;

        let mut driver = ActorCriticBuilder::new(&pipeline)
            .action_bounds(-1.0, 1.0)
            .config(config)
            .build()
            .unwrap();

        let stats = driver.train(&mut env, &mut rng).unwrap();
        assert_eq!(stats.episode_lengths, vec![0]);

        let v = driver
            .value
            .predict(&pipeline, array![1.0f32 * 0.01, 0.0].view())
            .unwrap();
        assert!(v > 0.0 && v <= 10.0);
    }

    #[test]
    fn test_training_updates_critic() {
        // A constant positive reward stream should push value estimates up
        // from their zero initialization.
        let mut rng = StdRng::seed_from_u64(5);
        let pipeline = fitted_pipeline(&mut rng);
        let mut env = FixedLengthEnv::new(10, 1.0);

        let mut driver = ActorCriticBuilder::new(&pipeline)
            .action_bounds(-1.0, 1.0)
            .n_episodes(5)
            .build()
            .unwrap();

        driver.train(&mut env, &mut rng).unwrap();

        let v = driver
            .value
            .predict(&pipeline, array![0.05, 0.0].view())
            .unwrap();
        assert!(v > 0.0);
    }
}
