//! # Ascent - Actor-Critic Training for Continuous Control
//!
//! Ascent is a small reinforcement learning crate built around one algorithm:
//! an online actor-critic agent with linear function approximation over a
//! random-Fourier-feature expansion of the observation space. It was written
//! for the continuous mountain car task (a car learning to climb a hill with
//! continuous throttle) but the components are generic over any environment
//! with a scalar bounded action.
//!
//! ## Key Pieces
//!
//! - **Feature Pipeline**: standardization + multi-resolution RBF random
//!   features, fit once from a sample of the observation space
//! - **Policy Estimator**: Gaussian policy with linear mean and scale heads,
//!   updated by TD-error-weighted policy gradient with an entropy bonus
//! - **Value Estimator**: linear state-value head trained on TD targets
//! - **Actor-Critic driver**: single-trajectory online training loop
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ascent::algorithms::ActorCriticBuilder;
//! use ascent::env::{Environment, MountainCarContinuous};
//! use ascent::features::{FeatureConfig, FeaturePipeline};
//! use rand::thread_rng;
//!
//! let mut rng = thread_rng();
//! let mut env = MountainCarContinuous::new();
//!
//! // Fit the feature pipeline from a sample of the observation space
//! let samples: Vec<_> = (0..10_000).map(|_| env.sample_observation(&mut rng)).collect();
//! let pipeline = FeaturePipeline::fit(&samples, FeatureConfig::default(), &mut rng).unwrap();
//!
//! // Train for 50 episodes
//! let mut driver = ActorCriticBuilder::new(&pipeline)
//!     .action_bounds(env.action_low(), env.action_high())
//!     .build()
//!     .unwrap();
//! let stats = driver.train(&mut env, &mut rng).unwrap();
//! println!("final episode reward: {}", stats.episode_rewards.last().unwrap());
//! ```
//!
//! ## Module Organization
//!
//! - [`algorithms`] - The actor-critic training loop and its configuration
//! - [`env`] - Environment trait and the bundled mountain car dynamics
//! - [`error`] - Error types and result handling
//! - [`estimator`] - Policy (actor) and value (critic) estimators
//! - [`features`] - Observation standardization and RBF random features
//! - [`optimizer`] - SGD and Adam parameter updates

pub mod algorithms;
pub mod env;
pub mod error;
pub mod estimator;
pub mod features;
pub mod optimizer;
