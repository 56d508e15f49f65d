use ndarray::ArrayView1;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::LinearHead;
use crate::error::{AscentError, Result};
use crate::features::FeaturePipeline;
use crate::optimizer::{Adam, OptimizerWrapper};

/// Additive floor on sigma. Keeps the distribution strictly positive-width
/// even when the softplus output saturates toward zero.
const SIGMA_FLOOR: f32 = 1e-5;

const LN_TWO_PI: f32 = 1.837_877_1;

/// Gaussian policy over a scalar bounded action (the actor).
///
/// Two linear heads map the feature vector to the distribution's mean and to
/// a pre-activation scale; the scale goes through softplus plus a small floor
/// so sigma stays strictly positive. Actions are sampled from
/// Normal(mu, sigma) and clamped to the environment's action bounds.
#[derive(Serialize, Deserialize, Clone)]
pub struct PolicyEstimator {
    pub mu_head: LinearHead,
    pub sigma_head: LinearHead,
    pub action_low: f32,
    pub action_high: f32,
    pub learning_rate: f32,
    /// Entropy bonus weight; discourages premature collapse to a
    /// deterministic policy.
    pub entropy_coeff: f32,
}

impl PolicyEstimator {
    pub fn new(feature_dim: usize, action_low: f32, action_high: f32, learning_rate: f32) -> Self {
        PolicyEstimator {
            mu_head: LinearHead::new(feature_dim, OptimizerWrapper::Adam(Adam::default_for(feature_dim))),
            sigma_head: LinearHead::new(feature_dim, OptimizerWrapper::Adam(Adam::default_for(feature_dim))),
            action_low,
            action_high,
            learning_rate,
            entropy_coeff: 0.1,
        }
    }

    pub fn with_optimizer(mut self, optimizer: OptimizerWrapper) -> Self {
        let dim = self.mu_head.weights.len();
        self.mu_head = LinearHead::new(dim, optimizer.clone());
        self.sigma_head = LinearHead::new(dim, optimizer);
        self
    }

    /// Distribution parameters (mu, sigma) for a feature vector. Sigma is
    /// softplus(pre-activation) + floor, strictly positive for any weights.
    pub fn distribution(&self, features: ArrayView1<f32>) -> (f32, f32) {
        let mu = self.mu_head.forward(features);
        let pre = self.sigma_head.forward(features);
        (mu, softplus(pre) + SIGMA_FLOOR)
    }

    /// Sample one action for `state`, clamped to the action bounds. The
    /// random source is injected so callers (and tests) control determinism.
    pub fn predict<R: Rng>(
        &self,
        pipeline: &FeaturePipeline,
        state: ArrayView1<f32>,
        rng: &mut R,
    ) -> Result<f32> {
        let features = pipeline.featurize(state)?;
        let (mu, sigma) = self.distribution(features.view());

        let dist = Normal::new(mu, sigma).map_err(|e| AscentError::NumericalError(e.to_string()))?;
        let action: f32 = dist.sample(rng);
        Ok(action.clamp(self.action_low, self.action_high))
    }

    /// One policy-gradient step. `target` is the advantage signal (the TD
    /// error supplied by the training loop); the loss is
    /// `-log_prob(action) * target - entropy_coeff * entropy`. Returns the
    /// scalar loss for diagnostics.
    pub fn update(
        &mut self,
        pipeline: &FeaturePipeline,
        state: ArrayView1<f32>,
        target: f32,
        action: f32,
    ) -> Result<f32> {
        let features = pipeline.featurize(state)?;
        let pre = self.sigma_head.forward(features.view());
        let mu = self.mu_head.forward(features.view());
        let sigma = softplus(pre) + SIGMA_FLOOR;

        let z = (action - mu) / sigma;
        let log_prob = -0.5 * z * z - sigma.ln() - 0.5 * LN_TWO_PI;
        let entropy = sigma.ln() + 0.5 * (LN_TWO_PI + 1.0);
        let loss = -log_prob * target - self.entropy_coeff * entropy;

        if !loss.is_finite() {
            return Err(AscentError::NumericalError(format!(
                "policy loss is not finite (mu={}, sigma={}, target={})",
                mu, sigma, target
            )));
        }

        // d(log_prob)/d(mu) = (a - mu) / sigma^2
        // d(log_prob)/d(sigma) = ((a - mu)^2 - sigma^2) / sigma^3
        // d(entropy)/d(sigma) = 1 / sigma
        let dloss_dmu = -target * (action - mu) / (sigma * sigma);
        let dloss_dsigma = -target * ((action - mu).powi(2) - sigma * sigma) / sigma.powi(3)
            - self.entropy_coeff / sigma;
        // Chain through softplus: d(sigma)/d(pre) = sigmoid(pre)
        let dloss_dpre = dloss_dsigma * sigmoid(pre);

        self.mu_head
            .apply_gradient(dloss_dmu, features.view(), self.learning_rate);
        self.sigma_head
            .apply_gradient(dloss_dpre, features.view(), self.learning_rate);

        Ok(loss)
    }
}

fn softplus(x: f32) -> f32 {
    // ln(1 + e^x), computed without overflow for large |x|
    if x > 20.0 {
        x
    } else if x < -20.0 {
        x.exp()
    } else {
        x.exp().ln_1p()
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
