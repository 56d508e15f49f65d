//! Function approximators over the fitted feature space: a Gaussian policy
//! (actor) and a scalar state-value estimator (critic), each built from
//! zero-initialized linear heads.

mod policy;
mod value;

pub use policy::PolicyEstimator;
pub use value::ValueEstimator;

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::optimizer::{Optimizer, OptimizerWrapper};

/// One linear map from feature vector to scalar, with its own optimizer
/// state. Weights and bias start at zero so the initial policy mean and
/// value estimate are exactly zero.
#[derive(Serialize, Deserialize, Clone)]
pub struct LinearHead {
    pub weights: Array1<f32>,
    pub bias: f32,
    optimizer: OptimizerWrapper,
}

impl LinearHead {
    pub fn new(dim: usize, optimizer: OptimizerWrapper) -> Self {
        LinearHead {
            weights: Array1::zeros(dim),
            bias: 0.0,
            optimizer,
        }
    }

    pub fn forward(&self, features: ArrayView1<f32>) -> f32 {
        self.weights.dot(&features) + self.bias
    }

    /// Apply one optimizer step given the loss gradient with respect to this
    /// head's output. The weight gradient is `dout * features`, the bias
    /// gradient is `dout`.
    pub fn apply_gradient(&mut self, dout: f32, features: ArrayView1<f32>, learning_rate: f32) {
        let weight_gradients = features.mapv(|f| dout * f);
        self.optimizer
            .update_weights(&mut self.weights, &weight_gradients, learning_rate);
        self.optimizer.update_bias(&mut self.bias, dout, learning_rate);
    }
}
