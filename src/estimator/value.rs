use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use super::LinearHead;
use crate::error::{AscentError, Result};
use crate::features::FeaturePipeline;
use crate::optimizer::{Adam, OptimizerWrapper};

/// Linear state-value estimator (the critic).
///
/// The default learning rate is deliberately an order of magnitude larger
/// than the actor's: the critic has to track the value function quickly to
/// produce a useful advantage signal.
#[derive(Serialize, Deserialize, Clone)]
pub struct ValueEstimator {
    head: LinearHead,
    pub learning_rate: f32,
}

impl ValueEstimator {
    pub fn new(feature_dim: usize, learning_rate: f32) -> Self {
        ValueEstimator {
            head: LinearHead::new(feature_dim, OptimizerWrapper::Adam(Adam::default_for(feature_dim))),
            learning_rate,
        }
    }

    pub fn with_optimizer(mut self, optimizer: OptimizerWrapper) -> Self {
        let dim = self.head.weights.len();
        self.head = LinearHead::new(dim, optimizer);
        self
    }

    /// Estimated value of `state`.
    pub fn predict(&self, pipeline: &FeaturePipeline, state: ArrayView1<f32>) -> Result<f32> {
        let features = pipeline.featurize(state)?;
        Ok(self.head.forward(features.view()))
    }

    /// One gradient step on the squared difference between the current
    /// estimate and `target` (the TD target). Returns the loss before the
    /// update.
    pub fn update(
        &mut self,
        pipeline: &FeaturePipeline,
        state: ArrayView1<f32>,
        target: f32,
    ) -> Result<f32> {
        let features = pipeline.featurize(state)?;
        let value = self.head.forward(features.view());
        let loss = (value - target).powi(2);

        if !loss.is_finite() {
            return Err(AscentError::NumericalError(format!(
                "value loss is not finite (value={}, target={})",
                value, target
            )));
        }

        let dloss_dvalue = 2.0 * (value - target);
        self.head
            .apply_gradient(dloss_dvalue, features.view(), self.learning_rate);

        Ok(loss)
    }
}
