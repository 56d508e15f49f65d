use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Parameter update rule for one linear head (a weight vector plus a scalar
/// bias). Each head owns its own optimizer instance so moment state never
/// leaks between heads.
pub trait Optimizer {
    fn update_weights(&mut self, weights: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32);
    fn update_bias(&mut self, bias: &mut f32, gradient: f32, learning_rate: f32);
}

#[derive(Serialize, Deserialize, Clone)]
pub enum OptimizerWrapper {
    SGD(SGD),
    Adam(Adam),
}

impl Optimizer for OptimizerWrapper {
    fn update_weights(&mut self, weights: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.update_weights(weights, gradients, learning_rate),
            OptimizerWrapper::Adam(optimizer) => optimizer.update_weights(weights, gradients, learning_rate),
        }
    }

    fn update_bias(&mut self, bias: &mut f32, gradient: f32, learning_rate: f32) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.update_bias(bias, gradient, learning_rate),
            OptimizerWrapper::Adam(optimizer) => optimizer.update_bias(bias, gradient, learning_rate),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Default)]
pub struct SGD;

impl SGD {
    pub fn new() -> SGD {
        SGD
    }
}

impl Optimizer for SGD {
    fn update_weights(&mut self, weights: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        weights.zip_mut_with(gradients, |w, &g| *w -= learning_rate * g);
    }

    fn update_bias(&mut self, bias: &mut f32, gradient: f32, learning_rate: f32) {
        *bias -= learning_rate * gradient;
    }
}

/// Adam with bias-corrected first and second moments. The moment buffers are
/// sized for one weight vector; the timestep is shared between the weight and
/// bias updates of a single training step.
#[derive(Serialize, Deserialize, Clone)]
pub struct Adam {
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    m_weights: Array1<f32>,
    v_weights: Array1<f32>,
    m_bias: f32,
    v_bias: f32,
    pub t: usize,
}

impl Adam {
    pub fn new(dim: usize, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Adam {
            beta1,
            beta2,
            epsilon,
            m_weights: Array1::zeros(dim),
            v_weights: Array1::zeros(dim),
            m_bias: 0.0,
            v_bias: 0.0,
            t: 1,
        }
    }

    pub fn default_for(dim: usize) -> Self {
        Self::new(dim, 0.9, 0.999, 1e-8)
    }
}

impl Optimizer for Adam {
    fn update_weights(&mut self, weights: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        let (beta1, beta2, epsilon, t) = (self.beta1, self.beta2, self.epsilon, self.t as i32);
        let m = &mut self.m_weights;
        let v = &mut self.v_weights;

        m.zip_mut_with(gradients, |m_i, &g| *m_i = beta1 * *m_i + (1.0 - beta1) * g);
        v.zip_mut_with(gradients, |v_i, &g| *v_i = beta2 * *v_i + (1.0 - beta2) * g * g);

        let m_hat = m.mapv(|x| x / (1.0 - beta1.powi(t)));
        let v_hat = v.mapv(|x| x / (1.0 - beta2.powi(t)));

        *weights -= &((&m_hat / (v_hat.mapv(f32::sqrt) + epsilon)) * learning_rate);
    }

    fn update_bias(&mut self, bias: &mut f32, gradient: f32, learning_rate: f32) {
        self.m_bias = self.beta1 * self.m_bias + (1.0 - self.beta1) * gradient;
        self.v_bias = self.beta2 * self.v_bias + (1.0 - self.beta2) * gradient * gradient;

        let m_hat = self.m_bias / (1.0 - self.beta1.powi(self.t as i32));
        let v_hat = self.v_bias / (1.0 - self.beta2.powi(self.t as i32));

        *bias -= learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);

        self.t += 1; // Bias update closes the step; weights must go first
    }
}
