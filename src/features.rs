//! Observation featurization: standardization followed by random Fourier
//! features at several length-scales.
//!
//! Raw observations (2 continuous dimensions for mountain car) are too coarse
//! for linear function approximators. The pipeline standardizes them, then
//! concatenates several random-kitchen-sink projections approximating Gaussian
//! kernels of different widths, yielding a fixed 400-dimensional feature
//! vector the linear heads can actually learn on. Fitting happens exactly
//! once; the forward pass is deterministic thereafter.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use ndarray_rand::rand_distr::{Normal, Uniform};
use ndarray_rand::RandomExt;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{AscentError, Result};

/// Per-dimension standardization fitted from a sample matrix.
///
/// Uses the population variance (divide by n, not n-1). Dimensions with
/// near-zero variance pass through unscaled instead of exploding.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StandardScaler {
    pub mean: Array1<f32>,
    pub std: Array1<f32>,
}

impl StandardScaler {
    pub fn fit(samples: &Array2<f32>) -> Result<Self> {
        if samples.nrows() == 0 {
            return Err(AscentError::EmptySamples(
                "standard scaler needs at least one sample".to_string(),
            ));
        }

        let n = samples.nrows() as f32;
        let mean = samples.sum_axis(Axis(0)) / n;
        let variance = samples
            .rows()
            .into_iter()
            .fold(Array1::<f32>::zeros(samples.ncols()), |mut acc, row| {
                acc.zip_mut_with(&(&row - &mean), |a, &d| *a += d * d);
                acc
            })
            / n;
        let std = variance.mapv(|v| {
            let s = v.sqrt();
            if s > 1e-8 {
                s
            } else {
                1.0
            }
        });

        Ok(StandardScaler { mean, std })
    }

    pub fn transform(&self, observation: ArrayView1<f32>) -> Result<Array1<f32>> {
        if observation.len() != self.mean.len() {
            return Err(AscentError::dimension_mismatch(
                self.mean.len().to_string(),
                observation.len().to_string(),
            ));
        }
        Ok((&observation - &self.mean) / &self.std)
    }
}

/// A random Fourier feature map approximating a Gaussian kernel with
/// parameter `gamma`: z(x) = sqrt(2 / n_components) * cos(x W + b), with
/// W ~ N(0, sqrt(2 gamma)) and b ~ U(0, 2 pi). All randomness happens in
/// `fit`; `transform` is a pure function of the fitted state.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RbfSampler {
    pub gamma: f32,
    weights: Array2<f32>,
    offsets: Array1<f32>,
}

impl RbfSampler {
    pub fn fit<R: Rng>(obs_dim: usize, gamma: f32, n_components: usize, rng: &mut R) -> Result<Self> {
        if gamma <= 0.0 {
            return Err(AscentError::invalid_parameter("gamma", "must be positive"));
        }
        if n_components == 0 {
            return Err(AscentError::invalid_parameter(
                "n_components",
                "must be at least 1",
            ));
        }

        let weight_dist = Normal::new(0.0f32, (2.0 * gamma).sqrt())
            .map_err(|e| AscentError::NumericalError(e.to_string()))?;
        let weights = Array2::random_using((obs_dim, n_components), weight_dist, rng);
        let offsets = Array1::random_using(
            n_components,
            Uniform::new(0.0f32, 2.0 * std::f32::consts::PI),
            rng,
        );

        Ok(RbfSampler {
            gamma,
            weights,
            offsets,
        })
    }

    pub fn n_components(&self) -> usize {
        self.offsets.len()
    }

    pub fn transform(&self, scaled: ArrayView1<f32>) -> Array1<f32> {
        let scale = (2.0 / self.n_components() as f32).sqrt();
        let mut projected = scaled.dot(&self.weights) + &self.offsets;
        projected.mapv_inplace(|v| v.cos() * scale);
        projected
    }
}

/// Configuration for the feature pipeline. Default is four kernel widths at
/// 100 components each, a 400-dim output.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FeatureConfig {
    pub gammas: Vec<f32>,
    pub n_components: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        FeatureConfig {
            gammas: vec![5.0, 2.0, 1.0, 0.5],
            n_components: 100,
        }
    }
}

/// Fitted featurization pipeline: a scaler plus one RBF sampler per
/// length-scale, concatenated. Constructed only through [`FeaturePipeline::fit`],
/// so a pipeline in scope is always usable.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FeaturePipeline {
    scaler: StandardScaler,
    samplers: Vec<RbfSampler>,
}

impl FeaturePipeline {
    /// Fit the scaler and samplers from a sample of the observation space.
    /// Called once at startup; the fitted state is immutable afterwards.
    pub fn fit<R: Rng>(
        observations: &[Array1<f32>],
        config: FeatureConfig,
        rng: &mut R,
    ) -> Result<Self> {
        let first = observations.first().ok_or_else(|| {
            AscentError::EmptySamples("feature pipeline needs observation samples".to_string())
        })?;
        if config.gammas.is_empty() {
            return Err(AscentError::invalid_parameter(
                "gammas",
                "need at least one length-scale",
            ));
        }

        let obs_dim = first.len();
        let mut matrix = Array2::zeros((observations.len(), obs_dim));
        for (i, obs) in observations.iter().enumerate() {
            if obs.len() != obs_dim {
                return Err(AscentError::dimension_mismatch(
                    obs_dim.to_string(),
                    obs.len().to_string(),
                ));
            }
            matrix.row_mut(i).assign(obs);
        }

        let scaler = StandardScaler::fit(&matrix)?;

        let samplers = config
            .gammas
            .iter()
            .map(|&gamma| RbfSampler::fit(obs_dim, gamma, config.n_components, rng))
            .collect::<Result<Vec<_>>>()?;

        Ok(FeaturePipeline { scaler, samplers })
    }

    /// Total output dimension (sum of all samplers' components).
    pub fn feature_dim(&self) -> usize {
        self.samplers.iter().map(|s| s.n_components()).sum()
    }

    pub fn observation_dim(&self) -> usize {
        self.scaler.mean.len()
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Standardize an observation and project it through every sampler,
    /// concatenating the outputs.
    pub fn featurize(&self, observation: ArrayView1<f32>) -> Result<Array1<f32>> {
        let scaled = self.scaler.transform(observation)?;

        let mut features = Array1::zeros(self.feature_dim());
        let mut offset = 0;
        for sampler in &self.samplers {
            let block = sampler.transform(scaled.view());
            features
                .slice_mut(ndarray::s![offset..offset + block.len()])
                .assign(&block);
            offset += block.len();
        }
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_observations(n: usize, seed: u64) -> Vec<Array1<f32>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                array![
                    rng.gen_range(-1.2f32..0.6),
                    rng.gen_range(-0.07f32..0.07)
                ]
            })
            .collect()
    }

    #[test]
    fn test_scaler_standardizes() {
        let samples = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]];
        let scaler = StandardScaler::fit(&samples).unwrap();

        assert!((scaler.mean[0] - 2.0).abs() < 1e-6);
        assert!((scaler.mean[1] - 20.0).abs() < 1e-6);

        let transformed = scaler.transform(array![2.0, 20.0].view()).unwrap();
        assert!(transformed[0].abs() < 1e-6);
        assert!(transformed[1].abs() < 1e-6);
    }

    #[test]
    fn test_scaler_zero_variance_guard() {
        let samples = array![[5.0, 1.0], [5.0, 2.0]];
        let scaler = StandardScaler::fit(&samples).unwrap();

        let transformed = scaler.transform(array![6.0, 1.5].view()).unwrap();
        // Constant dimension passes through with unit scale
        assert!((transformed[0] - 1.0).abs() < 1e-6);
        assert!(transformed[1].is_finite());
    }

    #[test]
    fn test_scaler_rejects_empty() {
        let samples = Array2::zeros((0, 2));
        assert!(StandardScaler::fit(&samples).is_err());
    }

    #[test]
    fn test_featurize_dimension() {
        let mut rng = StdRng::seed_from_u64(7);
        let samples = sample_observations(500, 1);
        let pipeline = FeaturePipeline::fit(&samples, FeatureConfig::default(), &mut rng).unwrap();

        assert_eq!(pipeline.feature_dim(), 400);
        assert_eq!(pipeline.observation_dim(), 2);

        let features = pipeline.featurize(array![-0.5, 0.0].view()).unwrap();
        assert_eq!(features.len(), 400);
        assert!(features.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_featurize_deterministic_forward() {
        let mut rng = StdRng::seed_from_u64(7);
        let samples = sample_observations(500, 1);
        let pipeline = FeaturePipeline::fit(&samples, FeatureConfig::default(), &mut rng).unwrap();

        let obs = array![-0.3, 0.02];
        let a = pipeline.featurize(obs.view()).unwrap();
        let b = pipeline.featurize(obs.view()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fit_is_seed_stable() {
        let samples = sample_observations(500, 1);

        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        let a = FeaturePipeline::fit(&samples, FeatureConfig::default(), &mut rng_a).unwrap();
        let b = FeaturePipeline::fit(&samples, FeatureConfig::default(), &mut rng_b).unwrap();

        for (ma, mb) in a.scaler().mean.iter().zip(b.scaler().mean.iter()) {
            assert!((ma - mb).abs() < 1e-7);
        }
        for (sa, sb) in a.scaler().std.iter().zip(b.scaler().std.iter()) {
            assert!((sa - sb).abs() < 1e-7);
        }

        let obs = array![-0.5, 0.01];
        let fa = a.featurize(obs.view()).unwrap();
        let fb = b.featurize(obs.view()).unwrap();
        for (va, vb) in fa.iter().zip(fb.iter()) {
            assert!((va - vb).abs() < 1e-7);
        }
    }

    #[test]
    fn test_featurize_rejects_wrong_dimension() {
        let mut rng = StdRng::seed_from_u64(7);
        let samples = sample_observations(100, 1);
        let pipeline = FeaturePipeline::fit(&samples, FeatureConfig::default(), &mut rng).unwrap();

        assert!(pipeline.featurize(array![1.0, 2.0, 3.0].view()).is_err());
    }

    #[test]
    fn test_fit_rejects_bad_config() {
        let mut rng = StdRng::seed_from_u64(7);
        let samples = sample_observations(100, 1);

        let bad_gamma = FeatureConfig {
            gammas: vec![-1.0],
            n_components: 100,
        };
        assert!(FeaturePipeline::fit(&samples, bad_gamma, &mut rng).is_err());

        let no_gammas = FeatureConfig {
            gammas: vec![],
            n_components: 100,
        };
        assert!(FeaturePipeline::fit(&samples, no_gammas, &mut rng).is_err());

        assert!(FeaturePipeline::fit(&[], FeatureConfig::default(), &mut rng).is_err());
    }

    #[test]
    fn test_rbf_output_bounded() {
        let mut rng = StdRng::seed_from_u64(3);
        let sampler = RbfSampler::fit(2, 1.0, 50, &mut rng).unwrap();

        let out = sampler.transform(array![0.5, -0.5].view());
        let bound = (2.0f32 / 50.0).sqrt();
        for &v in out.iter() {
            assert!(v.abs() <= bound + 1e-6);
        }
    }
}
