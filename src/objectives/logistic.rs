use std::num::NonZeroUsize;

use rand::Rng;
use rayon::prelude::*;

use crate::{
    error::{Result, RpropErr},
    execution::partition,
    storage::GradientBuffers,
    training::GradientSource,
};

/// A binary labelled sample whose active features all have value one.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseSample {
    pub features: Vec<usize>,
    pub label: bool,
}

/// Regularized logistic regression over sparse binary samples.
///
/// The gradient covers the log-loss and the l2 term only. The l1 term is
/// added to the reported objective but left to the optimizer's orthant
/// projection, so `rho1` should match the optimizer's.
#[derive(Debug, Clone)]
pub struct LogisticSource {
    features: usize,
    samples: Vec<SparseSample>,
    rho1: f64,
    rho2: f64,
}

impl LogisticSource {
    /// Creates a new `LogisticSource` without regularization.
    ///
    /// # Arguments
    /// * `features` - The amount of features of the model.
    /// * `samples` - The training samples.
    ///
    /// # Returns
    /// A new source or an `InvalidConfig` error if a sample references an unknown feature.
    pub fn new(features: usize, samples: Vec<SparseSample>) -> Result<Self> {
        for (i, sample) in samples.iter().enumerate() {
            if let Some(f) = sample.features.iter().find(|&&f| f >= features) {
                return Err(RpropErr::InvalidConfig(format!(
                    "sample {i} references feature {f} but the model has {features} features"
                )));
            }
        }

        Ok(Self {
            features,
            samples,
            rho1: 0.,
            rho2: 0.,
        })
    }

    /// Generates a reproducible data set labelled by a hidden sparse model.
    ///
    /// # Arguments
    /// * `rng` - The random number generator.
    /// * `features` - The amount of features, must be positive.
    /// * `samples` - The amount of samples to generate.
    /// * `active` - The amount of features with a non-zero hidden weight.
    pub fn synthetic<R: Rng>(rng: &mut R, features: usize, samples: usize, active: usize) -> Self {
        let features = features.max(1);
        let mut hidden = vec![0.; features];

        for _ in 0..active.min(features) {
            let f = rng.random_range(0..features);
            let magnitude = rng.random_range(1.0..3.0);
            hidden[f] = if rng.random_bool(0.5) { magnitude } else { -magnitude };
        }

        let samples = (0..samples)
            .map(|_| {
                let len = rng.random_range(1..=features.min(8));
                let ids: Vec<usize> = (0..len).map(|_| rng.random_range(0..features)).collect();
                let score: f64 = ids.iter().map(|&f| hidden[f]).sum();
                let label = rng.random_bool(sigmoid(score));

                SparseSample {
                    features: ids,
                    label,
                }
            })
            .collect();

        Self {
            features,
            samples,
            rho1: 0.,
            rho2: 0.,
        }
    }

    /// Sets the regularization weights.
    ///
    /// # Arguments
    /// * `rho1` - The l1 weight, only reflected in the objective value.
    /// * `rho2` - The l2 weight, reflected in the objective and the gradient.
    pub fn with_penalties(mut self, rho1: f64, rho2: f64) -> Self {
        self.rho1 = rho1;
        self.rho2 = rho2;
        self
    }

    pub fn samples(&self) -> &[SparseSample] {
        &self.samples
    }

    /// Returns the fraction of samples whose label is predicted correctly.
    pub fn accuracy(&self, weights: &[f64]) -> f64 {
        if self.samples.is_empty() {
            return 0.;
        }

        let correct = self
            .samples
            .iter()
            .filter(|sample| (score(sample, weights) > 0.) == sample.label)
            .count();

        correct as f64 / self.samples.len() as f64
    }
}

impl GradientSource for LogisticSource {
    fn features(&self) -> usize {
        self.features
    }

    /// Splits the samples across the buffers, accumulates every part in
    /// parallel and sums the partial gradients into the primary buffer.
    ///
    /// # Panics
    /// If `weights` or the buffers don't match the amount of features.
    fn gradient(&mut self, weights: &[f64], buffers: &mut GradientBuffers) -> f64 {
        assert_eq!(weights.len(), self.features, "weights don't match the source's features");
        assert_eq!(
            buffers.features(),
            self.features,
            "gradient buffers don't match the source's features"
        );

        let workers = NonZeroUsize::new(buffers.workers()).unwrap_or(NonZeroUsize::MIN);
        let samples = &self.samples;

        let losses: Vec<f64> = buffers
            .as_mut_slice()
            .par_iter_mut()
            .enumerate()
            .map(|(id, buf)| {
                buf.fill(0.);
                samples[partition::range(samples.len(), id, workers)]
                    .iter()
                    .map(|sample| accumulate(sample, weights, buf))
                    .sum::<f64>()
            })
            .collect();

        buffers.reduce();
        let mut fx: f64 = losses.iter().sum();

        if self.rho2 != 0. {
            let rho2 = self.rho2;
            buffers
                .primary_mut()
                .iter_mut()
                .zip(weights)
                .for_each(|(g, w)| *g += rho2 * w);

            fx += 0.5 * rho2 * weights.iter().map(|w| w * w).sum::<f64>();
        }

        if self.rho1 != 0. {
            fx += self.rho1 * weights.iter().map(|w| w.abs()).sum::<f64>();
        }

        fx
    }
}

fn score(sample: &SparseSample, weights: &[f64]) -> f64 {
    sample.features.iter().map(|&f| weights[f]).sum()
}

/// Adds the gradient of one sample's log-loss into `grad` and returns the loss.
fn accumulate(sample: &SparseSample, weights: &[f64], grad: &mut [f64]) -> f64 {
    let y = if sample.label { 1. } else { -1. };
    let margin = y * score(sample, weights);
    let coef = -y * sigmoid(-margin);

    for &f in &sample.features {
        grad[f] += coef;
    }

    softplus(-margin)
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0. {
        1. / (1. + (-z).exp())
    } else {
        let e = z.exp();
        e / (1. + e)
    }
}

/// `ln(1 + e^z)` without overflow.
fn softplus(z: f64) -> f64 {
    if z > 0. {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}
