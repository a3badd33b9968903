//! Rare events of systems driven by independent Gaussian inputs.

use ce_core::{
    CrossEntropyContext, EliteSample, EliteSampleDefinition, Error, Parameter, ParameterHistory,
    RareEventContext, RareEventPerformanceBoundedness, Result, SampleChunk,
};
use ce_prob::SamplingFamily;
use nalgebra::DMatrix;
use rand::rngs::StdRng;

use crate::estimator;
use crate::smoothing::Smoothing;

/// Gaussian importance sampling for `Pr{performance(X) ≥ t}` or `Pr{performance(X) ≤ t}`.
///
/// By default only the means are adapted (mean shift) and the standard deviations stay
/// at their nominal values. `with_std_dev_update(true)` re-estimates both rows.
pub struct NormalRareEventContext<F> {
    nominal: Parameter,
    threshold_level: f64,
    boundedness: RareEventPerformanceBoundedness,
    smoothing: Smoothing,
    update_std_devs: bool,
    performance: F,
}

impl<F> NormalRareEventContext<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    /// Context with nominal law `N(means, std_devs²)`.
    pub fn new(
        means: &[f64],
        std_devs: &[f64],
        threshold_level: f64,
        boundedness: RareEventPerformanceBoundedness,
        performance: F,
    ) -> Result<Self> {
        if means.len() != std_devs.len() {
            return Err(Error::Validation(format!(
                "means and std_devs must have the same length, got {} and {}",
                means.len(),
                std_devs.len()
            )));
        }
        let dimension = means.len();
        let nominal =
            DMatrix::from_fn(2, dimension, |i, j| if i == 0 { means[j] } else { std_devs[j] });
        SamplingFamily::Gaussian.validate_parameter(&nominal, dimension)?;
        Ok(Self {
            nominal,
            threshold_level,
            boundedness,
            smoothing: Smoothing::None,
            update_std_devs: false,
            performance,
        })
    }

    /// Smooth reference parameters from iteration 2 onward.
    pub fn with_smoothing(mut self, smoothing: Smoothing) -> Result<Self> {
        smoothing.validate()?;
        self.smoothing = smoothing;
        Ok(self)
    }

    /// Whether standard deviations are re-estimated along with the means.
    pub fn with_std_dev_update(mut self, update: bool) -> Self {
        self.update_std_devs = update;
        self
    }
}

impl<F> CrossEntropyContext for NormalRareEventContext<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn state_dimension(&self) -> usize {
        self.nominal.ncols()
    }

    fn initial_parameter(&self) -> &Parameter {
        &self.nominal
    }

    fn elite_sample_definition(&self) -> EliteSampleDefinition {
        self.boundedness.elite_sample_definition()
    }

    fn performance(&self, state: &[f64]) -> f64 {
        (self.performance)(state)
    }

    fn partial_sample(&self, chunk: &mut SampleChunk, rng: &mut StdRng, parameter: &Parameter) {
        SamplingFamily::Gaussian.sample_chunk(chunk, rng, parameter);
    }

    fn update_parameter(
        &self,
        history: &ParameterHistory,
        elite_sample: &EliteSample,
    ) -> Result<Parameter> {
        let weights = estimator::likelihood_weights(self, history, elite_sample)?;
        if self.update_std_devs {
            return estimator::weighted_gaussian_update(elite_sample, &weights);
        }
        let means = estimator::weighted_mean_update(elite_sample, &weights)?;
        let mut next = self.nominal.clone();
        next.row_mut(0).copy_from(&means.row(0));
        Ok(next)
    }

    fn smooth_parameter(&self, iteration: usize, history: &mut ParameterHistory) -> Result<()> {
        self.smoothing.apply(iteration, history)
    }
}

impl<F> RareEventContext for NormalRareEventContext<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn threshold_level(&self) -> f64 {
        self.threshold_level
    }

    fn performance_boundedness(&self) -> RareEventPerformanceBoundedness {
        self.boundedness
    }

    fn likelihood_ratio(&self, state: &[f64], nominal: &Parameter, reference: &Parameter) -> f64 {
        SamplingFamily::Gaussian.likelihood_ratio(state, nominal, reference)
    }
}
