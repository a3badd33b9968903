//! Rare events of systems driven by independent Exponential components.

use ce_core::{
    CrossEntropyContext, EliteSample, EliteSampleDefinition, Parameter, ParameterHistory,
    RareEventContext, RareEventPerformanceBoundedness, Result, SampleChunk,
};
use ce_prob::SamplingFamily;
use nalgebra::DMatrix;
use rand::rngs::StdRng;

use crate::estimator;
use crate::smoothing::Smoothing;

/// Estimates the probability that `performance(X)` crosses a threshold when the
/// coordinates of `X` are independent Exponentials with the given nominal means.
///
/// The reference parameter is the `1 × D` row of means, re-estimated from the
/// likelihood-ratio weighted elite sample.
pub struct ExponentialRareEventContext<F> {
    nominal: Parameter,
    threshold_level: f64,
    boundedness: RareEventPerformanceBoundedness,
    smoothing: Smoothing,
    performance: F,
}

impl<F> ExponentialRareEventContext<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    /// Context for the event `{performance ≥ threshold}` (`Lower`) or
    /// `{performance ≤ threshold}` (`Upper`).
    pub fn new(
        nominal_means: &[f64],
        threshold_level: f64,
        boundedness: RareEventPerformanceBoundedness,
        performance: F,
    ) -> Result<Self> {
        let nominal = DMatrix::from_row_slice(1, nominal_means.len(), nominal_means);
        SamplingFamily::Exponential.validate_parameter(&nominal, nominal_means.len())?;
        Ok(Self { nominal, threshold_level, boundedness, smoothing: Smoothing::None, performance })
    }

    /// Smooth reference parameters from iteration 2 onward.
    pub fn with_smoothing(mut self, smoothing: Smoothing) -> Result<Self> {
        smoothing.validate()?;
        self.smoothing = smoothing;
        Ok(self)
    }
}

impl<F> CrossEntropyContext for ExponentialRareEventContext<F>
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
        SamplingFamily::Exponential.sample_chunk(chunk, rng, parameter);
    }

    fn update_parameter(
        &self,
        history: &ParameterHistory,
        elite_sample: &EliteSample,
    ) -> Result<Parameter> {
        let weights = estimator::likelihood_weights(self, history, elite_sample)?;
        estimator::weighted_mean_update(elite_sample, &weights)
    }

    fn smooth_parameter(&self, iteration: usize, history: &mut ParameterHistory) -> Result<()> {
        self.smoothing.apply(iteration, history)
    }
}

impl<F> RareEventContext for ExponentialRareEventContext<F>
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
        SamplingFamily::Exponential.likelihood_ratio(state, nominal, reference)
    }
}
