//! Combinatorial optimization over `{0, 1}^D`.

use ce_core::{
    CrossEntropyContext, EliteSample, EliteSampleDefinition, OptimizationContext,
    OptimizationGoal, Parameter, ParameterHistory, Result, SampleChunk,
};
use ce_prob::SamplingFamily;
use nalgebra::DMatrix;
use rand::rngs::StdRng;

use super::check_tolerance;
use crate::estimator;
use crate::smoothing::Smoothing;

/// Optimizes `performance` over binary vectors with independent Bernoulli coordinates.
///
/// The parameter is the `1 × D` row of success probabilities. Updates are smoothed with
/// a constant coefficient (default 0.7). The run stops once every probability is within
/// the tolerance (default `1e-3`) of 0 or 1; the optimal state rounds the probabilities.
pub struct BernoulliOptimizationContext<F> {
    goal: OptimizationGoal,
    initial: Parameter,
    smoothing: Smoothing,
    probability_tolerance: f64,
    performance: F,
}

impl<F> BernoulliOptimizationContext<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    /// Context starting from the success probabilities `probabilities`.
    ///
    /// A probability of exactly 0 or 1 pins that coordinate for the whole run.
    pub fn new(goal: OptimizationGoal, probabilities: &[f64], performance: F) -> Result<Self> {
        let initial = DMatrix::from_row_slice(1, probabilities.len(), probabilities);
        SamplingFamily::Bernoulli.validate_parameter(&initial, probabilities.len())?;
        Ok(Self {
            goal,
            initial,
            smoothing: Smoothing::Constant { coefficient: 0.7 },
            probability_tolerance: 1e-3,
            performance,
        })
    }

    /// Replace the default constant smoothing.
    pub fn with_smoothing(mut self, smoothing: Smoothing) -> Result<Self> {
        smoothing.validate()?;
        self.smoothing = smoothing;
        Ok(self)
    }

    /// Distance to 0 or 1 below which a probability counts as degenerate.
    pub fn with_probability_tolerance(mut self, tolerance: f64) -> Result<Self> {
        check_tolerance("probability_tolerance", tolerance)?;
        self.probability_tolerance = tolerance;
        Ok(self)
    }
}

impl<F> CrossEntropyContext for BernoulliOptimizationContext<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn state_dimension(&self) -> usize {
        self.initial.ncols()
    }

    fn initial_parameter(&self) -> &Parameter {
        &self.initial
    }

    fn elite_sample_definition(&self) -> EliteSampleDefinition {
        self.goal.elite_sample_definition()
    }

    fn performance(&self, state: &[f64]) -> f64 {
        (self.performance)(state)
    }

    fn partial_sample(&self, chunk: &mut SampleChunk, rng: &mut StdRng, parameter: &Parameter) {
        SamplingFamily::Bernoulli.sample_chunk(chunk, rng, parameter);
    }

    fn update_parameter(
        &self,
        _history: &ParameterHistory,
        elite_sample: &EliteSample,
    ) -> Result<Parameter> {
        estimator::mean_update(elite_sample)
    }

    fn smooth_parameter(&self, iteration: usize, history: &mut ParameterHistory) -> Result<()> {
        self.smoothing.apply(iteration, history)
    }

    fn stop_at_intermediate_iteration(
        &self,
        _iteration: usize,
        _levels: &[f64],
        history: &ParameterHistory,
    ) -> bool {
        history.last().iter().all(|&p| p.min(1.0 - p) < self.probability_tolerance)
    }
}

impl<F> OptimizationContext for BernoulliOptimizationContext<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn optimization_goal(&self) -> OptimizationGoal {
        self.goal
    }

    fn optimal_state(&self, parameter: &Parameter) -> Vec<f64> {
        parameter.iter().map(|&p| if p >= 0.5 { 1.0 } else { 0.0 }).collect()
    }
}
