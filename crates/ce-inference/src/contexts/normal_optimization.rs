//! Continuous optimization with independent Gaussians.

use ce_core::{
    CrossEntropyContext, EliteSample, EliteSampleDefinition, Error, OptimizationContext,
    OptimizationGoal, Parameter, ParameterHistory, Result, SampleChunk,
};
use ce_prob::SamplingFamily;
use nalgebra::DMatrix;
use rand::rngs::StdRng;

use super::check_tolerance;
use crate::estimator;
use crate::smoothing::Smoothing;

/// Optimizes `performance` over `R^D` with a `2 × D` Gaussian parameter.
///
/// Stops once every standard deviation is below the tolerance (default `1e-3`). The
/// optimal state is the mean row.
pub struct NormalOptimizationContext<F> {
    goal: OptimizationGoal,
    initial: Parameter,
    smoothing: Smoothing,
    std_dev_tolerance: f64,
    performance: F,
}

impl<F> NormalOptimizationContext<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    /// Context starting from `N(means, std_devs²)`, without smoothing.
    pub fn new(
        goal: OptimizationGoal,
        means: &[f64],
        std_devs: &[f64],
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
        let initial =
            DMatrix::from_fn(2, dimension, |i, j| if i == 0 { means[j] } else { std_devs[j] });
        SamplingFamily::Gaussian.validate_parameter(&initial, dimension)?;
        Ok(Self { goal, initial, smoothing: Smoothing::None, std_dev_tolerance: 1e-3, performance })
    }

    /// Smooth parameters with `smoothing` from iteration 2 onward.
    pub fn with_smoothing(mut self, smoothing: Smoothing) -> Result<Self> {
        smoothing.validate()?;
        self.smoothing = smoothing;
        Ok(self)
    }

    /// Stop once every standard deviation is below `tolerance`.
    pub fn with_std_dev_tolerance(mut self, tolerance: f64) -> Result<Self> {
        check_tolerance("std_dev_tolerance", tolerance)?;
        self.std_dev_tolerance = tolerance;
        Ok(self)
    }
}

impl<F> CrossEntropyContext for NormalOptimizationContext<F>
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
        SamplingFamily::Gaussian.sample_chunk(chunk, rng, parameter);
    }

    fn update_parameter(
        &self,
        _history: &ParameterHistory,
        elite_sample: &EliteSample,
    ) -> Result<Parameter> {
        estimator::gaussian_update(elite_sample)
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
        history.last().row(1).iter().all(|&s| s < self.std_dev_tolerance)
    }
}

impl<F> OptimizationContext for NormalOptimizationContext<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn optimization_goal(&self) -> OptimizationGoal {
        self.goal
    }

    fn optimal_state(&self, parameter: &Parameter) -> Vec<f64> {
        parameter.row(0).iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere(x: &[f64]) -> f64 {
        x.iter().map(|v| v * v).sum()
    }

    #[test]
    fn test_construction_validates() {
        let goal = OptimizationGoal::Minimization;
        assert!(NormalOptimizationContext::new(goal, &[0.0, 1.0], &[1.0], sphere).is_err());
        assert!(NormalOptimizationContext::new(goal, &[0.0], &[0.0], sphere).is_err());
        assert!(NormalOptimizationContext::new(goal, &[], &[], sphere).is_err());

        let ctx = NormalOptimizationContext::new(goal, &[0.0, 1.0], &[2.0, 3.0], sphere).unwrap();
        assert_eq!(ctx.state_dimension(), 2);
        assert_eq!(ctx.initial_parameter()[(1, 1)], 3.0);
        assert_eq!(ctx.elite_sample_definition(), EliteSampleDefinition::LowerThanLevel);
        assert!(ctx.with_std_dev_tolerance(0.0).is_err());
    }

    #[test]
    fn test_stop_rule_and_projection() {
        let goal = OptimizationGoal::Maximization;
        let ctx = NormalOptimizationContext::new(goal, &[1.0, 2.0], &[1.0, 1.0], sphere)
            .unwrap()
            .with_std_dev_tolerance(0.1)
            .unwrap();
        let mut h = ParameterHistory::new(ctx.initial_parameter().clone());
        assert!(!ctx.stop_at_intermediate_iteration(1, &[], &h));
        h.push(DMatrix::from_row_slice(2, 2, &[4.0, 5.0, 0.05, 0.2]));
        assert!(!ctx.stop_at_intermediate_iteration(2, &[], &h));
        h.push(DMatrix::from_row_slice(2, 2, &[4.0, 5.0, 0.05, 0.09]));
        assert!(ctx.stop_at_intermediate_iteration(3, &[], &h));
        assert_eq!(ctx.optimal_state(h.last()), vec![4.0, 5.0]);
    }
}
