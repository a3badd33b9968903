//! Cross-entropy optimization.

use std::time::Instant;

use ce_core::{Error, OptimizationContext, OptimizationResult, Result, TerminationReason};

use crate::config::{CancellationToken, CrossEntropyConfig};
use crate::engine::run_adaptation;

/// Drives an [`OptimizationContext`] to its optimum.
#[derive(Debug, Clone, Default)]
pub struct SystemPerformanceOptimizer {
    config: CrossEntropyConfig,
}

impl SystemPerformanceOptimizer {
    /// Optimizer with a validated configuration.
    pub fn new(config: CrossEntropyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use.
    pub fn config(&self) -> &CrossEntropyConfig {
        &self.config
    }

    /// Run the optimization to termination.
    pub fn optimize<C>(&self, context: &C) -> Result<OptimizationResult>
    where
        C: OptimizationContext + ?Sized,
    {
        self.run(context, None)
    }

    /// Run the optimization, checking `cancel` between iterations.
    pub fn optimize_with_cancellation<C>(
        &self,
        context: &C,
        cancel: &CancellationToken,
    ) -> Result<OptimizationResult>
    where
        C: OptimizationContext + ?Sized,
    {
        self.run(context, Some(cancel))
    }

    fn run<C>(&self, context: &C, cancel: Option<&CancellationToken>) -> Result<OptimizationResult>
    where
        C: OptimizationContext + ?Sized,
    {
        let goal = context.optimization_goal();
        let definition = context.elite_sample_definition();
        if definition != goal.elite_sample_definition() {
            return Err(Error::Validation(format!(
                "elite sample definition {:?} does not match optimization goal {:?}",
                definition, goal
            )));
        }

        let t0 = Instant::now();
        let adaptation = run_adaptation(context, &self.config, cancel, |level| (level, false))?;

        let optimal_parameter = adaptation.history.into_last();
        let optimal_state = context.optimal_state(&optimal_parameter);
        let optimal_performance = context.performance(&optimal_state);
        let wall_time_s = t0.elapsed().as_secs_f64();

        match adaptation.termination {
            TerminationReason::Converged => log::info!(
                "CE optimization converged after {} iterations: performance = {:.6e}",
                adaptation.n_iterations,
                optimal_performance
            ),
            TerminationReason::MaxIterationsReached => log::warn!(
                "CE optimization hit max_iterations ({}) before the stopping rule held",
                adaptation.n_iterations
            ),
        }

        Ok(OptimizationResult {
            optimal_state,
            optimal_performance,
            optimal_parameter,
            levels: adaptation.levels,
            n_iterations: adaptation.n_iterations,
            n_total_samples: adaptation.n_samples,
            termination: adaptation.termination,
            wall_time_s,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ce_core::{
        CrossEntropyContext, EliteSample, EliteSampleDefinition, OptimizationGoal, Parameter,
        ParameterHistory, SampleChunk,
    };
    use ce_prob::SamplingFamily;
    use nalgebra::DMatrix;
    use rand::rngs::StdRng;

    struct Peak {
        initial: Parameter,
        definition: EliteSampleDefinition,
    }

    impl CrossEntropyContext for Peak {
        fn state_dimension(&self) -> usize {
            1
        }
        fn initial_parameter(&self) -> &Parameter {
            &self.initial
        }
        fn elite_sample_definition(&self) -> EliteSampleDefinition {
            self.definition
        }
        fn performance(&self, state: &[f64]) -> f64 {
            -(state[0] - 1.5).powi(2)
        }
        fn partial_sample(&self, chunk: &mut SampleChunk, rng: &mut StdRng, parameter: &Parameter) {
            SamplingFamily::Gaussian.sample_chunk(chunk, rng, parameter);
        }
        fn update_parameter(&self, _h: &ParameterHistory, e: &EliteSample) -> Result<Parameter> {
            crate::estimator::gaussian_update(e)
        }
        fn stop_at_intermediate_iteration(
            &self,
            _iteration: usize,
            _levels: &[f64],
            h: &ParameterHistory,
        ) -> bool {
            h.last()[(1, 0)] < 1e-3
        }
    }

    impl OptimizationContext for Peak {
        fn optimization_goal(&self) -> OptimizationGoal {
            OptimizationGoal::Maximization
        }
        fn optimal_state(&self, parameter: &Parameter) -> Vec<f64> {
            vec![parameter[(0, 0)]]
        }
    }

    fn config() -> CrossEntropyConfig {
        CrossEntropyConfig {
            sample_size: 500,
            max_iterations: 200,
            n_chunks: Some(4),
            ..Default::default()
        }
    }

    #[test]
    fn test_finds_peak() {
        let ctx = Peak {
            initial: DMatrix::from_row_slice(2, 1, &[-5.0, 10.0]),
            definition: EliteSampleDefinition::HigherThanLevel,
        };
        let r = SystemPerformanceOptimizer::new(config()).unwrap().optimize(&ctx).unwrap();
        assert!(r.converged());
        assert!((r.optimal_state[0] - 1.5).abs() < 0.05, "x = {}", r.optimal_state[0]);
        assert!(r.optimal_performance > -0.01);
        assert_eq!(r.levels.len(), r.n_iterations);
        assert_eq!(r.n_total_samples, 500 * r.n_iterations);
        assert_eq!(r.optimal_parameter.shape(), (2, 1));
    }

    #[test]
    fn test_rejects_definition_goal_mismatch() {
        let ctx = Peak {
            initial: DMatrix::from_row_slice(2, 1, &[0.0, 1.0]),
            definition: EliteSampleDefinition::LowerThanLevel,
        };
        let err = SystemPerformanceOptimizer::new(config()).unwrap().optimize(&ctx).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_rejects_bad_config() {
        let bad = CrossEntropyConfig { rarity: 1.5, ..Default::default() };
        assert!(SystemPerformanceOptimizer::new(bad).is_err());
    }
}
