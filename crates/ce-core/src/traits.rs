//! Core traits for the cross-entropy engine
//!
//! A context is the problem-specific strategy the engine drives: it owns the
//! performance function, the sampling family and the parameter-update rule. The
//! engine itself (ce-inference) only depends on these traits.

use rand::rngs::StdRng;

use crate::Result;
use crate::types::{
    EliteSample, EliteSampleDefinition, OptimizationGoal, Parameter, ParameterHistory,
    RareEventPerformanceBoundedness, SampleChunk,
};

/// Strategy shared by optimization and rare-event estimation.
pub trait CrossEntropyContext: Send + Sync {
    /// Length of every sampled state.
    fn state_dimension(&self) -> usize;

    /// Parameter the first iteration samples from.
    fn initial_parameter(&self) -> &Parameter;

    /// Which tail of the performance distribution is elite.
    fn elite_sample_definition(&self) -> EliteSampleDefinition;

    /// Performance of a state. Must not depend on anything but `state`.
    fn performance(&self, state: &[f64]) -> f64;

    /// Fill `chunk` with draws from the distribution described by `parameter`.
    ///
    /// Called concurrently for disjoint chunks of the same sample, each with its own
    /// stream.
    fn partial_sample(&self, chunk: &mut SampleChunk, rng: &mut StdRng, parameter: &Parameter);

    /// Estimate the next parameter from the elite sample.
    ///
    /// `history.last()` is the parameter the elite sample was drawn from and
    /// `history.nominal()` the initial one.
    fn update_parameter(
        &self,
        history: &ParameterHistory,
        elite_sample: &EliteSample,
    ) -> Result<Parameter>;

    /// Blend the most recent parameter with the previous one.
    ///
    /// Only invoked from iteration 2 onward. The default leaves the history untouched.
    fn smooth_parameter(&self, iteration: usize, history: &mut ParameterHistory) -> Result<()> {
        let _ = (iteration, history);
        Ok(())
    }

    /// Problem-specific stopping rule evaluated after each iteration.
    fn stop_at_intermediate_iteration(
        &self,
        iteration: usize,
        levels: &[f64],
        history: &ParameterHistory,
    ) -> bool {
        let _ = (iteration, levels, history);
        false
    }
}

/// Context for optimizing a performance function.
pub trait OptimizationContext: CrossEntropyContext {
    /// Minimization or maximization.
    fn optimization_goal(&self) -> OptimizationGoal;

    /// Project a parameter onto the state it concentrates on.
    fn optimal_state(&self, parameter: &Parameter) -> Vec<f64>;
}

/// Context for estimating the probability of a rare event.
pub trait RareEventContext: CrossEntropyContext {
    /// Threshold that defines the event.
    fn threshold_level(&self) -> f64;

    /// Side of the threshold on which the event lies.
    fn performance_boundedness(&self) -> RareEventPerformanceBoundedness;

    /// Ratio of the nominal density to the reference density at `state`.
    fn likelihood_ratio(&self, state: &[f64], nominal: &Parameter, reference: &Parameter)
    -> f64;
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    struct ConstantContext {
        initial: Parameter,
    }

    impl CrossEntropyContext for ConstantContext {
        fn state_dimension(&self) -> usize {
            1
        }

        fn initial_parameter(&self) -> &Parameter {
            &self.initial
        }

        fn elite_sample_definition(&self) -> EliteSampleDefinition {
            EliteSampleDefinition::HigherThanLevel
        }

        fn performance(&self, state: &[f64]) -> f64 {
            state[0]
        }

        fn partial_sample(
            &self,
            chunk: &mut SampleChunk,
            _rng: &mut StdRng,
            parameter: &Parameter,
        ) {
            let v = parameter[(0, 0)];
            chunk.column_mut(0).fill(v);
        }

        fn update_parameter(
            &self,
            history: &ParameterHistory,
            _elite_sample: &EliteSample,
        ) -> Result<Parameter> {
            Ok(history.last().clone())
        }
    }

    #[test]
    fn test_default_hooks() {
        let ctx = ConstantContext { initial: DMatrix::from_element(1, 1, 3.0) };
        let mut history = ParameterHistory::new(ctx.initial_parameter().clone());
        ctx.smooth_parameter(2, &mut history).unwrap();
        assert_eq!(history.len(), 1);
        assert!(!ctx.stop_at_intermediate_iteration(5, &[1.0], &history));
        assert_eq!(ctx.performance(&[2.5]), 2.5);
    }
}
