//! Rare-event probability estimation by cross-entropy importance sampling.
//!
//! The adaptation loop moves the reference parameter toward the event, one clamped
//! level at a time. Once the level reaches the threshold a final sample is drawn under
//! the reference parameter and the probability is estimated as
//!
//! `p̂ = (1/N₁) Σ I{x ∈ event} · f(x; nominal) / f(x; reference)`
//!
//! with standard error `sqrt((mean(I·W²) − p̂²) / N₁)` and a 95% Wald interval.

use std::time::Instant;

use ce_core::{Error, Parameter, RareEventContext, RareEventResult, Result, TerminationReason};

use crate::config::{CancellationToken, RareEventConfig};
use crate::engine::run_adaptation;
use crate::sampler::{Sample, Sampler};

/// Importance-sampling estimate over one final sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportanceEstimate {
    /// `p̂`.
    pub probability: f64,
    /// Standard error of `p̂`.
    pub se: f64,
    /// Rows inside the event.
    pub n_hits: usize,
}

impl ImportanceEstimate {
    /// 95% Wald interval, lower end clamped at zero.
    pub fn confidence_interval(&self) -> (f64, f64) {
        ((self.probability - 1.96 * self.se).max(0.0), self.probability + 1.96 * self.se)
    }

    /// `se / p̂`, infinite when `p̂ = 0`.
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.probability > 0.0 { self.se / self.probability } else { f64::INFINITY }
    }
}

/// Likelihood-ratio weighted indicator average over `sample`.
pub fn importance_estimate<C>(
    context: &C,
    sample: &Sample,
    nominal: &Parameter,
    reference: &Parameter,
) -> ImportanceEstimate
where
    C: RareEventContext + ?Sized,
{
    let threshold = context.threshold_level();
    let boundedness = context.performance_boundedness();

    let mut state = vec![0.0; sample.values().ncols()];
    let mut w_sum = 0.0f64;
    let mut w2_sum = 0.0f64;
    let mut n_hits = 0usize;
    for (i, &perf) in sample.performances().iter().enumerate() {
        if boundedness.contains(perf, threshold) {
            sample.copy_state(i, &mut state);
            let w = context.likelihood_ratio(&state, nominal, reference);
            w_sum += w;
            w2_sum += w * w;
            n_hits += 1;
        }
    }

    let n = sample.len() as f64;
    let p_hat = w_sum / n;
    let var_hat = (w2_sum / n - p_hat * p_hat) / n;
    ImportanceEstimate { probability: p_hat, se: var_hat.max(0.0).sqrt(), n_hits }
}

/// Estimates `Pr{performance(X) ≥ threshold}` or `Pr{performance(X) ≤ threshold}` under
/// the nominal parameter of a [`RareEventContext`].
#[derive(Debug, Clone, Default)]
pub struct RareEventProbabilityEstimator {
    config: RareEventConfig,
}

impl RareEventProbabilityEstimator {
    /// Estimator with a validated configuration.
    pub fn new(config: RareEventConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use.
    pub fn config(&self) -> &RareEventConfig {
        &self.config
    }

    /// Adapt the reference parameter and estimate the event probability.
    pub fn estimate<C>(&self, context: &C) -> Result<RareEventResult>
    where
        C: RareEventContext + ?Sized,
    {
        self.run(context, None)
    }

    /// Same as [`estimate`](Self::estimate), checking `cancel` between iterations.
    pub fn estimate_with_cancellation<C>(
        &self,
        context: &C,
        cancel: &CancellationToken,
    ) -> Result<RareEventResult>
    where
        C: RareEventContext + ?Sized,
    {
        self.run(context, Some(cancel))
    }

    fn run<C>(&self, context: &C, cancel: Option<&CancellationToken>) -> Result<RareEventResult>
    where
        C: RareEventContext + ?Sized,
    {
        let threshold = context.threshold_level();
        if !threshold.is_finite() {
            return Err(Error::Validation(format!(
                "threshold_level must be finite, got {}",
                threshold
            )));
        }
        let boundedness = context.performance_boundedness();
        let definition = context.elite_sample_definition();
        if definition != boundedness.elite_sample_definition() {
            return Err(Error::Validation(format!(
                "elite sample definition {:?} does not match performance boundedness {:?}",
                definition, boundedness
            )));
        }

        let t0 = Instant::now();
        let adaptation = &self.config.adaptation;
        let result = run_adaptation(context, adaptation, cancel, |level| {
            boundedness.clamp_level(level, threshold)
        })?;

        if result.termination == TerminationReason::MaxIterationsReached {
            log::warn!(
                "CE rare-event: threshold {} not reached after {} iterations \
                 (last level = {:.6e}); estimating with the current reference parameter",
                threshold,
                result.n_iterations,
                result.levels.last().copied().unwrap_or(f64::NAN)
            );
        }

        let sampler = Sampler::new(adaptation.seed, adaptation.chunk_count());
        let round = result.n_iterations as u64 + 1;
        let reference = result.history.last();
        let sample = sampler.draw(context, reference, self.config.final_sample_size, round);
        let nominal = context.initial_parameter();
        let estimate = importance_estimate(context, &sample, nominal, reference);

        if estimate.n_hits == 0 {
            log::warn!(
                "CE rare-event: no final-sample row hit the event (N = {}); estimate is 0",
                sample.len()
            );
        }

        let (ci_lower, ci_upper) = estimate.confidence_interval();
        let wall_time_s = t0.elapsed().as_secs_f64();
        log::info!(
            "CE rare-event: p = {:.6e} (se = {:.3e}, hits = {}) after {} iterations",
            estimate.probability,
            estimate.se,
            estimate.n_hits,
            result.n_iterations
        );

        Ok(RareEventResult {
            probability: estimate.probability,
            se: estimate.se,
            ci_lower,
            ci_upper,
            coefficient_of_variation: estimate.coefficient_of_variation(),
            threshold_level: threshold,
            reference_parameter: result.history.into_last(),
            levels: result.levels,
            n_iterations: result.n_iterations,
            n_hits: estimate.n_hits,
            n_total_samples: result.n_samples + sample.len(),
            termination: result.termination,
            wall_time_s,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ce_core::{
        CrossEntropyContext, EliteSample, EliteSampleDefinition, ParameterHistory,
        RareEventPerformanceBoundedness, SampleChunk,
    };
    use ce_prob::SamplingFamily;
    use nalgebra::DMatrix;
    use rand::rngs::StdRng;

    /// `Pr{X ≥ t}` for a single Exponential with mean 1: exactly `exp(-t)`.
    struct ExpTail {
        nominal: Parameter,
        threshold: f64,
        definition: EliteSampleDefinition,
    }

    impl ExpTail {
        fn new(threshold: f64) -> Self {
            Self {
                nominal: DMatrix::from_element(1, 1, 1.0),
                threshold,
                definition: EliteSampleDefinition::HigherThanLevel,
            }
        }
    }

    impl CrossEntropyContext for ExpTail {
        fn state_dimension(&self) -> usize {
            1
        }
        fn initial_parameter(&self) -> &Parameter {
            &self.nominal
        }
        fn elite_sample_definition(&self) -> EliteSampleDefinition {
            self.definition
        }
        fn performance(&self, state: &[f64]) -> f64 {
            state[0]
        }
        fn partial_sample(&self, chunk: &mut SampleChunk, rng: &mut StdRng, parameter: &Parameter) {
            SamplingFamily::Exponential.sample_chunk(chunk, rng, parameter);
        }
        fn update_parameter(&self, h: &ParameterHistory, e: &EliteSample) -> Result<Parameter> {
            let w = crate::estimator::likelihood_weights(self, h, e)?;
            crate::estimator::weighted_mean_update(e, &w)
        }
    }

    impl RareEventContext for ExpTail {
        fn threshold_level(&self) -> f64 {
            self.threshold
        }
        fn performance_boundedness(&self) -> RareEventPerformanceBoundedness {
            RareEventPerformanceBoundedness::Lower
        }
        fn likelihood_ratio(
            &self,
            state: &[f64],
            nominal: &Parameter,
            reference: &Parameter,
        ) -> f64 {
            SamplingFamily::Exponential.likelihood_ratio(state, nominal, reference)
        }
    }

    fn config() -> RareEventConfig {
        let mut c = RareEventConfig { final_sample_size: 200_000, ..Default::default() };
        c.adaptation.sample_size = 2_000;
        c.adaptation.n_chunks = Some(4);
        c
    }

    #[test]
    fn test_exponential_tail() {
        let ctx = ExpTail::new(15.0);
        let r = RareEventProbabilityEstimator::new(config()).unwrap().estimate(&ctx).unwrap();
        let exact = (-15.0f64).exp();
        assert_eq!(r.termination, TerminationReason::Converged);
        assert_eq!(*r.levels.last().unwrap(), 15.0);
        assert_relative_eq!(r.probability, exact, max_relative = 0.05);
        assert!(r.ci_lower <= r.probability && r.probability <= r.ci_upper);
        assert!(r.coefficient_of_variation < 0.02);
        assert!(r.n_hits > 0);
        assert_eq!(r.n_total_samples, 2_000 * r.n_iterations + 200_000);
        assert!(r.reference_parameter[(0, 0)] > 5.0);
    }

    #[test]
    fn test_levels_never_overshoot_threshold() {
        let ctx = ExpTail::new(12.0);
        let r = RareEventProbabilityEstimator::new(config()).unwrap().estimate(&ctx).unwrap();
        for w in r.levels.windows(2) {
            assert!(w[0] <= 12.0);
            assert!(w[1] <= 12.0);
        }
    }

    #[test]
    fn test_easy_event_stops_after_one_iteration() {
        let ctx = ExpTail::new(0.5);
        let r = RareEventProbabilityEstimator::new(config()).unwrap().estimate(&ctx).unwrap();
        assert_eq!(r.n_iterations, 1);
        assert_relative_eq!(r.probability, (-0.5f64).exp(), max_relative = 0.03);
    }

    #[test]
    fn test_rejects_definition_mismatch() {
        let mut ctx = ExpTail::new(5.0);
        ctx.definition = EliteSampleDefinition::LowerThanLevel;
        let err = RareEventProbabilityEstimator::default().estimate(&ctx).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_rejects_non_finite_threshold() {
        let ctx = ExpTail::new(f64::INFINITY);
        assert!(RareEventProbabilityEstimator::default().estimate(&ctx).is_err());
    }

    #[test]
    fn test_estimate_on_fixed_sample() {
        let ctx = ExpTail::new(1.0);
        let nominal = ctx.nominal.clone();
        let sampler = Sampler::new(3, 2);
        let sample = sampler.draw(&ctx, &nominal, 4_000, 1);
        let e = importance_estimate(&ctx, &sample, &nominal, &nominal);
        let hits = sample.performances().iter().filter(|&&p| p >= 1.0).count();
        assert_eq!(e.n_hits, hits);
        assert_relative_eq!(e.probability, hits as f64 / 4_000.0, epsilon = 1e-12);
        let p = e.probability;
        assert_relative_eq!(e.se, (p * (1.0 - p) / 4_000.0).sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_zero_estimate_interval() {
        let e = ImportanceEstimate { probability: 0.0, se: 0.0, n_hits: 0 };
        assert_eq!(e.confidence_interval(), (0.0, 0.0));
        assert!(e.coefficient_of_variation().is_infinite());
    }
}
