//! Shared adaptation loop.
//!
//! Both algorithm modes run the same iteration: sample from the last parameter, compute
//! the level, select the elite, update, smooth, and ask whether to stop. They differ
//! only in how the empirical level is post-processed, which the caller passes in as a
//! level rule.

use ce_core::{CrossEntropyContext, Error, ParameterHistory, Result, TerminationReason};

use crate::config::{CancellationToken, CrossEntropyConfig};
use crate::convergence::ConvergenceController;
use crate::elite::{compute_level, select_elite};
use crate::sampler::Sampler;

/// Outcome of the adaptation loop.
#[derive(Debug, Clone)]
pub(crate) struct Adaptation {
    pub history: ParameterHistory,
    pub levels: Vec<f64>,
    pub n_iterations: usize,
    pub n_samples: usize,
    pub termination: TerminationReason,
}

/// Check the context against itself before any sampling happens.
pub(crate) fn validate_context<C>(context: &C) -> Result<()>
where
    C: CrossEntropyContext + ?Sized,
{
    let dimension = context.state_dimension();
    if dimension == 0 {
        return Err(Error::Validation("state_dimension must be > 0".into()));
    }
    let initial = context.initial_parameter();
    if initial.nrows() == 0 || initial.ncols() != dimension {
        return Err(Error::Validation(format!(
            "initial parameter must have {} columns and at least one row, got {}x{}",
            dimension,
            initial.nrows(),
            initial.ncols()
        )));
    }
    Ok(())
}

/// Run the iteration loop until the controller terminates.
///
/// `level_rule` maps the empirical level to the level used for selection and reports
/// whether the target has been reached; a reached target counts as a stop request.
pub(crate) fn run_adaptation<C, L>(
    context: &C,
    config: &CrossEntropyConfig,
    cancel: Option<&CancellationToken>,
    mut level_rule: L,
) -> Result<Adaptation>
where
    C: CrossEntropyContext + ?Sized,
    L: FnMut(f64) -> (f64, bool),
{
    config.validate()?;
    validate_context(context)?;

    let mut controller = ConvergenceController::new(config.min_iterations, config.max_iterations)?;
    let sampler = Sampler::new(config.seed, config.chunk_count());
    let definition = context.elite_sample_definition();

    let mut history = ParameterHistory::new(context.initial_parameter().clone());
    let mut levels: Vec<f64> = Vec::new();
    let mut n_samples = 0usize;

    while controller.should_continue() {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            log::info!("CE: cancelled after {} iterations", levels.len());
            return Err(Error::Cancelled(levels.len()));
        }

        let iteration = controller.begin_iteration()?;
        let sample = sampler.draw(context, history.last(), config.sample_size, iteration as u64);
        n_samples += sample.len();

        let empirical = compute_level(sample.performances(), config.rarity, definition);
        let (level, reached) = level_rule(empirical);
        let elite = select_elite(&sample, level, definition, config.elite_boundary, iteration)?;

        let next = context.update_parameter(&history, &elite)?;
        history.push(next);
        if iteration >= 2 {
            context.smooth_parameter(iteration, &mut history)?;
        }
        levels.push(level);

        log::debug!(
            "CE iteration {}: level = {:.6e}, elite = {}/{}",
            iteration,
            level,
            elite.len(),
            sample.len()
        );

        let stop = reached || context.stop_at_intermediate_iteration(iteration, &levels, &history);
        controller.end_iteration(stop);
    }

    let termination = controller.finish()?;
    Ok(Adaptation { history, n_iterations: levels.len(), levels, n_samples, termination })
}
