//! Parameter re-estimation from an elite sample.
//!
//! Plain updates use the elite sufficient statistics only. Likelihood-ratio updates
//! re-weight every elite row by `f(x; nominal) / f(x; reference)`, where the nominal
//! parameter is the first history entry and the reference parameter the most recent
//! one, so that the adapted density targets the nominal law conditioned on the event.

use ce_core::{EliteSample, Error, Parameter, ParameterHistory, RareEventContext, Result};
use ce_prob::stats;
use nalgebra::DMatrix;

fn ensure_non_empty(elite_sample: &EliteSample) -> Result<()> {
    if elite_sample.is_empty() {
        return Err(Error::Computation("cannot update parameter from an empty elite sample".into()));
    }
    Ok(())
}

fn stack_rows(rows: &[&[f64]]) -> Parameter {
    let ncols = rows.first().map_or(0, |r| r.len());
    DMatrix::from_fn(rows.len(), ncols, |i, j| rows[i][j])
}

/// `1 × D` parameter of elite column means (Bernoulli probabilities, Exponential means).
pub fn mean_update(elite_sample: &EliteSample) -> Result<Parameter> {
    ensure_non_empty(elite_sample)?;
    let means = stats::column_means(elite_sample.values());
    Ok(stack_rows(&[&means]))
}

/// `2 × D` Gaussian parameter: elite column means in row 0, biased column standard
/// deviations in row 1.
pub fn gaussian_update(elite_sample: &EliteSample) -> Result<Parameter> {
    ensure_non_empty(elite_sample)?;
    let means = stats::column_means(elite_sample.values());
    let std_devs = stats::column_std_devs(elite_sample.values(), false)?;
    Ok(stack_rows(&[&means, &std_devs]))
}

/// Likelihood ratio of every elite row between the nominal and reference parameters.
pub fn likelihood_weights<C>(
    context: &C,
    history: &ParameterHistory,
    elite_sample: &EliteSample,
) -> Result<Vec<f64>>
where
    C: RareEventContext + ?Sized,
{
    ensure_non_empty(elite_sample)?;
    let nominal = history.nominal();
    let reference = history.last();
    let weights: Vec<f64> = (0..elite_sample.len())
        .map(|i| context.likelihood_ratio(&elite_sample.state(i), nominal, reference))
        .collect();
    Ok(weights)
}

/// `1 × D` parameter of weighted elite column means: `Σ w(x)·x / Σ w(x)`.
pub fn weighted_mean_update(elite_sample: &EliteSample, weights: &[f64]) -> Result<Parameter> {
    ensure_non_empty(elite_sample)?;
    let means = stats::weighted_column_means(elite_sample.values(), weights)?;
    Ok(stack_rows(&[&means]))
}

/// `2 × D` Gaussian parameter from weighted elite means and standard deviations.
pub fn weighted_gaussian_update(elite_sample: &EliteSample, weights: &[f64]) -> Result<Parameter> {
    ensure_non_empty(elite_sample)?;
    let means = stats::weighted_column_means(elite_sample.values(), weights)?;
    let std_devs = stats::weighted_column_std_devs(elite_sample.values(), weights, &means)?;
    Ok(stack_rows(&[&means, &std_devs]))
}
