//! Elite selection.
//!
//! The level of an iteration is the `⌈ρ·N⌉`-th best performance, where "best" follows
//! the elite sample definition. Rows are elite when they pass the level test; with the
//! inclusive boundary the elite count is `⌈ρ·N⌉` plus any ties at the level.

use ce_core::{EliteBoundary, EliteSample, EliteSampleDefinition, Error, Result};

use crate::sampler::Sample;

/// Number of elite rows targeted for a sample of `sample_size` rows: `⌈ρ·N⌉`, at least 1.
///
/// A few ulps are shaved off `ρ·N` first so that products such as `0.07 * 100` do
/// not round up to the next integer.
pub fn elite_count(sample_size: usize, rarity: f64) -> usize {
    let target = rarity * sample_size as f64;
    let count = (target - target * 4.0 * f64::EPSILON).ceil();
    (count as usize).clamp(1, sample_size.max(1))
}

/// 1-based ascending order-statistic index of the level.
pub fn level_rank(sample_size: usize, rarity: f64, definition: EliteSampleDefinition) -> usize {
    let k = elite_count(sample_size, rarity);
    match definition {
        EliteSampleDefinition::LowerThanLevel => k,
        EliteSampleDefinition::HigherThanLevel => sample_size - k + 1,
    }
}

/// Empirical level of a performance vector.
///
/// Sorting uses `f64::total_cmp`, so NaN performances sort to the ends instead of
/// aborting the run; a NaN level then selects no rows.
pub fn compute_level(performances: &[f64], rarity: f64, definition: EliteSampleDefinition) -> f64 {
    if performances.is_empty() {
        return f64::NAN;
    }
    let mut sorted = performances.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted[level_rank(sorted.len(), rarity, definition) - 1]
}

/// Rows of `sample` that pass the level test.
///
/// An empty selection is an error: the update rule would have nothing to estimate from.
pub fn select_elite(
    sample: &Sample,
    level: f64,
    definition: EliteSampleDefinition,
    boundary: EliteBoundary,
    iteration: usize,
) -> Result<EliteSample> {
    let indices: Vec<usize> = sample
        .performances()
        .iter()
        .enumerate()
        .filter(|&(_, &p)| definition.passes(p, level, boundary))
        .map(|(i, _)| i)
        .collect();

    if indices.is_empty() {
        return Err(Error::EmptyEliteSample { iteration, level, sample_size: sample.len() });
    }

    let values = sample.values().select_rows(indices.iter());
    let performances = indices.iter().map(|&i| sample.performances()[i]).collect();
    Ok(EliteSample::new(values, performances, level))
}
