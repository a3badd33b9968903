//! Common data types for the cross-entropy engine

use std::ops::Range;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Parameter of a sampling distribution.
///
/// The shape is defined by the context that owns the distribution family: for example
/// `2 × D` (means in row 0, standard deviations in row 1) for independent Gaussians, or
/// `1 × D` for Bernoulli probabilities and Exponential means.
pub type Parameter = DMatrix<f64>;

/// Direction of an optimization problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizationGoal {
    /// Look for the state with the smallest performance.
    Minimization,
    /// Look for the state with the largest performance.
    Maximization,
}

impl OptimizationGoal {
    /// Elite sample definition implied by this goal.
    pub fn elite_sample_definition(self) -> EliteSampleDefinition {
        match self {
            OptimizationGoal::Minimization => EliteSampleDefinition::LowerThanLevel,
            OptimizationGoal::Maximization => EliteSampleDefinition::HigherThanLevel,
        }
    }
}

/// Which tail of the performance distribution forms the elite sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EliteSampleDefinition {
    /// Elite rows have performance at or above the level.
    HigherThanLevel,
    /// Elite rows have performance at or below the level.
    LowerThanLevel,
}

impl EliteSampleDefinition {
    /// Whether `performance` passes the level test.
    ///
    /// NaN never passes.
    #[inline]
    pub fn passes(self, performance: f64, level: f64, boundary: EliteBoundary) -> bool {
        match (self, boundary) {
            (EliteSampleDefinition::HigherThanLevel, EliteBoundary::Inclusive) => {
                performance >= level
            }
            (EliteSampleDefinition::HigherThanLevel, EliteBoundary::Exclusive) => {
                performance > level
            }
            (EliteSampleDefinition::LowerThanLevel, EliteBoundary::Inclusive) => {
                performance <= level
            }
            (EliteSampleDefinition::LowerThanLevel, EliteBoundary::Exclusive) => {
                performance < level
            }
        }
    }
}

/// Treatment of rows whose performance equals the level exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EliteBoundary {
    /// Ties at the level are elite.
    #[default]
    Inclusive,
    /// Ties at the level are not elite.
    Exclusive,
}

/// Side of the threshold on which a rare event lies.
///
/// `Lower` means the threshold bounds the event from below: the event is
/// `{performance >= threshold}`. `Upper` means the event is `{performance <= threshold}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RareEventPerformanceBoundedness {
    /// Event is `{performance >= threshold}`.
    Lower,
    /// Event is `{performance <= threshold}`.
    Upper,
}

impl RareEventPerformanceBoundedness {
    /// Elite sample definition that drives the adaptation toward the event.
    pub fn elite_sample_definition(self) -> EliteSampleDefinition {
        match self {
            RareEventPerformanceBoundedness::Lower => EliteSampleDefinition::HigherThanLevel,
            RareEventPerformanceBoundedness::Upper => EliteSampleDefinition::LowerThanLevel,
        }
    }

    /// Indicator of the rare event.
    #[inline]
    pub fn contains(self, performance: f64, threshold: f64) -> bool {
        match self {
            RareEventPerformanceBoundedness::Lower => performance >= threshold,
            RareEventPerformanceBoundedness::Upper => performance <= threshold,
        }
    }

    /// Clamp an empirical level so that it never overshoots the threshold.
    ///
    /// Returns the clamped level and whether the threshold has been reached.
    pub fn clamp_level(self, level: f64, threshold: f64) -> (f64, bool) {
        if self.contains(level, threshold) { (threshold, true) } else { (level, false) }
    }
}

/// Why an iteration loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The stopping predicate held after the minimum number of iterations.
    Converged,
    /// The iteration ceiling was hit before the stopping predicate held.
    MaxIterationsReached,
}

// ---------------------------------------------------------------------------
// Parameter history
// ---------------------------------------------------------------------------

/// Append-only sequence of parameters, one per completed iteration.
///
/// The first entry is the initial (nominal) parameter and the history is never empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawParameterHistory")]
pub struct ParameterHistory {
    entries: Vec<Parameter>,
}

#[derive(Deserialize)]
struct RawParameterHistory {
    entries: Vec<Parameter>,
}

impl TryFrom<RawParameterHistory> for ParameterHistory {
    type Error = Error;

    fn try_from(raw: RawParameterHistory) -> Result<Self> {
        if raw.entries.is_empty() {
            return Err(Error::Validation("parameter history must not be empty".into()));
        }
        Ok(Self { entries: raw.entries })
    }
}

impl ParameterHistory {
    /// Start a history from the initial parameter.
    pub fn new(initial: Parameter) -> Self {
        Self { entries: vec![initial] }
    }

    /// Number of stored parameters (iterations completed + 1).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First-ever parameter.
    pub fn nominal(&self) -> &Parameter {
        &self.entries[0]
    }

    /// Most recent parameter.
    pub fn last(&self) -> &Parameter {
        &self.entries[self.entries.len() - 1]
    }

    /// Parameter before the most recent one, if any.
    pub fn previous(&self) -> Option<&Parameter> {
        let n = self.entries.len();
        if n >= 2 { Some(&self.entries[n - 2]) } else { None }
    }

    /// Append the parameter produced by a new iteration.
    pub fn push(&mut self, parameter: Parameter) {
        self.entries.push(parameter);
    }

    /// Replace the most recent parameter (smoothing).
    pub fn replace_last(&mut self, parameter: Parameter) {
        let n = self.entries.len();
        self.entries[n - 1] = parameter;
    }

    /// Iterate from the nominal parameter to the most recent one.
    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.entries.iter()
    }

    /// Consume the history and keep only the most recent parameter.
    pub fn into_last(mut self) -> Parameter {
        let n = self.entries.len();
        self.entries.swap_remove(n - 1)
    }
}

// ---------------------------------------------------------------------------
// Sample chunk
// ---------------------------------------------------------------------------

/// Destination for one worker's share of a sample.
///
/// Represents rows `[rows.start, rows.end)` of an `N × D` sample. Storage is a private
/// column-major `len × D` block, so every column is a contiguous slice and chunks can be
/// filled concurrently without sharing memory.
#[derive(Debug, Clone)]
pub struct SampleChunk {
    rows: Range<usize>,
    sample_size: usize,
    values: DMatrix<f64>,
}

impl SampleChunk {
    /// Create a zero-filled chunk covering `rows` of a sample with `sample_size` rows.
    pub fn new(rows: Range<usize>, sample_size: usize, dimension: usize) -> Self {
        let len = rows.end.saturating_sub(rows.start);
        Self { rows, sample_size, values: DMatrix::zeros(len, dimension) }
    }

    /// Rows of the full sample covered by this chunk.
    pub fn rows(&self) -> Range<usize> {
        self.rows.clone()
    }

    /// Number of rows in this chunk.
    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    /// Whether the chunk covers no rows.
    pub fn is_empty(&self) -> bool {
        self.values.nrows() == 0
    }

    /// Total number of rows of the sample this chunk belongs to.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// State dimension (number of columns).
    pub fn dimension(&self) -> usize {
        self.values.ncols()
    }

    /// Mutable contiguous slice of column `j`, one entry per chunk row.
    pub fn column_mut(&mut self, j: usize) -> &mut [f64] {
        let len = self.values.nrows();
        &mut self.values.as_mut_slice()[j * len..(j + 1) * len]
    }

    /// Set the entry at global sample row `row` and column `col`.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        debug_assert!(self.rows.contains(&row), "row {} outside chunk {:?}", row, self.rows);
        self.values[(row - self.rows.start, col)] = value;
    }

    /// Chunk values, local row 0 being global row `rows().start`.
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }
}

// ---------------------------------------------------------------------------
// Elite sample
// ---------------------------------------------------------------------------

/// Rows of an iteration's sample that passed the level test.
#[derive(Debug, Clone)]
pub struct EliteSample {
    values: DMatrix<f64>,
    performances: Vec<f64>,
    level: f64,
}

impl EliteSample {
    /// Build an elite sample from its rows and their performances.
    pub fn new(values: DMatrix<f64>, performances: Vec<f64>, level: f64) -> Self {
        debug_assert_eq!(values.nrows(), performances.len());
        Self { values, performances, level }
    }

    /// Number of elite rows.
    pub fn len(&self) -> usize {
        self.performances.len()
    }

    /// Whether no row passed the level test.
    pub fn is_empty(&self) -> bool {
        self.performances.is_empty()
    }

    /// Elite rows as an `n_elite × D` matrix.
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Performance of each elite row.
    pub fn performances(&self) -> &[f64] {
        &self.performances
    }

    /// Level used to select the rows.
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Copy elite row `i` into an owned state vector.
    pub fn state(&self, i: usize) -> Vec<f64> {
        self.values.row(i).iter().copied().collect()
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome of a cross-entropy optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// State extracted from the final parameter.
    pub optimal_state: Vec<f64>,
    /// Performance evaluated at `optimal_state`.
    pub optimal_performance: f64,
    /// Final sampling parameter.
    pub optimal_parameter: Parameter,
    /// Level of each iteration, oldest first.
    pub levels: Vec<f64>,
    /// Number of completed iterations.
    pub n_iterations: usize,
    /// Number of sampled states across all iterations.
    pub n_total_samples: usize,
    /// Whether the stop rule fired or the iteration ceiling was hit.
    pub termination: TerminationReason,
    /// Wall-clock time in seconds.
    pub wall_time_s: f64,
}

impl OptimizationResult {
    /// `true` when the run stopped on its stopping rule.
    pub fn converged(&self) -> bool {
        self.termination == TerminationReason::Converged
    }
}

/// Outcome of a rare-event probability estimation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RareEventResult {
    /// Importance-sampling estimate of the event probability.
    pub probability: f64,
    /// Standard error of `probability`.
    pub se: f64,
    /// Lower end of the 95% Wald interval (clamped at zero).
    pub ci_lower: f64,
    /// Upper end of the 95% Wald interval.
    pub ci_upper: f64,
    /// `se / probability` (infinite when the estimate is zero).
    pub coefficient_of_variation: f64,
    /// Threshold that defines the event.
    pub threshold_level: f64,
    /// Reference parameter used for the final sample.
    pub reference_parameter: Parameter,
    /// Level of each adaptation iteration, oldest first.
    pub levels: Vec<f64>,
    /// Number of adaptation iterations.
    pub n_iterations: usize,
    /// Rows of the final sample that fell in the event.
    pub n_hits: usize,
    /// Sampled states across adaptation and estimation.
    pub n_total_samples: usize,
    /// Whether the threshold was reached or the iteration ceiling was hit.
    pub termination: TerminationReason,
    /// Wall-clock time in seconds.
    pub wall_time_s: f64,
}
