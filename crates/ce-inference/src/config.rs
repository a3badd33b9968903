//! Engine configuration and cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ce_core::{EliteBoundary, Error, Result};
use serde::{Deserialize, Serialize};

/// Hyperparameters of the cross-entropy iteration loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossEntropyConfig {
    /// Elite fraction ρ (default 0.1).
    pub rarity: f64,
    /// Sampled states per iteration (default 1,000).
    pub sample_size: usize,
    /// Iterations that always run before the stop rule is consulted (default 1).
    pub min_iterations: usize,
    /// Hard iteration ceiling (default 1,000).
    pub max_iterations: usize,
    /// RNG seed.
    pub seed: u64,
    /// Number of sampling chunks. `None` uses the size of the Rayon pool.
    ///
    /// Results are reproducible for a fixed seed and a fixed chunk count.
    pub n_chunks: Option<usize>,
    /// Whether ties at the level are elite.
    pub elite_boundary: EliteBoundary,
}

impl Default for CrossEntropyConfig {
    fn default() -> Self {
        Self {
            rarity: 0.1,
            sample_size: 1_000,
            min_iterations: 1,
            max_iterations: 1_000,
            seed: 42,
            n_chunks: None,
            elite_boundary: EliteBoundary::Inclusive,
        }
    }
}

impl CrossEntropyConfig {
    /// Check every field; messages name the offending field.
    pub fn validate(&self) -> Result<()> {
        if !self.rarity.is_finite() || self.rarity <= 0.0 || self.rarity >= 1.0 {
            return Err(Error::Validation(format!(
                "rarity must be in (0, 1), got {}",
                self.rarity
            )));
        }
        if self.sample_size == 0 {
            return Err(Error::Validation("sample_size must be > 0".into()));
        }
        if self.min_iterations == 0 {
            return Err(Error::Validation("min_iterations must be > 0".into()));
        }
        if self.min_iterations > self.max_iterations {
            return Err(Error::Validation(format!(
                "min_iterations ({}) must not exceed max_iterations ({})",
                self.min_iterations, self.max_iterations
            )));
        }
        if self.n_chunks == Some(0) {
            return Err(Error::Validation("n_chunks must be > 0 when set".into()));
        }
        Ok(())
    }

    /// Effective number of sampling chunks, never more than `sample_size`.
    pub fn chunk_count(&self) -> usize {
        self.n_chunks.unwrap_or_else(rayon::current_num_threads).clamp(1, self.sample_size.max(1))
    }
}

/// Configuration of a rare-event probability estimation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RareEventConfig {
    /// Adaptation loop settings.
    pub adaptation: CrossEntropyConfig,
    /// States drawn under the final reference parameter (default 10,000).
    pub final_sample_size: usize,
}

impl Default for RareEventConfig {
    fn default() -> Self {
        Self { adaptation: CrossEntropyConfig::default(), final_sample_size: 10_000 }
    }
}

impl RareEventConfig {
    /// Check every field.
    pub fn validate(&self) -> Result<()> {
        self.adaptation.validate()?;
        if self.final_sample_size == 0 {
            return Err(Error::Validation("final_sample_size must be > 0".into()));
        }
        Ok(())
    }
}

/// Cooperative cancellation flag, checked between iterations.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Fresh, non-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The running iteration completes first.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
