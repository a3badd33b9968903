//! Error types for the cross-entropy engine

use thiserror::Error;

/// Cross-entropy engine error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error, reported before any sampling happens
    #[error("Validation error: {0}")]
    Validation(String),

    /// Degenerate statistics or other numerical failure
    #[error("Computation error: {0}")]
    Computation(String),

    /// No sampled row satisfied the level test
    #[error(
        "Empty elite sample at iteration {iteration} (level = {level}, sample size = {sample_size})"
    )]
    EmptyEliteSample {
        /// Iteration (1-based) at which selection failed
        iteration: usize,
        /// Level used for selection
        level: f64,
        /// Number of rows that were classified
        sample_size: usize,
    },

    /// Likelihood-ratio weights sum to zero (or underflow)
    #[error("Degenerate likelihood ratio weights: sum = {sum:e} over {n_elite} elite rows")]
    DegenerateWeights {
        /// Sum of the weights
        sum: f64,
        /// Number of weighted rows
        n_elite: usize,
    },

    /// Run stopped by a cancellation token
    #[error("Cancelled after {0} completed iterations")]
    Cancelled(usize),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_problem() {
        let e = Error::Validation("rarity must be in (0, 1), got 1.5".into());
        assert_eq!(e.to_string(), "Validation error: rarity must be in (0, 1), got 1.5");

        let e = Error::EmptyEliteSample { iteration: 3, level: 2.5, sample_size: 100 };
        assert!(e.to_string().contains("iteration 3"));
        assert!(e.to_string().contains("sample size = 100"));

        let e = Error::DegenerateWeights { sum: 0.0, n_elite: 7 };
        assert!(e.to_string().contains("7 elite rows"));
    }
}
