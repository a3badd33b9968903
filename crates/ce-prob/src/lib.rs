//! Probability building blocks for the cross-entropy engine.
//!
//! This crate hosts the pieces the engine consumes from its numeric collaborators:
//! - reproducible per-chunk random streams
//! - sampling families (Exponential, Gaussian, Bernoulli) and their density ratios
//! - column statistics over sample matrices

pub mod bernoulli;
pub mod distributions;
pub mod exponential;
pub mod normal;
pub mod rng;
pub mod stats;

pub use distributions::SamplingFamily;
pub use rng::RandomStreams;
