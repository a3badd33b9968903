//! # ce-inference
//!
//! Cross-entropy optimization and rare-event probability estimation.
//!
//! This crate provides:
//! - a parallel, reproducible sampler (one RNG stream per chunk)
//! - elite selection with configurable tie handling
//! - plain and likelihood-ratio weighted parameter updates
//! - constant and time-varying parameter smoothing
//! - [`SystemPerformanceOptimizer`] and [`RareEventProbabilityEstimator`]
//! - ready-made contexts over the Gaussian, Exponential and Bernoulli families
//!
//! ## Architecture
//!
//! The engine only depends on the context traits from `ce-core`. Problems plug in by
//! implementing [`ce_core::OptimizationContext`] or [`ce_core::RareEventContext`], or by
//! wrapping a performance function in one of the [`contexts`].

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Engine configuration and cancellation.
pub mod config;
/// Built-in contexts.
pub mod contexts;
/// Iteration state machine.
pub mod convergence;
/// Level computation and elite selection.
pub mod elite;
/// Shared adaptation loop.
mod engine;
/// Parameter updates from elite samples.
pub mod estimator;
/// Optimization mode.
pub mod optimizer;
/// Rare-event estimation mode.
pub mod rare_event;
/// Parallel sampler.
pub mod sampler;
/// Parameter smoothing.
pub mod smoothing;

pub use config::{CancellationToken, CrossEntropyConfig, RareEventConfig};
pub use contexts::{
    BernoulliOptimizationContext, ExponentialRareEventContext, NormalOptimizationContext,
    NormalRareEventContext,
};
pub use convergence::{ControllerState, ConvergenceController};
pub use optimizer::SystemPerformanceOptimizer;
pub use rare_event::{ImportanceEstimate, RareEventProbabilityEstimator};
pub use sampler::{Sample, Sampler};
pub use smoothing::Smoothing;
