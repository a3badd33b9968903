//! # ce-core
//!
//! Core types, traits and errors for the cross-entropy engine.
//!
//! This crate has no sampling or estimation logic of its own: it defines the
//! vocabulary (parameters, histories, elite samples, results) and the context traits
//! that `ce-inference` drives.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Error types.
pub mod error;
/// Context traits.
pub mod traits;
/// Shared data types and result records.
pub mod types;

pub use error::{Error, Result};
pub use traits::{CrossEntropyContext, OptimizationContext, RareEventContext};
pub use types::{
    EliteBoundary, EliteSample, EliteSampleDefinition, OptimizationGoal, OptimizationResult,
    Parameter, ParameterHistory, RareEventPerformanceBoundedness, RareEventResult, SampleChunk,
    TerminationReason,
};
