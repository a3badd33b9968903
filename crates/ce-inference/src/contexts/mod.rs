//! Ready-made contexts over the built-in sampling families.
//!
//! Each context wraps a user performance function and fixes the sampling family, the
//! update rule and the stopping rule. Custom problems implement the traits from
//! `ce-core` directly.

mod bernoulli_optimization;
mod exponential_rare_event;
mod normal_optimization;
mod normal_rare_event;

pub use bernoulli_optimization::BernoulliOptimizationContext;
pub use exponential_rare_event::ExponentialRareEventContext;
pub use normal_optimization::NormalOptimizationContext;
pub use normal_rare_event::NormalRareEventContext;

use ce_core::{Error, Result};

fn check_tolerance(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::Validation(format!("{} must be finite and > 0, got {}", name, value)));
    }
    Ok(())
}
