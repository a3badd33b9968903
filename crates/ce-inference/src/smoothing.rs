//! Parameter smoothing.
//!
//! A smoothed parameter is the convex combination `c·new + (1−c)·previous`, entry by
//! entry. The first iteration is never smoothed because it has no predecessor.

use ce_core::{Error, Parameter, ParameterHistory, Result};
use serde::{Deserialize, Serialize};

/// Smoothing rule selected by a context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Smoothing {
    /// Keep the freshly estimated parameter.
    #[default]
    None,
    /// Blend every entry with a fixed coefficient.
    Constant {
        /// Weight `α ∈ (0, 1]` of the new parameter.
        coefficient: f64,
    },
    /// Fixed coefficient for row 0 (location) and a time-varying one for the other rows
    /// (dispersion).
    Dynamic {
        /// Weight `α ∈ (0, 1]` of the new location row.
        location_coefficient: f64,
        /// Base `β ∈ (0, 1]` of the dispersion coefficient.
        dispersion_coefficient: f64,
        /// Exponent `q > 0` of the dispersion coefficient.
        dispersion_exponent: f64,
    },
}

fn check_coefficient(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 || value > 1.0 {
        return Err(Error::Validation(format!("{} must be in (0, 1], got {}", name, value)));
    }
    Ok(())
}

/// Dispersion weight at iteration `t`: `β·(1 − (1 − 1/t)^q)`.
pub fn dynamic_coefficient(base: f64, exponent: f64, iteration: usize) -> f64 {
    let t = iteration.max(1) as f64;
    base * (1.0 - (1.0 - 1.0 / t).powf(exponent))
}

/// `coefficient·new + (1 − coefficient)·previous` for one entry.
#[inline]
pub fn blend(new: f64, previous: f64, coefficient: f64) -> f64 {
    coefficient * new + (1.0 - coefficient) * previous
}

impl Smoothing {
    /// Check coefficient ranges.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Smoothing::None => Ok(()),
            Smoothing::Constant { coefficient } => {
                check_coefficient("smoothing coefficient", coefficient)
            }
            Smoothing::Dynamic {
                location_coefficient,
                dispersion_coefficient,
                dispersion_exponent,
            } => {
                check_coefficient("location smoothing coefficient", location_coefficient)?;
                check_coefficient("dispersion smoothing coefficient", dispersion_coefficient)?;
                if !dispersion_exponent.is_finite() || dispersion_exponent <= 0.0 {
                    return Err(Error::Validation(format!(
                        "dispersion smoothing exponent must be finite and > 0, got {}",
                        dispersion_exponent
                    )));
                }
                Ok(())
            }
        }
    }

    /// Blend coefficient for row `row` at iteration `iteration`.
    fn coefficient(&self, row: usize, iteration: usize) -> f64 {
        match *self {
            Smoothing::None => 1.0,
            Smoothing::Constant { coefficient } => coefficient,
            Smoothing::Dynamic {
                location_coefficient,
                dispersion_coefficient,
                dispersion_exponent,
            } => {
                if row == 0 {
                    location_coefficient
                } else {
                    dynamic_coefficient(dispersion_coefficient, dispersion_exponent, iteration)
                }
            }
        }
    }

    /// Smoothed version of `new` against `previous`.
    pub fn smooth(
        &self,
        iteration: usize,
        new: &Parameter,
        previous: &Parameter,
    ) -> Result<Parameter> {
        if new.shape() != previous.shape() {
            return Err(Error::Computation(format!(
                "cannot smooth parameters of different shapes {:?} and {:?}",
                new.shape(),
                previous.shape()
            )));
        }
        Ok(Parameter::from_fn(new.nrows(), new.ncols(), |i, j| {
            blend(new[(i, j)], previous[(i, j)], self.coefficient(i, iteration))
        }))
    }

    /// Replace the last history entry by its smoothed version.
    ///
    /// No-op before iteration 2 and for [`Smoothing::None`].
    pub fn apply(&self, iteration: usize, history: &mut ParameterHistory) -> Result<()> {
        if iteration < 2 || matches!(self, Smoothing::None) {
            return Ok(());
        }
        let Some(previous) = history.previous() else {
            return Ok(());
        };
        let smoothed = self.smooth(iteration, history.last(), previous)?;
        history.replace_last(smoothed);
        Ok(())
    }
}
