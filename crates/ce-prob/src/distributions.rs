//! Sampling distribution adapters.
//!
//! A [`SamplingFamily`] describes a product distribution with one independent
//! coordinate per column of the sample. Its parameter is a matrix with one column per
//! coordinate:
//!
//! | family        | rows | row 0 | row 1   |
//! |---------------|------|-------|---------|
//! | `Exponential` | 1    | mean  |         |
//! | `Gaussian`    | 2    | mean  | std-dev |
//! | `Bernoulli`   | 1    | p     |         |

use ce_core::{Error, Parameter, Result, SampleChunk};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Named family of independent per-coordinate distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SamplingFamily {
    /// Exponential with the given mean.
    Exponential,
    /// Gaussian with the given mean and standard deviation.
    Gaussian,
    /// Bernoulli with the given success probability, draws encoded as 0/1.
    Bernoulli,
}

impl SamplingFamily {
    /// Family name for messages.
    pub fn name(self) -> &'static str {
        match self {
            SamplingFamily::Exponential => "Exponential",
            SamplingFamily::Gaussian => "Gaussian",
            SamplingFamily::Bernoulli => "Bernoulli",
        }
    }

    /// Number of parameter rows.
    pub fn n_parameter_rows(self) -> usize {
        match self {
            SamplingFamily::Gaussian => 2,
            SamplingFamily::Exponential | SamplingFamily::Bernoulli => 1,
        }
    }

    /// Check the shape and domain of a parameter for a state of dimension `dimension`.
    pub fn validate_parameter(self, parameter: &Parameter, dimension: usize) -> Result<()> {
        if dimension == 0 {
            return Err(Error::Validation("state_dimension must be > 0".into()));
        }
        let rows = self.n_parameter_rows();
        if parameter.nrows() != rows || parameter.ncols() != dimension {
            return Err(Error::Validation(format!(
                "{} parameter must be {}x{}, got {}x{}",
                self.name(),
                rows,
                dimension,
                parameter.nrows(),
                parameter.ncols()
            )));
        }
        for j in 0..dimension {
            match self {
                SamplingFamily::Exponential => {
                    let mean = parameter[(0, j)];
                    if !mean.is_finite() || mean <= 0.0 {
                        return Err(Error::Validation(format!(
                            "Exponential mean in column {} must be finite and > 0, got {}",
                            j, mean
                        )));
                    }
                }
                SamplingFamily::Gaussian => {
                    let (mu, sigma) = (parameter[(0, j)], parameter[(1, j)]);
                    if !mu.is_finite() {
                        return Err(Error::Validation(format!(
                            "Gaussian mean in column {} must be finite, got {}",
                            j, mu
                        )));
                    }
                    if !sigma.is_finite() || sigma <= 0.0 {
                        return Err(Error::Validation(format!(
                            "Gaussian std-dev in column {} must be finite and > 0, got {}",
                            j, sigma
                        )));
                    }
                }
                SamplingFamily::Bernoulli => {
                    let p = parameter[(0, j)];
                    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                        return Err(Error::Validation(format!(
                            "Bernoulli probability in column {} must be in [0,1], got {}",
                            j, p
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Draw column `j` of a sample into `out`, using column `j` of `parameter`.
    pub fn sample_column<R: Rng + ?Sized>(
        self,
        rng: &mut R,
        parameter: &Parameter,
        j: usize,
        out: &mut [f64],
    ) {
        match self {
            SamplingFamily::Exponential => {
                crate::exponential::sample_into(rng, parameter[(0, j)], out)
            }
            SamplingFamily::Gaussian => {
                crate::normal::sample_into(rng, parameter[(0, j)], parameter[(1, j)], out)
            }
            SamplingFamily::Bernoulli => crate::bernoulli::sample_into(rng, parameter[(0, j)], out),
        }
    }

    /// Fill every column of `chunk`, column by column.
    pub fn sample_chunk<R: Rng + ?Sized>(
        self,
        chunk: &mut SampleChunk,
        rng: &mut R,
        parameter: &Parameter,
    ) {
        for j in 0..chunk.dimension() {
            self.sample_column(rng, parameter, j, chunk.column_mut(j));
        }
    }

    /// `log f(state; nominal) - log f(state; reference)`, summed over coordinates.
    pub fn log_likelihood_ratio(
        self,
        state: &[f64],
        nominal: &Parameter,
        reference: &Parameter,
    ) -> f64 {
        state
            .iter()
            .enumerate()
            .map(|(j, &x)| match self {
                SamplingFamily::Exponential => {
                    crate::exponential::log_density_ratio(x, nominal[(0, j)], reference[(0, j)])
                }
                SamplingFamily::Gaussian => crate::normal::log_density_ratio(
                    x,
                    nominal[(0, j)],
                    nominal[(1, j)],
                    reference[(0, j)],
                    reference[(1, j)],
                ),
                SamplingFamily::Bernoulli => {
                    crate::bernoulli::log_density_ratio(x, nominal[(0, j)], reference[(0, j)])
                }
            })
            .sum()
    }

    /// Likelihood ratio `f(state; nominal) / f(state; reference)`.
    pub fn likelihood_ratio(
        self,
        state: &[f64],
        nominal: &Parameter,
        reference: &Parameter,
    ) -> f64 {
        self.log_likelihood_ratio(state, nominal, reference).exp()
    }
}
