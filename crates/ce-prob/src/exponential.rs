//! Exponential distribution utilities.
//!
//! The sampling family is parameterized by its mean.

use rand::Rng;
use rand_distr::{Distribution, Exp1};

/// `log f(x; mean_nom) - log f(x; mean_ref)` for mean-parameterized Exponentials.
///
/// `= ln(mean_ref / mean_nom) - x * (1/mean_nom - 1/mean_ref)`
#[inline]
pub fn log_density_ratio(x: f64, mean_nom: f64, mean_ref: f64) -> f64 {
    (mean_ref / mean_nom).ln() - x * (1.0 / mean_nom - 1.0 / mean_ref)
}

/// Fill `out` with draws from the Exponential distribution with mean `mean`.
pub fn sample_into<R: Rng + ?Sized>(rng: &mut R, mean: f64, out: &mut [f64]) {
    for v in out.iter_mut() {
        let e: f64 = Exp1.sample(rng);
        *v = mean * e;
    }
}
