//! Normal distribution utilities.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// `log N(x; mu_nom, sigma_nom) - log N(x; mu_ref, sigma_ref)`.
///
/// The `ln(sqrt(2π))` terms cancel. No validation: invalid scales yield NaN, which the
/// caller is expected to propagate.
#[inline]
pub fn log_density_ratio(x: f64, mu_nom: f64, sigma_nom: f64, mu_ref: f64, sigma_ref: f64) -> f64 {
    let z_nom = (x - mu_nom) / sigma_nom;
    let z_ref = (x - mu_ref) / sigma_ref;
    -0.5 * (z_nom * z_nom - z_ref * z_ref) - (sigma_nom / sigma_ref).ln()
}

/// Fill `out` with draws from `N(mu, sigma)`.
pub fn sample_into<R: Rng + ?Sized>(rng: &mut R, mu: f64, sigma: f64, out: &mut [f64]) {
    for v in out.iter_mut() {
        let z: f64 = StandardNormal.sample(rng);
        *v = mu + sigma * z;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use statrs::distribution::{Continuous, Normal};

    #[test]
    fn test_log_density_ratio_matches_statrs() {
        let nominal = Normal::new(0.0, 1.0).unwrap();
        let reference = Normal::new(-4.1, 1.3).unwrap();
        for &x in &[-4.3, -1.0, 0.0, 0.7, 3.2] {
            let direct = nominal.ln_pdf(x) - reference.ln_pdf(x);
            let ratio = log_density_ratio(x, 0.0, 1.0, -4.1, 1.3);
            assert_relative_eq!(ratio, direct, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_log_density_ratio_identity() {
        assert_eq!(log_density_ratio(1.7, 0.5, 2.0, 0.5, 2.0), 0.0);
        assert!(log_density_ratio(1.0, 0.0, -1.0, 0.0, 1.0).is_nan());
    }

    #[test]
    fn test_sample_moments() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut out = vec![0.0; 200_000];
        sample_into(&mut rng, 3.0, 2.0, &mut out);
        let n = out.len() as f64;
        let mean = out.iter().sum::<f64>() / n;
        let var = out.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        assert!((mean - 3.0).abs() < 0.03, "mean={}", mean);
        assert!((var.sqrt() - 2.0).abs() < 0.03, "sd={}", var.sqrt());
    }

    #[test]
    fn test_nan_parameters_propagate() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut out = vec![0.0; 4];
        sample_into(&mut rng, f64::NAN, 1.0, &mut out);
        assert!(out.iter().all(|v| v.is_nan()));
    }
}
