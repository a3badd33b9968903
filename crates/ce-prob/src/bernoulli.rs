//! Bernoulli distribution utilities.
//!
//! Draws are stored as `0.0` / `1.0` so that they fit in a real-valued sample matrix.

use rand::Rng;

/// `log P(x; p_nom) - log P(x; p_ref)` for an outcome stored as a real (`x > 0.5` is a success).
#[inline]
pub fn log_density_ratio(x: f64, p_nom: f64, p_ref: f64) -> f64 {
    if x > 0.5 { (p_nom / p_ref).ln() } else { ((1.0 - p_nom) / (1.0 - p_ref)).ln() }
}

/// Fill `out` with Bernoulli(`p`) draws encoded as `0.0` / `1.0`.
pub fn sample_into<R: Rng + ?Sized>(rng: &mut R, p: f64, out: &mut [f64]) {
    for v in out.iter_mut() {
        let u: f64 = rng.random();
        *v = if u < p { 1.0 } else { 0.0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use statrs::distribution::{Bernoulli, Discrete};

    #[test]
    fn test_log_density_ratio_matches_statrs() {
        let nominal = Bernoulli::new(0.1).unwrap();
        let reference = Bernoulli::new(0.4).unwrap();
        for k in [0u64, 1] {
            let direct = nominal.ln_pmf(k) - reference.ln_pmf(k);
            let ratio = log_density_ratio(k as f64, 0.1, 0.4);
            assert_relative_eq!(ratio, direct, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_pinned_coordinate_ratio() {
        // A coordinate pinned at p = 1 under both parameters contributes nothing.
        assert_eq!(log_density_ratio(1.0, 1.0, 1.0), 0.0);
        assert!(log_density_ratio(1.0, 0.5, 0.0).is_infinite());
    }

    #[test]
    fn test_degenerate_draws() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut out = vec![0.5; 100];
        sample_into(&mut rng, 0.0, &mut out);
        assert!(out.iter().all(|&v| v == 0.0));
        sample_into(&mut rng, 1.0, &mut out);
        assert!(out.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_sample_frequency() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut out = vec![0.0; 100_000];
        sample_into(&mut rng, 0.3, &mut out);
        let freq = out.iter().sum::<f64>() / out.len() as f64;
        assert!((freq - 0.3).abs() < 0.01, "freq={}", freq);
    }
}
