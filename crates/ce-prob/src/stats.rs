//! Column reductions over sample matrices.
//!
//! Every statistic is computed per column (one value per state coordinate) with a
//! fixed left-to-right summation order, so results are bit-reproducible.

use ce_core::{Error, Result};
use nalgebra::DMatrix;

/// Smallest weight sum accepted by the weighted reductions.
pub const MIN_WEIGHT_SUM: f64 = f64::MIN_POSITIVE;

/// Sum of a slice.
pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Mean of each column. An empty matrix yields NaN entries.
pub fn column_means(values: &DMatrix<f64>) -> Vec<f64> {
    let n = values.nrows() as f64;
    values.column_iter().map(|c| c.iter().sum::<f64>() / n).collect()
}

/// Standard deviation of each column.
///
/// With `adjust_for_bias` the divisor is `n - 1` and at least two rows are required;
/// otherwise the divisor is `n`.
pub fn column_std_devs(values: &DMatrix<f64>, adjust_for_bias: bool) -> Result<Vec<f64>> {
    let n = values.nrows();
    if adjust_for_bias && n < 2 {
        return Err(Error::Computation(format!(
            "bias-adjusted standard deviation needs at least 2 rows, got {}",
            n
        )));
    }
    let means = column_means(values);
    let denom = if adjust_for_bias { (n - 1) as f64 } else { n as f64 };
    Ok(values
        .column_iter()
        .zip(means.iter())
        .map(|(c, &m)| (c.iter().map(|&x| (x - m) * (x - m)).sum::<f64>() / denom).sqrt())
        .collect())
}

fn check_weights(values: &DMatrix<f64>, weights: &[f64]) -> Result<f64> {
    if weights.len() != values.nrows() {
        return Err(Error::Validation(format!(
            "weights length {} does not match number of rows {}",
            weights.len(),
            values.nrows()
        )));
    }
    let w_sum = sum(weights);
    // NaN passes through so that pathological weights surface in the result.
    if w_sum.abs() < MIN_WEIGHT_SUM {
        return Err(Error::DegenerateWeights { sum: w_sum, n_elite: weights.len() });
    }
    Ok(w_sum)
}

/// Weighted mean of each column: `Σ w_i x_ij / Σ w_i`.
pub fn weighted_column_means(values: &DMatrix<f64>, weights: &[f64]) -> Result<Vec<f64>> {
    let w_sum = check_weights(values, weights)?;
    Ok(values
        .column_iter()
        .map(|c| c.iter().zip(weights).map(|(&x, &w)| w * x).sum::<f64>() / w_sum)
        .collect())
}

/// Weighted (biased) standard deviation of each column around `means`.
pub fn weighted_column_std_devs(
    values: &DMatrix<f64>,
    weights: &[f64],
    means: &[f64],
) -> Result<Vec<f64>> {
    let w_sum = check_weights(values, weights)?;
    if means.len() != values.ncols() {
        return Err(Error::Validation(format!(
            "means length {} does not match number of columns {}",
            means.len(),
            values.ncols()
        )));
    }
    Ok(values
        .column_iter()
        .zip(means.iter())
        .map(|(c, &m)| {
            let ss: f64 = c.iter().zip(weights).map(|(&x, &w)| w * (x - m) * (x - m)).sum();
            (ss / w_sum).sqrt()
        })
        .collect())
}
