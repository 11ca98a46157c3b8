//! # Price Data Utilities
//!
//! $$
//! r_t = \frac{P_t}{P_{t-1}} - 1
//! $$
//!
//! Helpers for turning per-asset price histories into the rectangular
//! returns matrix the optimizer consumes.

use anyhow::Result;
use anyhow::bail;
use ndarray::Array2;

/// Convert a price series into simple periodic returns.
pub fn pct_change_series(prices: &[f64]) -> Vec<f64> {
  let mut out = Vec::with_capacity(prices.len().saturating_sub(1));
  for i in 1..prices.len() {
    out.push(prices[i] / prices[i - 1] - 1.0);
  }
  out
}

/// Trim per-asset series to their common tail so every asset covers the
/// same periods.
pub fn align_to_common_tail(series: &[Vec<f64>]) -> Vec<Vec<f64>> {
  let len = series.iter().map(Vec::len).min().unwrap_or(0);
  series
    .iter()
    .map(|s| s[s.len() - len..].to_vec())
    .collect()
}

/// Stack per-asset return series into a periods x assets matrix.
///
/// Series must share a common length; align ragged histories with
/// [`align_to_common_tail`] first.
pub fn returns_matrix(series: &[Vec<f64>]) -> Result<Array2<f64>> {
  let n_assets = series.len();
  let n_periods = series.first().map(Vec::len).unwrap_or(0);

  if series.iter().any(|s| s.len() != n_periods) {
    bail!("return series differ in length; align them to a common tail first");
  }

  let mut out = Array2::zeros((n_periods, n_assets));
  for (asset, s) in series.iter().enumerate() {
    for (period, &r) in s.iter().enumerate() {
      out[(period, asset)] = r;
    }
  }

  Ok(out)
}

/// Build a returns matrix directly from per-asset price columns.
pub fn returns_matrix_from_prices(prices: &[Vec<f64>]) -> Result<Array2<f64>> {
  let returns: Vec<Vec<f64>> = prices.iter().map(|p| pct_change_series(p)).collect();
  returns_matrix(&align_to_common_tail(&returns))
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  #[test]
  fn pct_change_differences_prices() {
    let r = pct_change_series(&[100.0, 110.0, 99.0]);

    assert_eq!(r.len(), 2);
    assert_abs_diff_eq!(r[0], 0.1, epsilon = 1e-12);
    assert_abs_diff_eq!(r[1], -0.1, epsilon = 1e-12);
  }

  #[test]
  fn align_trims_to_shortest_tail() {
    let aligned = align_to_common_tail(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0]]);

    assert_eq!(aligned[0], vec![2.0, 3.0]);
    assert_eq!(aligned[1], vec![4.0, 5.0]);
  }

  #[test]
  fn returns_matrix_rejects_ragged_series() {
    let result = returns_matrix(&[vec![0.01, 0.02], vec![0.03]]);
    assert!(result.is_err());
  }

  #[test]
  fn returns_matrix_from_prices_aligns_columns() {
    let prices = vec![
      vec![100.0, 101.0, 102.0, 103.0],
      vec![50.0, 51.0, 52.0, 53.0, 54.0],
    ];

    let matrix = returns_matrix_from_prices(&prices).unwrap();
    assert_eq!(matrix.nrows(), 3);
    assert_eq!(matrix.ncols(), 2);
  }
}
