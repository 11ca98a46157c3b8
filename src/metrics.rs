//! # Risk Metrics
//!
//! $$
//! S = \frac{\bar r}{\sigma_r}\sqrt{365}
//! $$
//!
//! Descriptive risk/return statistics over a single asset price series.
//! Every function differences the prices internally and propagates
//! degenerate samples as non-finite values instead of faulting.

use crate::data::pct_change_series;

const PERIODS_PER_YEAR: f64 = 365.0;

fn sample_mean(xs: &[f64]) -> f64 {
  if xs.is_empty() {
    f64::NAN
  } else {
    xs.iter().sum::<f64>() / xs.len() as f64
  }
}

fn sample_std(xs: &[f64]) -> f64 {
  if xs.len() < 2 {
    return f64::NAN;
  }

  let mean = sample_mean(xs);
  let mut acc = 0.0;
  for &x in xs {
    let d = x - mean;
    acc += d * d;
  }
  (acc / (xs.len() - 1) as f64).sqrt()
}

/// Annualized Sharpe ratio of a price series.
///
/// A zero-variance series yields `NaN` rather than a fault.
pub fn sharpe(prices: &[f64]) -> f64 {
  let r = pct_change_series(prices);
  sample_mean(&r) / sample_std(&r) * PERIODS_PER_YEAR.sqrt()
}

/// Annualized Sortino ratio, downside deviation in the denominator.
///
/// Fewer than two losing periods leave the downside deviation undefined
/// and the result is `NaN`.
pub fn sortino(prices: &[f64]) -> f64 {
  let r = pct_change_series(prices);
  let downside: Vec<f64> = r.iter().filter(|&&x| x < 0.0).map(|&x| -x).collect();
  sample_mean(&r) / sample_std(&downside) * PERIODS_PER_YEAR.sqrt()
}

/// Simple Omega ratio at a zero threshold, summed gains over summed losses.
///
/// Non-finite when the series has no losing periods.
pub fn omega(prices: &[f64]) -> f64 {
  let r = pct_change_series(prices);
  let gains: f64 = r.iter().filter(|&&x| x > 0.0).sum();
  let losses: f64 = r.iter().filter(|&&x| x < 0.0).map(|&x| -x).sum();
  gains / losses
}

/// Rolling drawdown of compounded returns relative to the running peak.
///
/// The peak is seeded at the pre-first-return baseline of 1.0, so a series
/// that drops immediately reports that drop. Output has length `n - 1`.
pub fn rol_max_drawdown(prices: &[f64]) -> Vec<f64> {
  let r = pct_change_series(prices);
  let mut cum = 1.0;
  let mut peak = 1.0;
  let mut out = Vec::with_capacity(r.len());

  for &ret in &r {
    cum *= 1.0 + ret;
    if cum > peak {
      peak = cum;
    }
    out.push(cum / peak - 1.0);
  }

  out
}

/// Deepest drawdown of a price series; zero when it never falls from a peak.
pub fn max_drawdown(prices: &[f64]) -> f64 {
  rol_max_drawdown(prices).into_iter().fold(0.0, f64::min)
}

/// Standard deviation of periodic returns.
pub fn daily_vol(prices: &[f64]) -> f64 {
  sample_std(&pct_change_series(prices))
}
