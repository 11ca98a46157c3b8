//! # Omega Optimizer
//!
//! $$
//! \mathbf{w}^\*=\arg\max_{\mathbf{w}\in[l,u]^M,\ \sum_i w_i=1}
//! \frac{\mathbb E[(R_{\mathbf{w}}-r^\*)^+]}{\mathbb E[(r^\*-R_{\mathbf{w}})^+]}
//! $$
//!
//! Long-only Omega-ratio maximization with per-asset box bounds. The
//! sum-to-one and non-negativity constraints are enforced structurally by a
//! softmax reparameterization; tighter caller bounds enter the cost as a
//! quadratic penalty.

use anyhow::Result;
use anyhow::bail;
use argmin::core::CostFunction;
use argmin::core::Executor;
use argmin::core::TerminationReason;
use argmin::core::TerminationStatus;
use argmin::solver::neldermead::NelderMead;
use ndarray::Array2;
use ndarray::ArrayView1;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;
use tracing::warn;

use crate::types::OmegaConfig;
use crate::types::OmegaReport;

/// Cost returned when the portfolio never falls below the threshold.
///
/// Kept finite so simplex reflection arithmetic stays well defined; the
/// public [`OmegaReport`] maps this case to `f64::INFINITY`.
pub const DEGENERATE_OMEGA_COST: f64 = -1000.0;

/// Penalty scale for weights leaving the caller's box. Must make even the
/// degenerate-omega reward unprofitable for violations beyond solver
/// tolerance.
const BOUND_PENALTY: f64 = 1e8;

fn softmax(x: &[f64]) -> Vec<f64> {
  if x.is_empty() {
    return Vec::new();
  }

  let max_x = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
  let exps: Vec<f64> = x.iter().map(|&v| (v - max_x).exp()).collect();
  let sum: f64 = exps.iter().sum();

  if sum < 1e-15 {
    vec![1.0 / x.len() as f64; x.len()]
  } else {
    exps.iter().map(|&e| e / sum).collect()
  }
}

/// Mean positive and mean negative excess of the weighted portfolio over
/// the threshold.
fn excess_moments(weights: &[f64], returns: &Array2<f64>, threshold: f64) -> (f64, f64) {
  let w = ArrayView1::from(weights);
  let portfolio_returns = returns.dot(&w);

  let mut positive_sum = 0.0;
  let mut negative_sum = 0.0;
  for &r in portfolio_returns.iter() {
    let excess = r - threshold;
    if excess > 0.0 {
      positive_sum += excess;
    } else {
      negative_sum -= excess;
    }
  }

  let n = returns.nrows() as f64;
  (positive_sum / n, negative_sum / n)
}

/// Negated Omega ratio of the weighted portfolio return series.
///
/// `returns` is periods x assets; `weights` must carry one entry per asset
/// column. Returns [`DEGENERATE_OMEGA_COST`] when no period ends below the
/// threshold and `NaN` for an empty sample.
pub fn omega_ratio(weights: &[f64], returns: &Array2<f64>, threshold: f64) -> f64 {
  if returns.nrows() == 0 {
    return f64::NAN;
  }

  let (expected_positive, expected_negative) = excess_moments(weights, returns, threshold);
  if expected_negative == 0.0 {
    return DEGENERATE_OMEGA_COST;
  }

  -(expected_positive / expected_negative)
}

#[derive(Clone)]
struct OmegaCost {
  returns: Array2<f64>,
  threshold: f64,
  bound_lo: f64,
  bound_hi: f64,
}

impl CostFunction for OmegaCost {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
    let w = softmax(x);

    let mut bound_err = 0.0;
    for &wi in &w {
      let under = (self.bound_lo - wi).max(0.0);
      let over = (wi - self.bound_hi).max(0.0);
      bound_err += under * under + over * over;
    }

    Ok(omega_ratio(&w, &self.returns, self.threshold) + BOUND_PENALTY * bound_err)
  }
}

struct SolveOutcome {
  param: Vec<f64>,
  cost: f64,
  converged: bool,
  iterations: u64,
}

fn run_solver(cost: &OmegaCost, x0: Vec<f64>, config: &OmegaConfig) -> Result<SolveOutcome> {
  let n = x0.len();
  let mut simplex = Vec::with_capacity(n + 1);
  simplex.push(x0.clone());
  for i in 0..n {
    let mut point = x0.clone();
    point[i] += 1.0;
    simplex.push(point);
  }

  let solver = match NelderMead::new(simplex).with_sd_tolerance(config.sd_tolerance) {
    Ok(solver) => solver,
    Err(err) => bail!("failed to configure simplex solver: {err}"),
  };

  match Executor::new(cost.clone(), solver)
    .configure(|state| state.max_iters(config.max_iters))
    .run()
  {
    Ok(res) => {
      let converged = matches!(
        &res.state.termination_status,
        TerminationStatus::Terminated(TerminationReason::SolverConverged)
      );
      let best_cost = res.state.best_cost;
      let iterations = res.state.iter;
      let param = res.state.best_param.unwrap_or(x0);

      Ok(SolveOutcome {
        param,
        cost: best_cost,
        converged,
        iterations,
      })
    }
    Err(err) => bail!("omega optimization failed: {err}"),
  }
}

/// Maximize the Omega ratio subject to `sum(w) = 1` and per-asset bounds.
///
/// Starts from the equal-weight portfolio and runs with default solver
/// settings; see [`optimize_omega_with`] for the full configuration surface.
pub fn optimize_omega(
  returns: &Array2<f64>,
  threshold: f64,
  bounds: (f64, f64),
) -> Result<OmegaReport> {
  optimize_omega_with(
    returns,
    &OmegaConfig {
      threshold,
      bounds,
      ..OmegaConfig::default()
    },
  )
}

/// Maximize the Omega ratio under an explicit [`OmegaConfig`].
///
/// Validates the returns matrix and bounds up front, then minimizes the
/// negated Omega objective over softmax-reparameterized weights, optionally
/// repeating from perturbed starting points. Convergence status and the
/// iteration count of the best run are surfaced in the report.
pub fn optimize_omega_with(returns: &Array2<f64>, config: &OmegaConfig) -> Result<OmegaReport> {
  let n_assets = returns.ncols();
  let n_periods = returns.nrows();

  if n_assets == 0 || n_periods == 0 {
    bail!("returns matrix must have at least one period and one asset");
  }
  if returns.iter().any(|r| !r.is_finite()) {
    bail!("returns matrix contains non-finite entries");
  }

  let (lo, hi) = config.bounds;
  if !lo.is_finite() || !hi.is_finite() || lo > hi {
    bail!("invalid weight bounds ({lo}, {hi})");
  }
  let n = n_assets as f64;
  if lo * n > 1.0 + 1e-12 || hi * n < 1.0 - 1e-12 {
    bail!("weight bounds ({lo}, {hi}) admit no fully invested portfolio of {n_assets} assets");
  }

  let cost = OmegaCost {
    returns: returns.clone(),
    threshold: config.threshold,
    bound_lo: lo,
    bound_hi: hi,
  };

  // The zero parameter vector maps to the equal-weight portfolio.
  let mut best = run_solver(&cost, vec![0.0; n_assets], config)?;

  if config.restarts > 0 {
    let mut rng = StdRng::seed_from_u64(config.seed);
    for _ in 0..config.restarts {
      let x0: Vec<f64> = (0..n_assets).map(|_| rng.gen_range(-1.0..1.0)).collect();
      match run_solver(&cost, x0, config) {
        Ok(outcome) if outcome.cost < best.cost => best = outcome,
        Ok(_) => {}
        Err(err) => warn!("omega restart failed: {err}"),
      }
    }
  }

  let weights = softmax(&best.param);
  let (expected_positive, expected_negative) =
    excess_moments(&weights, returns, config.threshold);
  let omega = if expected_negative == 0.0 {
    f64::INFINITY
  } else {
    expected_positive / expected_negative
  };

  if !best.converged {
    warn!(
      iterations = best.iterations,
      "omega optimization stopped before convergence"
    );
  }
  debug!(
    omega,
    iterations = best.iterations,
    "omega optimization finished"
  );

  Ok(OmegaReport {
    weights,
    omega,
    converged: best.converged,
    iterations: best.iterations,
  })
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;

  use super::*;

  #[test]
  fn omega_ratio_hits_sentinel_when_never_below_threshold() {
    let returns = array![[0.01, 0.02], [0.03, 0.01], [0.02, 0.04]];
    let cost = omega_ratio(&[0.5, 0.5], &returns, 0.0);

    assert_eq!(cost, DEGENERATE_OMEGA_COST);
  }

  #[test]
  fn omega_ratio_matches_exact_two_period_ratio() {
    let returns = array![[0.02], [-0.01]];
    let cost = omega_ratio(&[1.0], &returns, 0.0);

    assert_abs_diff_eq!(cost, -2.0, epsilon = 1e-12);
  }

  #[test]
  fn omega_ratio_applies_threshold_shift() {
    let returns = array![[0.02], [-0.01]];
    let cost = omega_ratio(&[1.0], &returns, 0.01);

    assert_abs_diff_eq!(cost, -0.5, epsilon = 1e-12);
  }

  #[test]
  fn optimize_omega_two_asset_mixed_returns_sums_to_one() {
    let returns = array![[0.01, -0.02], [-0.01, 0.03], [0.02, -0.01]];
    let report = optimize_omega(&returns, 0.0, (0.0, 1.0)).unwrap();

    assert_eq!(report.weights.len(), 2);

    let sum_w: f64 = report.weights.iter().sum();
    assert_abs_diff_eq!(sum_w, 1.0, epsilon = 1e-6);
    for &w in &report.weights {
      assert!((-1e-9..=1.0 + 1e-9).contains(&w));
    }

    // A blend near 70/30 never loses on this sample, so the optimum is a
    // loss-free portfolio.
    assert!(report.omega.is_infinite());
  }

  #[test]
  fn optimize_omega_equal_weights_identical_assets() {
    let returns = array![
      [0.01, 0.01],
      [-0.02, -0.02],
      [0.015, 0.015],
      [-0.005, -0.005]
    ];
    let report = optimize_omega(&returns, 0.0, (0.0, 1.0)).unwrap();

    assert_abs_diff_eq!(report.weights[0], 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(report.weights[1], 0.5, epsilon = 1e-6);
  }

  #[test]
  fn optimize_omega_respects_max_weight_cap() {
    let returns = array![
      [0.01, -0.05],
      [0.02, 0.04],
      [0.015, -0.03],
      [0.01, 0.02]
    ];
    let report = optimize_omega(&returns, 0.0, (0.0, 0.6)).unwrap();

    let sum_w: f64 = report.weights.iter().sum();
    assert_abs_diff_eq!(sum_w, 1.0, epsilon = 1e-6);
    assert!(report.weights[0] <= 0.6 + 1e-6);
    assert!(report.weights[0] >= 0.5);
  }

  #[test]
  fn optimize_omega_reports_truncation_as_not_converged() {
    let returns = array![[0.01, -0.05], [0.02, 0.04], [0.015, -0.03]];
    let config = OmegaConfig {
      max_iters: 1,
      ..OmegaConfig::default()
    };
    let report = optimize_omega_with(&returns, &config).unwrap();

    assert!(!report.converged);
    assert_eq!(report.iterations, 1);
  }

  #[test]
  fn optimize_omega_with_restarts_is_deterministic() {
    let returns = array![[0.01, -0.02], [-0.01, 0.03], [0.02, -0.01]];
    let config = OmegaConfig {
      restarts: 3,
      ..OmegaConfig::default()
    };

    let a = optimize_omega_with(&returns, &config).unwrap();
    let b = optimize_omega_with(&returns, &config).unwrap();

    assert_eq!(a.weights, b.weights);
  }

  #[test]
  fn optimize_omega_rejects_empty_matrix() {
    let returns = Array2::<f64>::zeros((0, 0));
    assert!(optimize_omega(&returns, 0.0, (0.0, 1.0)).is_err());
  }

  #[test]
  fn optimize_omega_rejects_non_finite_returns() {
    let returns = array![[0.01, f64::NAN], [0.02, 0.01]];
    assert!(optimize_omega(&returns, 0.0, (0.0, 1.0)).is_err());
  }

  #[test]
  fn optimize_omega_rejects_inverted_bounds() {
    let returns = array![[0.01, -0.02], [-0.01, 0.03]];
    assert!(optimize_omega(&returns, 0.0, (0.8, 0.2)).is_err());
  }

  #[test]
  fn optimize_omega_rejects_infeasible_bounds() {
    let returns = array![[0.01, -0.02, 0.01], [-0.01, 0.03, 0.02]];
    assert!(optimize_omega(&returns, 0.0, (0.0, 0.2)).is_err());
  }
}
