//! # Omega Types
//!
//! $$
//! \mathbf{w}^\*=\arg\max_{\mathbf{w}} \Omega(R_{\mathbf{w}})
//! $$
//!
//! Shared configuration and result containers for the Omega optimizer.

/// Runtime configuration for `optimizer::optimize_omega_with`.
#[derive(Clone, Copy, Debug)]
pub struct OmegaConfig {
  /// Minimum acceptable periodic return separating gains from losses.
  pub threshold: f64,
  /// `(min_weight, max_weight)` applied identically to every asset.
  pub bounds: (f64, f64),
  /// Iteration cap for a single solver run.
  pub max_iters: u64,
  /// Simplex standard-deviation tolerance used as the convergence criterion.
  pub sd_tolerance: f64,
  /// Number of additional solves from perturbed starting points.
  pub restarts: usize,
  /// Seed for restart perturbations.
  pub seed: u64,
}

impl Default for OmegaConfig {
  fn default() -> Self {
    Self {
      threshold: 0.0,
      bounds: (0.0, 1.0),
      max_iters: 5000,
      sd_tolerance: 1e-8,
      restarts: 0,
      seed: 3,
    }
  }
}

/// Output of an Omega optimization run.
#[derive(Clone, Debug)]
pub struct OmegaReport {
  /// Final portfolio weights, one per asset column, summing to one.
  pub weights: Vec<f64>,
  /// Achieved Omega ratio; `f64::INFINITY` when the portfolio never falls
  /// below the threshold across the sample.
  pub omega: f64,
  /// Whether the solver met its tolerance before hitting the iteration cap.
  pub converged: bool,
  /// Iterations spent in the best solver run.
  pub iterations: u64,
}
