//! # Omega
//!
//! $$
//! \Omega(r^\*)=\frac{\mathbb E[(R_p-r^\*)^+]}{\mathbb E[(r^\*-R_p)^+]}
//! $$
//!
//! Omega-ratio portfolio optimization and descriptive risk metrics.

pub mod data;
pub mod metrics;
pub mod optimizer;
pub mod types;

pub use data::align_to_common_tail;
pub use data::pct_change_series;
pub use data::returns_matrix;
pub use data::returns_matrix_from_prices;
pub use metrics::daily_vol;
pub use metrics::max_drawdown;
pub use metrics::omega;
pub use metrics::rol_max_drawdown;
pub use metrics::sharpe;
pub use metrics::sortino;
pub use optimizer::DEGENERATE_OMEGA_COST;
pub use optimizer::omega_ratio;
pub use optimizer::optimize_omega;
pub use optimizer::optimize_omega_with;
pub use types::OmegaConfig;
pub use types::OmegaReport;
