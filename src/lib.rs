//! # expvar
//!
//! Variance-reduced Monte Carlo estimators for the exponential distribution.
//!
//! Four estimators share one shape (draw uniforms, apply a closed-form
//! inverse-CDF transform, aggregate by means):
//! - Antithetic variates: `E[X]` over a ladder of sample sizes
//! - Control variates: `E[X]` adjusted by a control with known mean
//! - Stratified sampling: `E[X]` as a probability-weighted sum of strata means
//! - Conditional sampling: `P(XY ≤ t)` with `Y | X ~ Exp(1/X)`
//!
//! ## Example
//!
//! ```rust
//! use expvar::prelude::*;
//!
//! let estimator = StratifiedEstimator::new(10_000, 1.0, &DEFAULT_BOUNDARIES)?;
//! let run = estimator.run(&mut SimRng::new(42))?;
//! assert!((run.estimate.result.estimate - 1.0).abs() < 0.05);
//! # Ok::<(), expvar::SimError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,
    clippy::imprecise_flops,
    clippy::missing_const_for_fn,
    clippy::float_cmp,
)]
#![cfg_attr(
    test,
    allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)
)]

pub mod cli;
pub mod config;
pub mod domains;
pub mod engine;
pub mod error;
pub mod visualization;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{ExperimentConfig, ExperimentConfigBuilder};
    pub use crate::domains::antithetic::{AntitheticEstimator, DEFAULT_SAMPLE_SIZES};
    pub use crate::domains::conditional::{ConditionalEstimator, DEFAULT_THRESHOLD};
    pub use crate::domains::control::{ControlMode, ControlVariateEstimator};
    pub use crate::domains::exponential::Exponential;
    pub use crate::domains::monte_carlo::{MonteCarloResult, RunningStats};
    pub use crate::domains::stratified::{StrataPlan, StratifiedEstimator, DEFAULT_BOUNDARIES};
    pub use crate::engine::rng::{SimRng, UniformSource};
    pub use crate::error::{SimError, SimResult};
}

/// Re-export for public API
pub use error::{SimError, SimResult};
