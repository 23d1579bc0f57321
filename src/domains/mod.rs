//! Monte Carlo estimators over the exponential distribution.
//!
//! - Exponential: the distribution and its inverse-CDF transforms
//! - Monte Carlo: shared result type, running statistics, variance studies
//! - Stratified: proportional stratified sampling of `E[X]`
//! - Antithetic, control, conditional: sibling estimators with the same
//!   draw → transform → average shape

pub mod antithetic;
pub mod conditional;
pub mod control;
pub mod exponential;
pub mod monte_carlo;
pub mod stratified;

pub use antithetic::{antithetic_pair, AntitheticEstimator, ConvergencePoint};
pub use conditional::{conditional_draw, ConditionalEstimator, ConditionalRun};
pub use control::{ControlMode, ControlRun, ControlVariateEstimator};
pub use exponential::Exponential;
pub use monte_carlo::{compare_variance, MonteCarloResult, RunningStats, VarianceComparison};
pub use stratified::{
    aggregate, StrataPlan, StratifiedEstimate, StratifiedEstimator, StratifiedRun, Stratum,
    StratumKind, StratumSummary,
};
