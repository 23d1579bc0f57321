//! Serializable summary of a CLI run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domains::antithetic::ConvergencePoint;
use crate::domains::conditional::ConditionalRun;
use crate::domains::control::{ControlMode, ControlRun};
use crate::domains::monte_carlo::MonteCarloResult;
use crate::domains::stratified::{StratifiedRun, StratumSummary};

/// Everything a run printed, without the raw samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Crate version that produced the report.
    pub version: String,
    /// Master seed.
    pub seed: u64,
    /// Rate `λ` of the target distribution.
    pub rate: f64,
    /// Antithetic convergence ladder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub antithetic: Option<AntitheticReport>,
    /// Control-variate estimate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control: Option<ControlReport>,
    /// Stratified estimate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stratified: Option<StratifiedReport>,
    /// Conditional probability estimate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional: Option<ConditionalReport>,
    /// Chart files written, in run order.
    pub charts: Vec<PathBuf>,
}

impl RunReport {
    /// Empty report for `seed` and `rate`.
    #[must_use]
    pub fn new(seed: u64, rate: f64) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            seed,
            rate,
            antithetic: None,
            control: None,
            stratified: None,
            conditional: None,
            charts: Vec::new(),
        }
    }
}

/// Antithetic section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntitheticReport {
    /// Theoretical `E[X]`.
    pub true_mean: f64,
    /// One point per ladder rung.
    pub points: Vec<ConvergencePoint>,
}

/// Control-variate section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlReport {
    /// Adjustment mode.
    pub mode: ControlMode,
    /// Theoretical `E[X]`.
    pub true_mean: f64,
    /// Known mean of the control.
    pub control_mean: f64,
    /// Fitted or fixed coefficient.
    pub coefficient: f64,
    /// Adjusted estimate.
    pub result: MonteCarloResult,
}

impl From<&ControlRun> for ControlReport {
    fn from(run: &ControlRun) -> Self {
        Self {
            mode: run.mode,
            true_mean: run.true_mean,
            control_mean: run.control_mean,
            coefficient: run.coefficient,
            result: run.result.clone(),
        }
    }
}

/// Stratified section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratifiedReport {
    /// Theoretical `E[X]`.
    pub true_mean: f64,
    /// Weighted estimate.
    pub result: MonteCarloResult,
    /// Per-stratum detail.
    pub strata: Vec<StratumSummary>,
}

impl StratifiedReport {
    /// Summarize `run` for a distribution with mean `true_mean`.
    #[must_use]
    pub fn new(run: &StratifiedRun, true_mean: f64) -> Self {
        Self {
            true_mean,
            result: run.estimate.result.clone(),
            strata: run.estimate.strata.clone(),
        }
    }
}

/// Conditional section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalReport {
    /// Threshold `t`.
    pub threshold: f64,
    /// Estimate of `P(XY ≤ t)`.
    pub result: MonteCarloResult,
}

impl From<&ConditionalRun> for ConditionalReport {
    fn from(run: &ConditionalRun) -> Self {
        Self {
            threshold: run.threshold,
            result: run.result.clone(),
        }
    }
}
