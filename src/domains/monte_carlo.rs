//! Shared Monte Carlo bookkeeping.
//!
//! Every estimator reports a [`MonteCarloResult`]. [`RunningStats`]
//! accumulates mean and variance in a single pass (Welford), and
//! [`compare_variance`] replicates two estimators on independent RNG
//! partitions to measure how much variance a technique removes.
//!
//! # Convergence
//!
//! By the Central Limit Theorem, Monte Carlo estimators converge at
//! O(n^{-1/2}); variance reduction shrinks the constant, not the rate.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::rng::SimRng;
use crate::error::{SimError, SimResult};

/// Result of a Monte Carlo estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    /// Point estimate.
    pub estimate: f64,
    /// Standard error of the estimate.
    pub std_error: f64,
    /// Number of samples used.
    pub samples: usize,
    /// 95% confidence interval (estimate ± 1.96 * `std_error`).
    pub confidence_interval: (f64, f64),
}

impl MonteCarloResult {
    /// Create a new Monte Carlo result.
    #[must_use]
    pub fn new(estimate: f64, std_error: f64, samples: usize) -> Self {
        let ci_half = 1.96 * std_error;
        Self {
            estimate,
            std_error,
            samples,
            confidence_interval: (estimate - ci_half, estimate + ci_half),
        }
    }

    /// Summarize independent observations by their sample mean.
    #[must_use]
    pub fn from_observations(values: &[f64]) -> Self {
        let stats: RunningStats = values.iter().copied().collect();
        Self::new(stats.mean(), stats.std_error(), stats.count())
    }

    /// Check if value is within confidence interval.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.confidence_interval.0 && value <= self.confidence_interval.1
    }

    /// Get relative error.
    #[must_use]
    pub fn relative_error(&self) -> f64 {
        if self.estimate.abs() < f64::EPSILON {
            self.std_error
        } else {
            self.std_error / self.estimate.abs()
        }
    }
}

/// Single-pass mean/variance accumulator (Welford's algorithm).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningStats {
    count: usize,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    /// Empty accumulator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
        }
    }

    /// Add an observation.
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    /// Number of observations.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Sample mean; `0.0` when empty.
    #[must_use]
    pub const fn mean(&self) -> f64 {
        self.mean
    }

    /// Unbiased sample variance; `0.0` with fewer than two observations.
    #[must_use]
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard error of the mean; `0.0` with fewer than two observations.
    #[must_use]
    pub fn std_error(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            (self.variance() / self.count as f64).sqrt()
        }
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = Self::new();
        for v in iter {
            stats.push(v);
        }
        stats
    }
}

/// Mean of a slice; `0.0` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Across-run variance of a baseline estimator versus a variance-reduced one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceComparison {
    /// Number of independent replications of each estimator.
    pub replications: usize,
    /// Mean of the baseline estimates.
    pub baseline_mean: f64,
    /// Variance of the baseline estimates across replications.
    pub baseline_variance: f64,
    /// Mean of the reduced estimates.
    pub reduced_mean: f64,
    /// Variance of the reduced estimates across replications.
    pub reduced_variance: f64,
}

impl VarianceComparison {
    /// Variance reduction factor `baseline / reduced` (∞ for a zero-variance
    /// reduced estimator).
    #[must_use]
    pub fn reduction_factor(&self) -> f64 {
        if self.reduced_variance <= 0.0 {
            f64::INFINITY
        } else {
            self.baseline_variance / self.reduced_variance
        }
    }

    /// Whether the reduced estimator actually had lower variance.
    #[must_use]
    pub fn is_reduced(&self) -> bool {
        self.reduced_variance < self.baseline_variance
    }
}

/// Replicate two estimators and compare their across-run variance.
///
/// Each replication of each estimator runs on its own partitioned stream of
/// `rng`, so the two estimators never share uniforms.
///
/// # Errors
///
/// Returns [`SimError::InvalidParameter`] for fewer than two replications,
/// and propagates any error from either estimator.
pub fn compare_variance<B, R>(
    replications: usize,
    rng: &mut SimRng,
    mut baseline: B,
    mut reduced: R,
) -> SimResult<VarianceComparison>
where
    B: FnMut(&mut SimRng) -> SimResult<f64>,
    R: FnMut(&mut SimRng) -> SimResult<f64>,
{
    if replications < 2 {
        return Err(SimError::invalid(
            "replications",
            format!("need at least 2 to estimate a variance, got {replications}"),
        ));
    }

    let mut base_stats = RunningStats::new();
    for mut stream in rng.partition(replications) {
        base_stats.push(baseline(&mut stream)?);
    }

    let mut reduced_stats = RunningStats::new();
    for mut stream in rng.partition(replications) {
        reduced_stats.push(reduced(&mut stream)?);
    }

    let comparison = VarianceComparison {
        replications,
        baseline_mean: base_stats.mean(),
        baseline_variance: base_stats.variance(),
        reduced_mean: reduced_stats.mean(),
        reduced_variance: reduced_stats.variance(),
    };
    debug!(
        replications,
        baseline_variance = comparison.baseline_variance,
        reduced_variance = comparison.reduced_variance,
        "variance comparison finished"
    );
    Ok(comparison)
}
