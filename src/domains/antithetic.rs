//! Antithetic variates for `E[X]`, `X ~ Exp(λ)`.
//!
//! Each uniform `U` yields the negatively correlated pair
//!
//! ```text
//! X = −ln(1 − U)/λ
//! Y = −ln(U)/λ
//! ```
//!
//! and the estimator averages `(X + Y)/2` over all pairs. The estimate is
//! repeated for a ladder of sample sizes to show convergence towards `1/λ`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::exponential::Exponential;
use super::monte_carlo::{MonteCarloResult, RunningStats};
use crate::engine::rng::UniformSource;
use crate::error::{ensure_finite, SimError, SimResult};

/// Sample-size ladder used by default.
pub const DEFAULT_SAMPLE_SIZES: [usize; 4] = [100, 1_000, 10_000, 100_000];

/// Antithetic pair `(X, Y)` driven by the single uniform `u`.
#[must_use]
pub fn antithetic_pair(u: f64, dist: &Exponential) -> (f64, f64) {
    (dist.inverse_cdf(u), dist.tail_transform(u, 0.0))
}

/// One rung of the convergence ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergencePoint {
    /// Number of antithetic pairs.
    pub samples: usize,
    /// Mean of the pair averages.
    pub estimate: f64,
    /// Standard error of that mean.
    pub std_error: f64,
}

/// Antithetic estimator over a ladder of sample sizes.
#[derive(Debug, Clone)]
pub struct AntitheticEstimator {
    dist: Exponential,
    sample_sizes: Vec<usize>,
}

impl AntitheticEstimator {
    /// Create an estimator for `Exp(rate)`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] for a bad rate, an empty ladder,
    /// or a zero sample size.
    pub fn new(rate: f64, sample_sizes: &[usize]) -> SimResult<Self> {
        let dist = Exponential::new(rate)?;
        if sample_sizes.is_empty() {
            return Err(SimError::invalid("sample_sizes", "must not be empty"));
        }
        if sample_sizes.contains(&0) {
            return Err(SimError::invalid("sample_sizes", "every size must be >= 1"));
        }
        Ok(Self {
            dist,
            sample_sizes: sample_sizes.to_vec(),
        })
    }

    /// Distribution being estimated.
    #[must_use]
    pub const fn distribution(&self) -> &Exponential {
        &self.dist
    }

    /// Estimate `E[X]` from `n` antithetic pairs.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NonFiniteValue`] if the estimate is not finite.
    pub fn estimate<R: UniformSource + ?Sized>(
        &self,
        n: usize,
        rng: &mut R,
    ) -> SimResult<MonteCarloResult> {
        let stats: RunningStats = (0..n)
            .map(|_| {
                let (x, y) = antithetic_pair(rng.next_uniform(), &self.dist);
                (x + y) / 2.0
            })
            .collect();
        let estimate = ensure_finite(stats.mean(), "antithetic.estimate")?;
        Ok(MonteCarloResult::new(estimate, stats.std_error(), n))
    }

    /// Run every rung of the ladder, in order, from the same source.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::estimate`] errors.
    pub fn run<R: UniformSource + ?Sized>(&self, rng: &mut R) -> SimResult<Vec<ConvergencePoint>> {
        self.sample_sizes
            .iter()
            .map(|&n| {
                let result = self.estimate(n, rng)?;
                debug!(samples = n, estimate = result.estimate, "antithetic rung");
                Ok(ConvergencePoint {
                    samples: n,
                    estimate: result.estimate,
                    std_error: result.std_error,
                })
            })
            .collect()
    }
}
