//! Conditional-distribution probability estimate.
//!
//! `X ~ Exp(λ_X)` and, given `X = x`, `Y ~ Exp(1/x)`. The estimator returns
//! the fraction of pairs with `XY ≤ t`. Each `Y` is a pure function of its
//! own `X` and uniform, so pairs can be produced in any order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::exponential::Exponential;
use super::monte_carlo::MonteCarloResult;
use crate::engine::rng::UniformSource;
use crate::error::{SimError, SimResult};

/// Default threshold on the product `XY`.
pub const DEFAULT_THRESHOLD: f64 = 3.0;

/// Draw `Y ~ Exp(1/x)` from uniform `u`: `−ln(1 − u) · x`.
#[must_use]
pub fn conditional_draw(x: f64, u: f64) -> f64 {
    -(-u).ln_1p() * x
}

/// Output of a conditional run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalRun {
    /// Estimate of `P(XY ≤ threshold)` with binomial standard error.
    pub result: MonteCarloResult,
    /// Threshold used.
    pub threshold: f64,
    /// Products `X_i · Y_i`.
    pub products: Vec<f64>,
}

/// Estimator for `P(XY ≤ t)`.
#[derive(Debug, Clone)]
pub struct ConditionalEstimator {
    dist_x: Exponential,
    sample_count: usize,
    threshold: f64,
}

impl ConditionalEstimator {
    /// Create an estimator with `sample_count` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] for a bad rate, zero samples, or
    /// a non-finite threshold.
    pub fn new(sample_count: usize, rate_x: f64, threshold: f64) -> SimResult<Self> {
        let dist_x = Exponential::new(rate_x)?;
        if sample_count == 0 {
            return Err(SimError::invalid("sample_count", "must be >= 1"));
        }
        if !threshold.is_finite() {
            return Err(SimError::invalid(
                "threshold",
                format!("must be finite, got {threshold}"),
            ));
        }
        Ok(Self {
            dist_x,
            sample_count,
            threshold,
        })
    }

    /// Draw the `(X, Y)` pairs.
    pub fn sample_pairs<R: UniformSource + ?Sized>(&self, rng: &mut R) -> Vec<(f64, f64)> {
        let xs = self.dist_x.sample_n(self.sample_count, rng);
        xs.into_iter()
            .map(|x| (x, conditional_draw(x, rng.next_uniform())))
            .collect()
    }

    /// Estimate `P(XY ≤ threshold)`.
    pub fn run<R: UniformSource + ?Sized>(&self, rng: &mut R) -> ConditionalRun {
        let products: Vec<f64> = self
            .sample_pairs(rng)
            .into_iter()
            .map(|(x, y)| x * y)
            .collect();

        let hits = products.iter().filter(|&&p| p <= self.threshold).count();
        let n = products.len() as f64;
        let p = hits as f64 / n;
        let std_error = (p * (1.0 - p) / n).sqrt();

        debug!(hits, samples = products.len(), estimate = p, "conditional run finished");

        ConditionalRun {
            result: MonteCarloResult::new(p, std_error, products.len()),
            threshold: self.threshold,
            products,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rng::{SequenceSource, SimRng};

    /// `P(XY ≤ t) = E[1 − exp(−t/X²)]` for `λ_X = 1`, by midpoint rule.
    fn reference_probability(t: f64) -> f64 {
        let dx = 1e-4;
        (0..400_000)
            .map(|i| {
                let x = (f64::from(i) + 0.5) * dx;
                (-x).exp() * (1.0 - (-t / (x * x)).exp()) * dx
            })
            .sum()
    }

    #[test]
    fn test_conditional_draw_scales_with_x() {
        let y1 = conditional_draw(1.0, 0.5);
        let y2 = conditional_draw(4.0, 0.5);
        assert!((y1 - std::f64::consts::LN_2).abs() < 1e-15);
        assert!((y2 - 4.0 * y1).abs() < 1e-12);
        assert!(conditional_draw(2.0, 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_matches_numerical_integration() {
        let est = ConditionalEstimator::new(20_000, 1.0, DEFAULT_THRESHOLD).unwrap();
        let run = est.run(&mut SimRng::new(42));
        let expected = reference_probability(DEFAULT_THRESHOLD);

        assert!((run.result.estimate - expected).abs() < 0.02, "{} vs {expected}", run.result.estimate);
        assert_eq!(run.products.len(), 20_000);
        assert!(run.result.std_error > 0.0 && run.result.std_error < 0.01);
    }

    #[test]
    fn test_deterministic_pairs() {
        let est = ConditionalEstimator::new(2, 1.0, 3.0).unwrap();
        let mut src = SequenceSource::new(vec![0.5, 0.9, 0.5, 0.5]);
        let pairs = est.sample_pairs(&mut src);

        let ln2 = std::f64::consts::LN_2;
        let x2 = -(0.1_f64).ln();
        assert!((pairs[0].0 - ln2).abs() < 1e-12);
        assert!((pairs[1].0 - x2).abs() < 1e-12);
        assert!((pairs[0].1 - ln2 * ln2).abs() < 1e-12);
        assert!((pairs[1].1 - x2 * ln2).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_extremes() {
        let mut rng = SimRng::new(1);
        let none = ConditionalEstimator::new(1_000, 1.0, -1.0).unwrap().run(&mut rng);
        assert!(none.result.estimate.abs() < f64::EPSILON);
        assert!(none.result.std_error.abs() < f64::EPSILON);

        let all = ConditionalEstimator::new(1_000, 1.0, 1e300).unwrap().run(&mut rng);
        assert!((all.result.estimate - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(ConditionalEstimator::new(0, 1.0, 3.0).is_err());
        assert!(ConditionalEstimator::new(10, 0.0, 3.0).is_err());
        assert!(ConditionalEstimator::new(10, 1.0, f64::NAN).is_err());
    }
}
