//! Control variates for `E[X]`, `X ~ Exp(λ)`.
//!
//! Both modes report `f̄ + c·(ḡ − E[g])` for a control `g` with known mean:
//!
//! - [`ControlMode::GlobalShift`]: `g ~ Exp(κλ)` drawn independently and
//!   `c = −1`, i.e. the sample mean is shifted by the control's mean error.
//!   The shift is applied to the mean as a whole, not pointwise.
//! - [`ControlMode::Optimal`]: `g = U`, the uniform driving each draw
//!   (`E[U] = ½`), with the regression coefficient `c* = −Cov(f, g)/Var(g)`
//!   estimated from the same samples.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::exponential::Exponential;
use super::monte_carlo::{mean, MonteCarloResult, RunningStats};
use crate::engine::rng::UniformSource;
use crate::error::{ensure_finite, SimError, SimResult};

/// How the control adjusts the estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// Independent exponential control, unit coefficient, global shift.
    #[default]
    GlobalShift,
    /// Driving uniform as control, fitted coefficient, pointwise.
    Optimal,
}

/// Output of a control-variate run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlRun {
    /// Mode that produced this run.
    pub mode: ControlMode,
    /// Adjusted estimate of `E[X]`.
    pub result: MonteCarloResult,
    /// Theoretical `E[X] = 1/λ`.
    pub true_mean: f64,
    /// Known mean of the control.
    pub control_mean: f64,
    /// Coefficient `c` in `f̄ + c·(ḡ − E[g])`.
    pub coefficient: f64,
    /// Draws of `X`.
    pub simulations: Vec<f64>,
    /// Draws of the control.
    pub controls: Vec<f64>,
}

/// Control-variate estimator.
#[derive(Debug, Clone)]
pub struct ControlVariateEstimator {
    dist: Exponential,
    control: Exponential,
    sample_count: usize,
    mode: ControlMode,
}

impl ControlVariateEstimator {
    /// Create an estimator with `sample_count` draws of `Exp(rate)` and a
    /// control of rate `rate * control_rate_factor`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if either rate is invalid or
    /// `sample_count` is below 2.
    pub fn new(
        sample_count: usize,
        rate: f64,
        control_rate_factor: f64,
        mode: ControlMode,
    ) -> SimResult<Self> {
        let dist = Exponential::new(rate)?;
        let control = Exponential::new(rate * control_rate_factor).map_err(|_| {
            SimError::invalid(
                "control_rate_factor",
                format!("must be finite and > 0, got {control_rate_factor}"),
            )
        })?;
        if sample_count < 2 {
            return Err(SimError::invalid(
                "sample_count",
                format!("need at least 2 draws, got {sample_count}"),
            ));
        }
        Ok(Self {
            dist,
            control,
            sample_count,
            mode,
        })
    }

    /// Configured adjustment mode.
    #[must_use]
    pub const fn mode(&self) -> ControlMode {
        self.mode
    }

    /// Run the estimator.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NonFiniteValue`] if the estimate is not finite.
    pub fn run<R: UniformSource + ?Sized>(&self, rng: &mut R) -> SimResult<ControlRun> {
        let run = match self.mode {
            ControlMode::GlobalShift => self.run_global_shift(rng),
            ControlMode::Optimal => self.run_optimal(rng),
        };
        ensure_finite(run.result.estimate, "control.estimate")?;
        debug!(
            mode = ?self.mode,
            estimate = run.result.estimate,
            coefficient = run.coefficient,
            "control variate run finished"
        );
        Ok(run)
    }

    fn run_global_shift<R: UniformSource + ?Sized>(&self, rng: &mut R) -> ControlRun {
        let simulations = self.dist.sample_n(self.sample_count, rng);
        let controls = self.control.sample_n(self.sample_count, rng);

        let sim_stats: RunningStats = simulations.iter().copied().collect();
        let control_stats: RunningStats = controls.iter().copied().collect();
        let control_mean = self.control.mean();

        let estimate = sim_stats.mean() + (control_mean - control_stats.mean());
        // independent draws: the two mean errors add in quadrature
        let std_error = sim_stats.std_error().hypot(control_stats.std_error());

        ControlRun {
            mode: ControlMode::GlobalShift,
            result: MonteCarloResult::new(estimate, std_error, self.sample_count),
            true_mean: self.dist.mean(),
            control_mean,
            coefficient: -1.0,
            simulations,
            controls,
        }
    }

    fn run_optimal<R: UniformSource + ?Sized>(&self, rng: &mut R) -> ControlRun {
        let controls = rng.uniforms(self.sample_count);
        let simulations: Vec<f64> = controls.iter().map(|&u| self.dist.inverse_cdf(u)).collect();

        // first pass: fit the coefficient
        let mean_f = mean(&simulations);
        let mean_g = mean(&controls);
        let n = self.sample_count as f64;
        let cov_fg = simulations
            .iter()
            .zip(&controls)
            .map(|(f, g)| (f - mean_f) * (g - mean_g))
            .sum::<f64>()
            / n;
        let var_g = controls.iter().map(|g| (g - mean_g).powi(2)).sum::<f64>() / n;
        let coefficient = if var_g > f64::EPSILON {
            -cov_fg / var_g
        } else {
            0.0
        };

        // second pass: adjust pointwise
        let control_mean = 0.5;
        let adjusted: RunningStats = simulations
            .iter()
            .zip(&controls)
            .map(|(f, g)| f + coefficient * (g - control_mean))
            .collect();

        ControlRun {
            mode: ControlMode::Optimal,
            result: MonteCarloResult::new(adjusted.mean(), adjusted.std_error(), self.sample_count),
            true_mean: self.dist.mean(),
            control_mean,
            coefficient,
            simulations,
            controls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::monte_carlo::compare_variance;
    use crate::engine::rng::{SequenceSource, SimRng};

    #[test]
    fn test_global_shift_near_true_mean() {
        let est = ControlVariateEstimator::new(10_000, 1.0, 2.0, ControlMode::GlobalShift).unwrap();
        let run = est.run(&mut SimRng::new(42)).unwrap();

        assert!((run.true_mean - 1.0).abs() < f64::EPSILON);
        assert!((run.control_mean - 0.5).abs() < f64::EPSILON);
        assert!((run.coefficient + 1.0).abs() < f64::EPSILON);
        assert!((run.result.estimate - 1.0).abs() < 0.05, "{:?}", run.result);
        assert_eq!(run.simulations.len(), 10_000);
        assert_eq!(run.controls.len(), 10_000);
    }

    #[test]
    fn test_global_shift_arithmetic() {
        // alternating uniforms: X draws use 0.5, control draws use 0.5 too
        let est = ControlVariateEstimator::new(2, 1.0, 2.0, ControlMode::GlobalShift).unwrap();
        let mut src = SequenceSource::constant(0.5);
        let run = est.run(&mut src).unwrap();

        let ln2 = std::f64::consts::LN_2;
        // mean(X) = ln2, mean(C) = ln2/2, E[C] = 0.5
        let expected = ln2 + (0.5 - ln2 / 2.0);
        assert!((run.result.estimate - expected).abs() < 1e-12);
    }

    #[test]
    fn test_optimal_near_true_mean() {
        let est = ControlVariateEstimator::new(10_000, 2.0, 2.0, ControlMode::Optimal).unwrap();
        let run = est.run(&mut SimRng::new(7)).unwrap();
        assert!((run.result.estimate - 0.5).abs() < 0.02, "{:?}", run.result);
        // X increases with U, so the fitted coefficient is negative
        assert!(run.coefficient < 0.0);
        assert!(run.controls.iter().all(|u| (0.0..1.0).contains(u)));
    }

    #[test]
    fn test_optimal_reduces_variance() {
        let plain = ControlVariateEstimator::new(1_000, 1.0, 2.0, ControlMode::Optimal).unwrap();
        let dist = Exponential::new(1.0).unwrap();
        let mut rng = SimRng::new(123);
        let cmp = compare_variance(
            200,
            &mut rng,
            |r| Ok(mean(&dist.sample_n(1_000, r))),
            |r| plain.run(r).map(|run| run.result.estimate),
        )
        .unwrap();
        assert!(cmp.is_reduced(), "{cmp:?}");
        assert!(cmp.reduction_factor() > 2.0, "{cmp:?}");
    }

    #[test]
    fn test_constant_control_falls_back_to_plain_mean() {
        let est = ControlVariateEstimator::new(4, 1.0, 2.0, ControlMode::Optimal).unwrap();
        let mut src = SequenceSource::constant(0.5);
        let run = est.run(&mut src).unwrap();
        assert!(run.coefficient.abs() < f64::EPSILON);
        assert!((run.result.estimate - std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(ControlVariateEstimator::new(1, 1.0, 2.0, ControlMode::GlobalShift).is_err());
        assert!(ControlVariateEstimator::new(100, -1.0, 2.0, ControlMode::GlobalShift).is_err());
        let err = ControlVariateEstimator::new(100, 1.0, 0.0, ControlMode::Optimal).unwrap_err();
        assert!(err.to_string().contains("control_rate_factor"));
    }

    #[test]
    fn test_mode_serde_names() {
        let json = serde_json::to_string(&ControlMode::GlobalShift).unwrap();
        assert_eq!(json, "\"global_shift\"");
        let mode: ControlMode = serde_json::from_str("\"optimal\"").unwrap();
        assert_eq!(mode, ControlMode::Optimal);
    }
}
