//! Exponential distribution.
//!
//! ```text
//! pdf:       f(x) = λ e^{-λx},   x ≥ 0
//! cdf:       F(x) = 1 − e^{-λx}, F(∞) = 1
//! inverse:   F⁻¹(u) = −ln(1 − u) / λ
//! mean:      E[X] = 1 / λ
//! ```

use serde::{Deserialize, Serialize};

use crate::engine::rng::UniformSource;
use crate::error::{SimError, SimResult};

/// Exponential distribution with a validated, strictly positive rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Exponential {
    rate: f64,
}

impl Exponential {
    /// Create a distribution with rate `λ`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if `rate` is not a finite
    /// positive number.
    pub fn new(rate: f64) -> SimResult<Self> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(SimError::invalid(
                "rate",
                format!("must be finite and > 0, got {rate}"),
            ));
        }
        Ok(Self { rate })
    }

    /// Rate parameter `λ`.
    #[must_use]
    pub const fn rate(&self) -> f64 {
        self.rate
    }

    /// Theoretical mean `1/λ`.
    #[must_use]
    pub fn mean(&self) -> f64 {
        1.0 / self.rate
    }

    /// Density at `x` (zero for negative `x`).
    #[must_use]
    pub fn pdf(&self, x: f64) -> f64 {
        if x < 0.0 {
            0.0
        } else {
            self.rate * (-self.rate * x).exp()
        }
    }

    /// Cumulative distribution `F(x)`; `F(∞) = 1`.
    #[must_use]
    pub fn cdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            0.0
        } else if x.is_infinite() {
            1.0
        } else {
            -(-self.rate * x).exp_m1()
        }
    }

    /// Survival function `1 − F(x) = e^{-λx}`.
    #[must_use]
    pub fn survival(&self, x: f64) -> f64 {
        if x <= 0.0 {
            1.0
        } else {
            (-self.rate * x).exp()
        }
    }

    /// Probability mass of `[lower, upper)`; pass `f64::INFINITY` for an
    /// unbounded upper end.
    #[must_use]
    pub fn interval_probability(&self, lower: f64, upper: f64) -> f64 {
        // survival difference keeps precision in the far tail
        self.survival(lower) - self.survival(upper)
    }

    /// Inverse-CDF transform `−ln(1 − u)/λ`.
    #[must_use]
    pub fn inverse_cdf(&self, u: f64) -> f64 {
        -(-u).ln_1p() / self.rate
    }

    /// Tail transform `−ln(u)/λ + offset`, the memoryless shortcut for
    /// sampling `[offset, ∞)`.
    ///
    /// `u = 0` is nudged to the smallest positive normal to keep the result
    /// finite.
    #[must_use]
    pub fn tail_transform(&self, u: f64, offset: f64) -> f64 {
        let u = if u < f64::MIN_POSITIVE {
            f64::MIN_POSITIVE
        } else {
            u
        };
        -u.ln() / self.rate + offset
    }

    /// Draw one variate by inverse-CDF transform.
    pub fn sample<R: UniformSource + ?Sized>(&self, rng: &mut R) -> f64 {
        self.inverse_cdf(rng.next_uniform())
    }

    /// Draw `n` independent variates.
    pub fn sample_n<R: UniformSource + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        (0..n).map(|_| self.sample(rng)).collect()
    }
}
