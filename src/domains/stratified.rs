//! Stratified sampling estimator for `E[X]`, `X ~ Exp(λ)`.
//!
//! The support `[0, ∞)` is cut at boundaries `0 = b₀ < b₁ < … < b_K = ∞`.
//! Each stratum gets draws in proportion to its probability mass and is
//! sampled only inside its own interval; the estimate is the
//! probability-weighted sum of the per-stratum means.
//!
//! ```text
//! P_i   = F(b_i) − F(b_{i−1})
//! n_i   = ⌊N · P_i⌋            (i < K)
//! n_K   = N − Σ_{i<K} n_i      (last stratum absorbs the rounding)
//! Ê[X]  = Σ P_i · mean(samples_i)
//! SE    = sqrt(Σ P_i² · s_i² / n_i)
//! ```
//!
//! Proportional allocation removes the between-strata variance from the
//! estimator, so its variance never exceeds the plain sample mean's.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::exponential::Exponential;
use super::monte_carlo::{MonteCarloResult, RunningStats};
use crate::engine::rng::{SimRng, UniformSource};
use crate::error::{ensure_finite, SimError, SimResult};

/// Default boundaries: `[0, 1)`, `[1, 3)`, `[3, ∞)`.
pub const DEFAULT_BOUNDARIES: [f64; 4] = [0.0, 1.0, 3.0, f64::INFINITY];

/// Tolerance on `Σ P_i = 1`.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Sampling variant, keyed by the stratum's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StratumKind {
    /// First stratum `[0, b)`.
    FromZero,
    /// Bounded stratum `[a, b)` with `a > 0`.
    Interior,
    /// Unbounded last stratum `[a, ∞)`.
    Tail,
}

/// One stratum of the partition with its allocated draw count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stratum {
    /// Inclusive lower bound.
    pub lower: f64,
    /// Exclusive upper bound (`f64::INFINITY` for the tail).
    pub upper: f64,
    /// CDF mass of `[lower, upper)`.
    pub probability: f64,
    /// Draws allocated to this stratum.
    pub sample_count: usize,
    /// Which transform samples this stratum.
    pub kind: StratumKind,
}

impl Stratum {
    /// Whether `x` falls inside `[lower, upper)`.
    #[must_use]
    pub fn contains(&self, x: f64) -> bool {
        x >= self.lower && x < self.upper
    }

    /// Draw `sample_count` variates restricted to this stratum.
    pub fn sample<R: UniformSource + ?Sized>(&self, dist: &Exponential, rng: &mut R) -> Vec<f64> {
        self.sample_n(self.sample_count, dist, rng)
    }

    /// Draw `n` variates restricted to this stratum.
    ///
    /// - `FromZero`: uniform rescaled onto `[0, F(b))`, then inverted; the
    ///   plain transform when the stratum is the whole support.
    /// - `Interior`: uniform rescaled onto `[F(a), F(b))`, then inverted.
    /// - `Tail`: `−ln(u)/λ + a`.
    pub fn sample_n<R: UniformSource + ?Sized>(
        &self,
        n: usize,
        dist: &Exponential,
        rng: &mut R,
    ) -> Vec<f64> {
        match self.kind {
            StratumKind::FromZero if self.upper.is_infinite() => dist.sample_n(n, rng),
            StratumKind::FromZero | StratumKind::Interior => {
                // F(a) + u(F(b) − F(a)) inverted, written relative to `a` so the
                // draw stays ≥ a even when F(a) is close to 1
                let width_mass = dist.cdf(self.upper - self.lower);
                // largest float below `upper`; the addition can round up onto it
                let below_upper = f64::from_bits(self.upper.to_bits() - 1);
                (0..n)
                    .map(|_| {
                        let x = self.lower + dist.inverse_cdf(rng.next_uniform() * width_mass);
                        x.min(below_upper)
                    })
                    .collect()
            }
            StratumKind::Tail => (0..n)
                .map(|_| dist.tail_transform(rng.next_uniform(), self.lower))
                .collect(),
        }
    }
}

/// Check that `boundaries` partition `[0, ∞)`.
///
/// # Errors
///
/// Returns [`SimError::InvalidParameter`] unless the list has at least two
/// points, starts at `0`, ends at `+∞`, and is strictly increasing with
/// finite interior points.
pub fn validate_boundaries(boundaries: &[f64]) -> SimResult<()> {
    if boundaries.len() < 2 {
        return Err(SimError::invalid(
            "boundaries",
            format!("need at least 2 points, got {}", boundaries.len()),
        ));
    }
    if boundaries[0] != 0.0 {
        return Err(SimError::invalid(
            "boundaries",
            format!("must start at 0, got {}", boundaries[0]),
        ));
    }
    let last = boundaries[boundaries.len() - 1];
    if !(last.is_infinite() && last > 0.0) {
        return Err(SimError::invalid(
            "boundaries",
            format!("must end at +inf, got {last}"),
        ));
    }
    let interior = &boundaries[..boundaries.len() - 1];
    if let Some(bad) = interior.iter().find(|b| !b.is_finite()) {
        return Err(SimError::invalid(
            "boundaries",
            format!("interior points must be finite, got {bad}"),
        ));
    }
    for pair in boundaries.windows(2) {
        if pair[1] <= pair[0] {
            return Err(SimError::invalid(
                "boundaries",
                format!("must be strictly increasing, got {} then {}", pair[0], pair[1]),
            ));
        }
    }
    Ok(())
}

/// Strata with their probabilities and draw counts for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrataPlan {
    total: usize,
    distribution: Exponential,
    strata: Vec<Stratum>,
}

impl StrataPlan {
    /// Allocate `total` draws across the strata defined by `boundaries`.
    ///
    /// Every stratum but the last gets `⌊total · P_i⌋`; the last takes the
    /// remainder so the counts add up to `total` exactly.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if `boundaries` do not
    /// partition `[0, ∞)`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use expvar::domains::exponential::Exponential;
    /// use expvar::domains::stratified::{StrataPlan, DEFAULT_BOUNDARIES};
    ///
    /// let dist = Exponential::new(1.0).unwrap();
    /// let plan = StrataPlan::allocate(10_000, &dist, &DEFAULT_BOUNDARIES).unwrap();
    /// let counts: Vec<usize> = plan.strata().iter().map(|s| s.sample_count).collect();
    /// assert_eq!(counts, vec![6321, 3180, 499]);
    /// ```
    pub fn allocate(total: usize, dist: &Exponential, boundaries: &[f64]) -> SimResult<Self> {
        validate_boundaries(boundaries)?;

        let k = boundaries.len() - 1;
        let mut strata = Vec::with_capacity(k);
        let mut allocated = 0usize;

        for (i, pair) in boundaries.windows(2).enumerate() {
            let (lower, upper) = (pair[0], pair[1]);
            let probability = dist.interval_probability(lower, upper);
            let is_last = i + 1 == k;
            let kind = if i == 0 {
                StratumKind::FromZero
            } else if is_last {
                StratumKind::Tail
            } else {
                StratumKind::Interior
            };
            let sample_count = if is_last {
                total - allocated
            } else {
                // floor, never above what remains
                ((total as f64 * probability).floor() as usize).min(total - allocated)
            };
            allocated += sample_count;

            strata.push(Stratum {
                lower,
                upper,
                probability,
                sample_count,
                kind,
            });
        }

        debug!(
            total,
            rate = dist.rate(),
            counts = ?strata.iter().map(|s| s.sample_count).collect::<Vec<_>>(),
            "allocated strata"
        );

        Ok(Self {
            total,
            distribution: *dist,
            strata,
        })
    }

    /// Total number of draws.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Distribution being stratified.
    #[must_use]
    pub const fn distribution(&self) -> &Exponential {
        &self.distribution
    }

    /// The strata, in boundary order.
    #[must_use]
    pub fn strata(&self) -> &[Stratum] {
        &self.strata
    }

    /// `Σ P_i`, which should be 1 within [`PROBABILITY_TOLERANCE`].
    #[must_use]
    pub fn probability_sum(&self) -> f64 {
        self.strata.iter().map(|s| s.probability).sum()
    }

    /// Sample every stratum from one source, in boundary order.
    pub fn sample_with<R: UniformSource + ?Sized>(&self, rng: &mut R) -> Vec<Vec<f64>> {
        self.strata
            .iter()
            .map(|s| s.sample(&self.distribution, rng))
            .collect()
    }

    /// Sample every stratum on its own partitioned stream of `rng`.
    ///
    /// The output is identical whether `parallel` is set or not.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MonteCarlo`] if a sampling thread panics.
    pub fn sample_partitioned(&self, rng: &mut SimRng, parallel: bool) -> SimResult<Vec<Vec<f64>>> {
        let streams = rng.partition(self.strata.len());
        let dist = self.distribution;

        if !parallel {
            return Ok(self
                .strata
                .iter()
                .zip(streams)
                .map(|(stratum, mut stream)| stratum.sample(&dist, &mut stream))
                .collect());
        }

        std::thread::scope(|scope| {
            let handles: Vec<_> = self
                .strata
                .iter()
                .zip(streams)
                .map(|(stratum, mut stream)| scope.spawn(move || stratum.sample(&dist, &mut stream)))
                .collect();

            handles
                .into_iter()
                .enumerate()
                .map(|(i, handle)| {
                    handle
                        .join()
                        .map_err(|_| SimError::monte_carlo(format!("stratum {i} sampler panicked")))
                })
                .collect()
        })
    }
}

/// Per-stratum outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratumSummary {
    /// Inclusive lower bound.
    pub lower: f64,
    /// Exclusive upper bound; `None` for the unbounded tail.
    pub upper: Option<f64>,
    /// CDF mass of the stratum.
    pub probability: f64,
    /// Draws actually taken.
    pub sample_count: usize,
    /// Sample mean (0 when no draws were allocated).
    pub mean: f64,
    /// Unbiased sample variance.
    pub variance: f64,
    /// No draws were allocated; the stratum contributes 0 with weight `P_i`.
    pub degenerate: bool,
}

/// Combined stratified estimate plus per-stratum detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratifiedEstimate {
    /// Weighted estimate with its standard error.
    pub result: MonteCarloResult,
    /// Per-stratum summaries, in boundary order.
    pub strata: Vec<StratumSummary>,
}

/// Combine per-stratum samples into `Σ P_i · mean_i`.
///
/// Empty strata contribute 0 while keeping their probability weight, which
/// biases the estimate downwards for very small `N`. They are flagged as
/// `degenerate` and logged rather than rejected.
///
/// # Errors
///
/// Returns [`SimError::InvalidParameter`] if `samples` does not have one
/// sequence per stratum, and [`SimError::NonFiniteValue`] if the estimate is
/// not finite.
pub fn aggregate(plan: &StrataPlan, samples: &[Vec<f64>]) -> SimResult<StratifiedEstimate> {
    if samples.len() != plan.strata().len() {
        return Err(SimError::invalid(
            "samples",
            format!(
                "expected {} stratum sequences, got {}",
                plan.strata().len(),
                samples.len()
            ),
        ));
    }

    let mut estimate = 0.0;
    let mut variance_of_estimate = 0.0;
    let mut summaries = Vec::with_capacity(samples.len());

    for (i, (stratum, values)) in plan.strata().iter().zip(samples).enumerate() {
        let stats: RunningStats = values.iter().copied().collect();
        let degenerate = stats.count() == 0;
        if degenerate {
            warn!(
                stratum = i,
                lower = stratum.lower,
                probability = stratum.probability,
                "stratum received no draws; contributing 0"
            );
        }

        estimate += stratum.probability * stats.mean();
        if stats.count() >= 2 {
            variance_of_estimate +=
                stratum.probability.powi(2) * stats.variance() / stats.count() as f64;
        }

        summaries.push(StratumSummary {
            lower: stratum.lower,
            upper: stratum.upper.is_finite().then_some(stratum.upper),
            probability: stratum.probability,
            sample_count: stats.count(),
            mean: stats.mean(),
            variance: stats.variance(),
            degenerate,
        });
    }

    let estimate = ensure_finite(estimate, "stratified.estimate")?;
    let total = samples.iter().map(Vec::len).sum();

    Ok(StratifiedEstimate {
        result: MonteCarloResult::new(estimate, variance_of_estimate.sqrt(), total),
        strata: summaries,
    })
}

/// A finished stratified run: the estimate and the raw per-stratum draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratifiedRun {
    /// The aggregated estimate.
    pub estimate: StratifiedEstimate,
    /// Draws per stratum, in boundary order.
    pub samples: Vec<Vec<f64>>,
}

impl StratifiedRun {
    /// All draws concatenated in stratum order (for plotting).
    #[must_use]
    pub fn combined(&self) -> Vec<f64> {
        self.samples.iter().flatten().copied().collect()
    }
}

/// Allocator → sampler → aggregator pipeline.
#[derive(Debug, Clone)]
pub struct StratifiedEstimator {
    plan: StrataPlan,
    parallel: bool,
}

impl StratifiedEstimator {
    /// Build an estimator for `total` draws of `Exp(rate)` over `boundaries`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] for a bad rate or boundaries.
    pub fn new(total: usize, rate: f64, boundaries: &[f64]) -> SimResult<Self> {
        let dist = Exponential::new(rate)?;
        let plan = StrataPlan::allocate(total, &dist, boundaries)?;
        Ok(Self {
            plan,
            parallel: false,
        })
    }

    /// Sample strata on scoped threads.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// The allocation this estimator will sample.
    #[must_use]
    pub const fn plan(&self) -> &StrataPlan {
        &self.plan
    }

    /// Run the estimator, one partitioned stream per stratum.
    ///
    /// # Errors
    ///
    /// Propagates sampling and aggregation errors.
    pub fn run(&self, rng: &mut SimRng) -> SimResult<StratifiedRun> {
        let samples = self.plan.sample_partitioned(rng, self.parallel)?;
        let estimate = aggregate(&self.plan, &samples)?;
        debug!(
            estimate = estimate.result.estimate,
            std_error = estimate.result.std_error,
            "stratified run finished"
        );
        Ok(StratifiedRun { estimate, samples })
    }

    /// Run the estimator drawing every stratum from a single source.
    ///
    /// # Errors
    ///
    /// Propagates aggregation errors.
    pub fn run_with<R: UniformSource + ?Sized>(&self, rng: &mut R) -> SimResult<StratifiedRun> {
        let samples = self.plan.sample_with(rng);
        let estimate = aggregate(&self.plan, &samples)?;
        Ok(StratifiedRun { estimate, samples })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn boundaries_strategy() -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(0.01f64..50.0, 0..6).prop_map(|mut cuts| {
            cuts.sort_by(f64::total_cmp);
            cuts.dedup_by(|a, b| (*a - *b).abs() < 1e-6);
            let mut boundaries = Vec::with_capacity(cuts.len() + 2);
            boundaries.push(0.0);
            boundaries.extend(cuts);
            boundaries.push(f64::INFINITY);
            boundaries
        })
    }

    proptest! {
        #[test]
        fn prop_probability_sum(rate in 0.01f64..20.0, boundaries in boundaries_strategy()) {
            let dist = Exponential::new(rate).unwrap();
            let plan = StrataPlan::allocate(1_000, &dist, &boundaries).unwrap();
            prop_assert!((plan.probability_sum() - 1.0).abs() < PROBABILITY_TOLERANCE);
        }

        #[test]
        fn prop_counts_sum(total in 0usize..1_000_000, boundaries in boundaries_strategy()) {
            let dist = Exponential::new(1.0).unwrap();
            let plan = StrataPlan::allocate(total, &dist, &boundaries).unwrap();
            let sum: usize = plan.strata().iter().map(|s| s.sample_count).sum();
            prop_assert_eq!(sum, total);
        }

        #[test]
        fn prop_samples_in_bounds(
            seed in 0u64..u64::MAX,
            rate in 0.1f64..5.0,
            boundaries in boundaries_strategy(),
        ) {
            let dist = Exponential::new(rate).unwrap();
            let plan = StrataPlan::allocate(500, &dist, &boundaries).unwrap();
            let samples = plan.sample_partitioned(&mut SimRng::new(seed), false).unwrap();
            for (stratum, values) in plan.strata().iter().zip(&samples) {
                for &x in values {
                    prop_assert!(x >= stratum.lower);
                    if stratum.kind != StratumKind::Tail {
                        prop_assert!(x < stratum.upper);
                    }
                }
            }
        }
    }
}
