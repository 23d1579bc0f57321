//! Deterministic random number generation.
//!
//! Estimators never call `rand` directly; they pull uniforms through the
//! [`UniformSource`] trait. [`SimRng`] is the production source (PCG64 with
//! partitioned streams), [`SequenceSource`] replays a fixed list of uniforms.
//!
//! # Reproducibility Guarantee
//!
//! Given the same master seed, all random number sequences are
//! bitwise-identical across runs, platforms, and thread counts (via
//! partitioning).

use rand::prelude::*;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

/// Golden-ratio increment used to derive partition seeds.
const STREAM_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// `SplitMix64` finalizer, so nested partitions never alias sibling streams.
const fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// A source of independent uniform reals in `[0, 1)`.
pub trait UniformSource {
    /// Draw the next uniform in `[0, 1)`.
    fn next_uniform(&mut self) -> f64;

    /// Draw `n` uniforms.
    fn uniforms(&mut self, n: usize) -> Vec<f64> {
        (0..n).map(|_| self.next_uniform()).collect()
    }
}

/// Deterministic, reproducible random number generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimRng {
    /// Master seed for reproducibility.
    master_seed: u64,
    /// Current stream index for partitioning.
    stream: u64,
    /// Internal PCG state.
    rng: Pcg64,
}

impl SimRng {
    /// Create a new RNG with the given master seed.
    #[must_use]
    pub fn new(master_seed: u64) -> Self {
        let rng = Pcg64::seed_from_u64(master_seed);
        Self {
            master_seed,
            stream: 0,
            rng,
        }
    }

    /// Get the master seed.
    #[must_use]
    pub const fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Get current stream index.
    #[must_use]
    pub const fn stream(&self) -> u64 {
        self.stream
    }

    /// Create partitioned RNGs for independent sub-computations.
    ///
    /// Each partition gets an independent stream whose seed is mixed from the
    /// master seed and stream index, so per-stratum or per-replication results
    /// do not depend on execution order. A partition reports its derived seed
    /// as its own master seed and can be partitioned again.
    ///
    /// # Example
    ///
    /// ```rust
    /// use expvar::engine::rng::SimRng;
    ///
    /// let mut rng = SimRng::new(42);
    /// let partitions = rng.partition(3);
    /// assert_eq!(partitions.len(), 3);
    /// assert_eq!(rng.stream(), 3);
    /// ```
    #[must_use]
    pub fn partition(&mut self, n: usize) -> Vec<Self> {
        let partitions: Vec<Self> = (0..n)
            .map(|i| {
                // offset by one so partition 0 never replays the master sequence
                let stream = self.stream + i as u64 + 1;
                let seed = mix(self.master_seed ^ stream.wrapping_mul(STREAM_STRIDE));
                Self {
                    master_seed: seed,
                    stream,
                    rng: Pcg64::seed_from_u64(seed),
                }
            })
            .collect();

        self.stream += n as u64;
        partitions
    }

    /// Generate a random f64 in [0, 1).
    pub fn gen_f64(&mut self) -> f64 {
        self.rng.gen()
    }

    /// Generate n random f64 samples in [0, 1).
    #[must_use]
    pub fn sample_n(&mut self, n: usize) -> Vec<f64> {
        (0..n).map(|_| self.gen_f64()).collect()
    }
}

impl UniformSource for SimRng {
    fn next_uniform(&mut self) -> f64 {
        self.gen_f64()
    }
}

/// Replays a fixed list of uniforms, cycling when exhausted.
///
/// Used to pin estimators to known inputs, e.g. the antithetic pair at
/// `U = 0.5`.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceSource {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceSource {
    /// Create a source from explicit values.
    ///
    /// Values outside `[0, 1)` are clamped into that range. An empty list
    /// behaves as a constant `0.0`.
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self { values, cursor: 0 }
    }

    /// Source that always yields `value`.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Number of values drawn so far.
    #[must_use]
    pub const fn drawn(&self) -> usize {
        self.cursor
    }
}

impl UniformSource for SequenceSource {
    fn next_uniform(&mut self) -> f64 {
        if self.values.is_empty() {
            self.cursor += 1;
            return 0.0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Falsification test: reproducibility holds for any seed.
        #[test]
        fn prop_reproducibility(seed in 0u64..u64::MAX) {
            let mut rng1 = SimRng::new(seed);
            let mut rng2 = SimRng::new(seed);
            prop_assert_eq!(rng1.sample_n(100), rng2.sample_n(100));
        }

        /// Falsification test: values in [0, 1) for any seed.
        #[test]
        fn prop_unit_interval(seed in 0u64..u64::MAX) {
            let mut rng = SimRng::new(seed);
            for _ in 0..100 {
                let v = rng.next_uniform();
                prop_assert!((0.0..1.0).contains(&v), "Value {} not in [0, 1)", v);
            }
        }

        #[test]
        fn prop_partition_count(seed in 0u64..u64::MAX, n in 1usize..100) {
            let mut rng = SimRng::new(seed);
            let partitions = rng.partition(n);
            prop_assert_eq!(partitions.len(), n);
        }
    }
}
