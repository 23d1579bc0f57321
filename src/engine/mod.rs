//! Sampling engine plumbing.
//!
//! Holds the random source abstraction every estimator draws from.

pub mod rng;

pub use rng::{SequenceSource, SimRng, UniformSource};
