//! Experiment configuration with YAML schema and validation.
//!
//! Every estimator parameter lives in an explicit [`ExperimentConfig`] that is
//! passed at call time. Defaults reproduce the classic setup: `λ = 1`, seed
//! 42, 10 000 draws per estimator, strata `[0, 1)`, `[1, 3)`, `[3, ∞)`.
//!
//! Validation runs in two layers:
//! - schema constraints via `validator` derive
//! - semantic checks (boundary ordering, finite rates) beyond the schema
//!
//! # Example
//!
//! ```yaml
//! seed: 7
//! rate: 2.0
//! stratified:
//!   sample_count: 5000
//!   boundaries: [0.0, 0.5, 2.0, .inf]
//! control:
//!   mode: optimal
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::domains::antithetic::DEFAULT_SAMPLE_SIZES;
use crate::domains::conditional::DEFAULT_THRESHOLD;
use crate::domains::control::ControlMode;
use crate::domains::stratified::{validate_boundaries, DEFAULT_BOUNDARIES};
use crate::error::{SimError, SimResult};

/// Top-level experiment configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ExperimentConfig {
    /// Master seed for every estimator stream.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Rate `λ` of the target distribution `Exp(λ)`.
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_rate")]
    pub rate: f64,

    /// Antithetic-variates settings.
    #[validate(nested)]
    #[serde(default)]
    pub antithetic: AntitheticConfig,

    /// Control-variate settings.
    #[validate(nested)]
    #[serde(default)]
    pub control: ControlConfig,

    /// Stratified-sampling settings.
    #[validate(nested)]
    #[serde(default)]
    pub stratified: StratifiedConfig,

    /// Conditional-probability settings.
    #[validate(nested)]
    #[serde(default)]
    pub conditional: ConditionalConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

const fn default_seed() -> u64 {
    42
}

const fn default_rate() -> f64 {
    1.0
}

const fn default_sample_count() -> usize {
    10_000
}

impl ExperimentConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> SimResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Serialization`] if encoding fails.
    pub fn to_yaml(&self) -> SimResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| SimError::serialization(format!("YAML serialization failed: {e}")))
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> ExperimentConfigBuilder {
        ExperimentConfigBuilder::default()
    }

    /// Run schema and semantic validation.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Validation`] or [`SimError::Config`].
    pub fn check(&self) -> SimResult<()> {
        self.validate()?;
        self.validate_semantic()
    }

    /// Validate semantic constraints beyond schema.
    fn validate_semantic(&self) -> SimResult<()> {
        if !self.rate.is_finite() {
            return Err(SimError::config(format!("rate must be finite, got {}", self.rate)));
        }
        if self.antithetic.sample_sizes.contains(&0) {
            return Err(SimError::config("antithetic sample sizes must all be >= 1"));
        }
        if !self.control.control_rate_factor.is_finite() {
            return Err(SimError::config("control_rate_factor must be finite"));
        }
        validate_boundaries(&self.stratified.boundaries)
            .map_err(|e| SimError::config(format!("stratified boundaries: {e}")))?;
        if !self.conditional.rate_x.is_finite() {
            return Err(SimError::config("conditional rate_x must be finite"));
        }
        if !self.conditional.threshold.is_finite() {
            return Err(SimError::config("conditional threshold must be finite"));
        }
        Ok(())
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            rate: default_rate(),
            antithetic: AntitheticConfig::default(),
            control: ControlConfig::default(),
            stratified: StratifiedConfig::default(),
            conditional: ConditionalConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct ExperimentConfigBuilder {
    seed: Option<u64>,
    rate: Option<f64>,
    boundaries: Option<Vec<f64>>,
    sample_count: Option<usize>,
    control_mode: Option<ControlMode>,
    out_dir: Option<PathBuf>,
}

impl ExperimentConfigBuilder {
    /// Set the master seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set `λ`.
    #[must_use]
    pub const fn rate(mut self, rate: f64) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Set the stratum boundaries.
    #[must_use]
    pub fn boundaries(mut self, boundaries: Vec<f64>) -> Self {
        self.boundaries = Some(boundaries);
        self
    }

    /// Set the draw count of the control, stratified and conditional runs.
    #[must_use]
    pub const fn sample_count(mut self, n: usize) -> Self {
        self.sample_count = Some(n);
        self
    }

    /// Set the control-variate mode.
    #[must_use]
    pub const fn control_mode(mut self, mode: ControlMode) -> Self {
        self.control_mode = Some(mode);
        self
    }

    /// Set the chart output directory.
    #[must_use]
    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    /// Build the configuration without validating it.
    #[must_use]
    pub fn build(self) -> ExperimentConfig {
        let mut config = ExperimentConfig::default();

        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(rate) = self.rate {
            config.rate = rate;
        }
        if let Some(boundaries) = self.boundaries {
            config.stratified.boundaries = boundaries;
        }
        if let Some(n) = self.sample_count {
            config.control.sample_count = n;
            config.stratified.sample_count = n;
            config.conditional.sample_count = n;
        }
        if let Some(mode) = self.control_mode {
            config.control.mode = mode;
        }
        if let Some(dir) = self.out_dir {
            config.output.dir = dir;
        }

        config
    }
}

/// Antithetic-variates settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AntitheticConfig {
    /// Ladder of pair counts, estimated in order.
    #[validate(length(min = 1))]
    #[serde(default = "default_sample_sizes")]
    pub sample_sizes: Vec<usize>,
}

fn default_sample_sizes() -> Vec<usize> {
    DEFAULT_SAMPLE_SIZES.to_vec()
}

impl Default for AntitheticConfig {
    fn default() -> Self {
        Self {
            sample_sizes: default_sample_sizes(),
        }
    }
}

/// Control-variate settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ControlConfig {
    /// Number of draws.
    #[validate(range(min = 2))]
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,
    /// Control rate as a multiple of `λ`.
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_control_rate_factor")]
    pub control_rate_factor: f64,
    /// Adjustment mode.
    #[serde(default)]
    pub mode: ControlMode,
}

const fn default_control_rate_factor() -> f64 {
    2.0
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            sample_count: default_sample_count(),
            control_rate_factor: default_control_rate_factor(),
            mode: ControlMode::default(),
        }
    }
}

/// Stratified-sampling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct StratifiedConfig {
    /// Total draws `N` across all strata.
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,
    /// Stratum boundaries `0 = b_0 < … < b_K = ∞` (`.inf` in YAML).
    #[validate(length(min = 2))]
    #[serde(default = "default_boundaries")]
    pub boundaries: Vec<f64>,
    /// Sample strata on scoped threads.
    #[serde(default)]
    pub parallel_strata: bool,
}

fn default_boundaries() -> Vec<f64> {
    DEFAULT_BOUNDARIES.to_vec()
}

impl Default for StratifiedConfig {
    fn default() -> Self {
        Self {
            sample_count: default_sample_count(),
            boundaries: default_boundaries(),
            parallel_strata: false,
        }
    }
}

/// Conditional-probability settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ConditionalConfig {
    /// Number of `(X, Y)` pairs.
    #[validate(range(min = 1))]
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,
    /// Rate of `X`.
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_rate")]
    pub rate_x: f64,
    /// Threshold `t` in `P(XY ≤ t)`.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

const fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl Default for ConditionalConfig {
    fn default() -> Self {
        Self {
            sample_count: default_sample_count(),
            rate_x: default_rate(),
            threshold: default_threshold(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory that receives chart files.
    #[serde(default = "default_out_dir")]
    pub dir: PathBuf,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_out_dir(),
        }
    }
}
