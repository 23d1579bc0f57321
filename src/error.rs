//! Error types for expvar.
//!
//! All fallible operations return `Result<T, SimError>` instead of panicking.
//! Parameter problems are reported before any sampling happens.

use thiserror::Error;

/// Result type alias for expvar operations.
pub type SimResult<T> = Result<T, SimError>;

/// Unified error type for all expvar operations.
#[derive(Debug, Error)]
pub enum SimError {
    // ===== Parameter Errors =====
    /// A model parameter is out of its domain.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// An aggregate came out as NaN or infinite.
    #[error("non-finite value detected at {location}")]
    NonFiniteValue {
        /// Where the value was produced.
        location: String,
    },

    // ===== Configuration Errors =====
    /// Invalid configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== Domain Errors =====
    /// Monte Carlo sampling failure.
    #[error("Monte Carlo error: {0}")]
    MonteCarlo(String),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SimError {
    /// Create an invalid-parameter error.
    #[must_use]
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Create a Monte Carlo sampling error.
    #[must_use]
    pub fn monte_carlo(message: impl Into<String>) -> Self {
        Self::MonteCarlo(message.into())
    }

    /// Create a non-finite value error.
    #[must_use]
    pub fn non_finite(location: impl Into<String>) -> Self {
        Self::NonFiniteValue {
            location: location.into(),
        }
    }

    /// Check if the error was caused by bad input rather than the environment.
    #[must_use]
    pub const fn is_parameter_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. }
                | Self::Config { .. }
                | Self::YamlParse(_)
                | Self::Validation(_)
        )
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Ensure a computed value is finite, tagging the failure with `location`.
///
/// # Errors
///
/// Returns [`SimError::NonFiniteValue`] when `value` is NaN or infinite.
pub fn ensure_finite(value: f64, location: &str) -> SimResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimError::non_finite(location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_display() {
        let err = SimError::invalid("rate", "must be positive, got -1");
        let msg = err.to_string();
        assert!(msg.contains("Invalid parameter 'rate'"));
        assert!(msg.contains("must be positive"));
        assert!(err.is_parameter_error());
    }

    #[test]
    fn test_error_config() {
        let err = SimError::config("missing section");
        assert!(err.is_parameter_error());
        let msg = err.to_string();
        assert!(msg.contains("Configuration error"));
        assert!(msg.contains("missing section"));
    }

    #[test]
    fn test_error_serialization() {
        let err = SimError::serialization("failed to serialize");
        assert!(!err.is_parameter_error());
        assert!(err.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_error_non_finite() {
        let err = SimError::non_finite("stratified.estimate");
        assert!(!err.is_parameter_error());
        let msg = err.to_string();
        assert!(msg.contains("non-finite"));
        assert!(msg.contains("stratified.estimate"));
    }

    #[test]
    fn test_error_monte_carlo() {
        let err = SimError::monte_carlo("stratum worker panicked");
        assert!(!err.is_parameter_error());
        assert!(err.to_string().contains("Monte Carlo error"));
    }

    #[test]
    fn test_error_io_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "chart.svg");
        let err: SimError = io.into();
        assert!(err.to_string().contains("I/O error"));
        assert!(!err.is_parameter_error());
    }

    #[test]
    fn test_error_yaml_from() {
        let parsed: Result<u32, _> = serde_yaml::from_str("[not, a, number]");
        let err: SimError = parsed.unwrap_err().into();
        assert!(err.to_string().contains("YAML parsing error"));
        assert!(err.is_parameter_error());
    }

    #[test]
    fn test_ensure_finite() {
        assert!((ensure_finite(1.5, "x").unwrap() - 1.5).abs() < f64::EPSILON);
        assert!(matches!(
            ensure_finite(f64::NAN, "x"),
            Err(SimError::NonFiniteValue { .. })
        ));
        assert!(ensure_finite(f64::INFINITY, "x").is_err());
    }
}
