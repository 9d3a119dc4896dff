//! Estimator tuning configuration
//!
//! Construction-time knobs only: the estimator reads no files and no
//! environment variables. The serde derives exist so an embedding
//! application can carry these values inside its own configuration file.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_correlation_table_size must be at least 1")]
    ZeroTableSize,
    #[error("drift_speed_divisor must be at least 1")]
    ZeroDriftDivisor,
}

/// Tuning constants for a [`crate::ClockOffsetEstimator`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Maximum number of in-flight correlations kept per direction.
    ///
    /// Bounds memory under sustained one-sided loss; larger values tolerate
    /// more reordering between an event and its acknowledgement before the
    /// correlation is evicted.
    #[serde(default = "default_table_size")]
    pub max_correlation_table_size: usize,

    /// Divisor for the drift-smoothing step.
    ///
    /// A larger-than-bound delay sample nudges the bound up by
    /// `(sample - bound) / drift_speed_divisor`. Lower values track clock
    /// drift faster but let single jittered samples move the bound more.
    #[serde(default = "default_drift_divisor")]
    pub drift_speed_divisor: u32,
}

fn default_table_size() -> usize {
    100
}

fn default_drift_divisor() -> u32 {
    8
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        EstimatorConfig {
            max_correlation_table_size: default_table_size(),
            drift_speed_divisor: default_drift_divisor(),
        }
    }
}

impl EstimatorConfig {
    /// Check that both knobs are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_correlation_table_size == 0 {
            return Err(ConfigError::ZeroTableSize);
        }
        if self.drift_speed_divisor == 0 {
            return Err(ConfigError::ZeroDriftDivisor);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EstimatorConfig::default();
        assert_eq!(config.max_correlation_table_size, 100);
        assert_eq!(config.drift_speed_divisor, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_table_size() {
        let config = EstimatorConfig {
            max_correlation_table_size: 0,
            ..EstimatorConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTableSize));
    }

    #[test]
    fn test_validate_rejects_zero_divisor() {
        let config = EstimatorConfig {
            drift_speed_divisor: 0,
            ..EstimatorConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroDriftDivisor));
    }

    #[test]
    fn test_toml_roundtrip_with_defaults() {
        let config: EstimatorConfig = toml::from_str("").unwrap();
        assert_eq!(config.max_correlation_table_size, 100);
        assert_eq!(config.drift_speed_divisor, 8);

        let config: EstimatorConfig =
            toml::from_str("max_correlation_table_size = 16\ndrift_speed_divisor = 4\n").unwrap();
        assert_eq!(config.max_correlation_table_size, 16);
        assert_eq!(config.drift_speed_divisor, 4);
    }
}
