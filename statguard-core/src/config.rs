//! Engine configuration.
//!
//! All thresholds are explicit parameters handed to the engine by the caller.
//! Nothing here reads environment variables or files; the CLI decides where
//! a configuration comes from and passes the parsed value in.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::preprocess::ImbalancePolicy;
use crate::schema::InferenceConfig;
use crate::stats::StatisticsConfig;
use crate::validation::ValidationConfig;
use crate::{Result, StatguardError};

/// Validation errors for engine configuration.
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    /// `top_k` is zero
    #[error("top_k must be at least 1, got {0}")]
    InvalidTopK(usize),
    /// `quantile_buckets` is outside 1..=1000
    #[error("quantile_buckets must be between 1 and 1000, got {0}")]
    InvalidQuantileBuckets(usize),
    /// `numeric_slack` is negative or not finite
    #[error("numeric_slack must be a finite value >= 0.0, got {0}")]
    InvalidSlack(f64),
    /// `missing_error_fraction` is outside [0, 1]
    #[error("missing_error_fraction must be between 0.0 and 1.0, got {0}")]
    InvalidMissingErrorFraction(f64),
    /// A drift threshold is not positive or not finite
    #[error("drift thresholds must be finite values > 0.0, got {0}")]
    InvalidDriftThreshold(f64),
    /// The imbalance ratio threshold is below 1 or not finite
    #[error("imbalance ratio_threshold must be a finite value >= 1.0, got {0}")]
    InvalidImbalanceRatio(f64),
}

/// Complete configuration for one pipeline stage.
///
/// Every section falls back to its defaults when omitted from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Statistics computation settings
    pub statistics: StatisticsConfig,
    /// Schema inference settings
    pub inference: InferenceConfig,
    /// Validation thresholds
    pub validation: ValidationConfig,
    /// When resampling is triggered during preprocessing
    pub imbalance: ImbalancePolicy,
}

impl EngineConfig {
    /// Creates a new engine config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates every section.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        self.statistics.validate()?;
        self.inference.validate()?;
        self.validation.validate()?;
        self.imbalance.validate()?;
        Ok(())
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Example
    /// ```rust
    /// use statguard_core::EngineConfig;
    ///
    /// let config = EngineConfig::from_json_str(r#"{"statistics": {"top_k": 20}}"#)?;
    /// assert_eq!(config.statistics.top_k, 20);
    /// assert_eq!(config.validation.missing_error_fraction, 1.0);
    /// # Ok::<(), statguard_core::StatguardError>(())
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| StatguardError::serialization("engine configuration", e))?;
        config
            .validate()
            .map_err(|e| StatguardError::configuration(e.to_string()))?;
        Ok(config)
    }
}
