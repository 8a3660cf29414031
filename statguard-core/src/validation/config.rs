//! Validation thresholds.

use serde::{Deserialize, Serialize};

use crate::config::ConfigValidationError;

/// Default cap on offending values listed per anomaly.
pub const DEFAULT_MAX_LISTED_VALUES: usize = 10;

/// Controls anomaly severities and optional drift detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Missing fraction at or above which an unexpected-missing anomaly is
    /// an error rather than a warning. The default of 1.0 escalates only
    /// when every row is missing.
    pub missing_error_fraction: f64,
    /// Maximum unexpected values listed in a single anomaly
    pub max_listed_values: usize,
    /// L-infinity distance above which a categorical feature has drifted.
    /// `None` disables categorical drift checks.
    pub categorical_drift_threshold: Option<f64>,
    /// Mean shift, in reference standard deviations, above which a numeric
    /// feature has drifted. `None` disables numeric drift checks.
    pub numeric_drift_threshold: Option<f64>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            missing_error_fraction: 1.0,
            max_listed_values: DEFAULT_MAX_LISTED_VALUES,
            categorical_drift_threshold: None,
            numeric_drift_threshold: None,
        }
    }
}

impl ValidationConfig {
    /// Creates a new validation config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the missing fraction that escalates to error.
    pub fn with_missing_error_fraction(mut self, fraction: f64) -> Self {
        if !(0.0..=1.0).contains(&fraction) {
            tracing::warn!(
                "missing_error_fraction {} clamped to valid range [0.0, 1.0]",
                fraction
            );
        }
        self.missing_error_fraction = if fraction.is_nan() {
            1.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        self
    }

    /// Builder method to set how many offending values are listed.
    pub fn with_max_listed_values(mut self, max: usize) -> Self {
        self.max_listed_values = max;
        self
    }

    /// Builder method to enable categorical drift detection.
    pub fn with_categorical_drift_threshold(mut self, threshold: f64) -> Self {
        self.categorical_drift_threshold = Some(threshold);
        self
    }

    /// Builder method to enable numeric drift detection.
    pub fn with_numeric_drift_threshold(mut self, threshold: f64) -> Self {
        self.numeric_drift_threshold = Some(threshold);
        self
    }

    /// Returns true if any drift check is enabled.
    pub fn drift_enabled(&self) -> bool {
        self.categorical_drift_threshold.is_some() || self.numeric_drift_threshold.is_some()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&self.missing_error_fraction) {
            return Err(ConfigValidationError::InvalidMissingErrorFraction(
                self.missing_error_fraction,
            ));
        }
        for threshold in [
            self.categorical_drift_threshold,
            self.numeric_drift_threshold,
        ]
        .into_iter()
        .flatten()
        {
            if !threshold.is_finite() || threshold <= 0.0 {
                return Err(ConfigValidationError::InvalidDriftThreshold(threshold));
            }
        }
        Ok(())
    }
}
