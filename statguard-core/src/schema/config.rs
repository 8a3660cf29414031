//! Schema inference configuration.

use serde::{Deserialize, Serialize};

use crate::config::ConfigValidationError;

use super::models::NewFeaturePolicy;

/// Controls how a schema is derived from statistics.
///
/// Range widening is opt-in: with the default slack of `0.0` the inferred
/// range is exactly the observed `[min, max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Fraction of the observed range width added on each side of numeric
    /// ranges
    pub numeric_slack: f64,
    /// Policy recorded in the schema for features it does not know
    pub new_features: NewFeaturePolicy,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            numeric_slack: 0.0,
            new_features: NewFeaturePolicy::Flag,
        }
    }
}

impl InferenceConfig {
    /// Creates a new inference config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the numeric range slack.
    pub fn with_numeric_slack(mut self, slack: f64) -> Self {
        if !slack.is_finite() || slack < 0.0 {
            tracing::warn!("numeric_slack {} clamped to 0.0", slack);
            self.numeric_slack = 0.0;
        } else {
            self.numeric_slack = slack;
        }
        self
    }

    /// Builder method to set the new feature policy.
    pub fn with_new_features(mut self, policy: NewFeaturePolicy) -> Self {
        self.new_features = policy;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.numeric_slack.is_finite() || self.numeric_slack < 0.0 {
            return Err(ConfigValidationError::InvalidSlack(self.numeric_slack));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inference_config_default() {
        let config = InferenceConfig::default();
        assert_eq!(config.numeric_slack, 0.0);
        assert_eq!(config.new_features, NewFeaturePolicy::Flag);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inference_config_slack_clamping() {
        assert_eq!(InferenceConfig::new().with_numeric_slack(-1.0).numeric_slack, 0.0);
        assert_eq!(InferenceConfig::new().with_numeric_slack(f64::NAN).numeric_slack, 0.0);
        assert_eq!(InferenceConfig::new().with_numeric_slack(0.2).numeric_slack, 0.2);
    }

    #[test]
    fn test_inference_config_validate_invalid() {
        let config = InferenceConfig {
            numeric_slack: -0.5,
            ..InferenceConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidSlack(_))
        ));
    }
}
