//! Schema inference from feature statistics.

use tracing::{debug, info};

use crate::stats::{FeatureStatistics, FeatureSummary};
use crate::{Result, StatguardError};

use super::config::InferenceConfig;
use super::models::{Domain, FeatureConstraint, NumericRange, Presence, Schema};

/// Derives a [`Schema`] that accepts the summarized data.
///
/// Inference is a pure function of the statistics: the same summary always
/// yields the same schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaInferrer {
    config: InferenceConfig,
}

impl SchemaInferrer {
    /// Creates a new inferrer with the given configuration.
    pub fn new(config: InferenceConfig) -> Self {
        Self { config }
    }

    /// Creates a new inferrer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(InferenceConfig::default())
    }

    /// Returns a reference to the inferrer configuration.
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Infers a schema from statistics.
    ///
    /// # Errors
    /// Returns a structural error if the statistics are malformed, or a
    /// configuration error if the config is invalid.
    pub fn infer(&self, statistics: &FeatureStatistics) -> Result<Schema> {
        self.config
            .validate()
            .map_err(|e| StatguardError::configuration(e.to_string()))?;
        statistics.check()?;

        if self.config.numeric_slack > 0.0 {
            info!(
                "Widening inferred numeric ranges by {:.1}% of their width",
                self.config.numeric_slack * 100.0
            );
        }

        let features = statistics
            .features
            .iter()
            .map(|summary| self.infer_feature(summary))
            .collect();

        let schema = Schema::new(features, self.config.new_features, statistics.row_count)?;
        info!("Inferred schema with {} features", schema.features().len());
        Ok(schema)
    }

    fn infer_feature(&self, summary: &FeatureSummary) -> FeatureConstraint {
        let presence = if summary.missing_count == 0 {
            Presence::Required
        } else {
            Presence::Optional {
                max_missing_fraction: summary.missing_fraction(),
            }
        };

        let range = summary
            .numeric
            .as_ref()
            .map(|n| widen(n.min, n.max, self.config.numeric_slack));

        let domain = summary.categorical.as_ref().map(|c| {
            let values = c.entries.iter().map(|e| e.value.clone());
            if c.other_count > 0 {
                // present_count > 0 whenever other_count > 0
                let fraction = c.other_count as f64 / summary.present_count() as f64;
                Domain::open(values, fraction)
            } else {
                Domain::closed(values)
            }
        });

        debug!(
            "Feature '{}': required={}, range={:?}, domain_size={:?}",
            summary.name,
            presence.is_required(),
            range,
            domain.as_ref().map(|d| d.values.len())
        );

        FeatureConstraint {
            name: summary.name.clone(),
            feature_type: summary.feature_type,
            presence,
            range,
            domain,
        }
    }
}

/// Widens `[min, max]` by `slack` times its width on each side.
///
/// A single-point range uses `|max|` as its width so that slack still has
/// an effect. Bounds saturate at `f64::MIN` and `f64::MAX`.
fn widen(min: f64, max: f64, slack: f64) -> NumericRange {
    if slack <= 0.0 {
        return NumericRange::new(min, max);
    }
    let width = if max > min { max - min } else { max.abs() };
    let margin = width * slack;
    NumericRange::new((min - margin).max(f64::MIN), (max + margin).min(f64::MAX))
}
