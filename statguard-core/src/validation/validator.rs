//! Validation facade.

use tracing::{debug, info};

use crate::schema::{NewFeaturePolicy, Schema};
use crate::stats::FeatureStatistics;
use crate::{Result, StatguardError};

use super::checks;
use super::config::ValidationConfig;
use super::models::{Anomaly, AnomalyReport, Severity};

/// Compares feature statistics against a schema and reports deviations.
///
/// Report order is fixed: schema features in schema order, each running
/// its checks in sequence, then features the schema does not know, then
/// dataset-level anomalies.
///
/// # Example
///
/// ```rust
/// use statguard_core::dataset::{Column, Dataset};
/// use statguard_core::schema::SchemaInferrer;
/// use statguard_core::stats::StatisticsComputer;
/// use statguard_core::validation::Validator;
///
/// let dataset = Dataset::new(vec![Column::from_values("rating", [1.0, 5.0])])?;
/// let stats = StatisticsComputer::with_defaults().compute(&dataset)?;
/// let schema = SchemaInferrer::with_defaults().infer(&stats)?;
///
/// let report = Validator::with_defaults().validate(&stats, &schema)?;
/// assert!(report.is_empty());
/// # Ok::<(), statguard_core::StatguardError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Creates a new validator with the given configuration.
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Creates a new validator with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// Returns a reference to the validator configuration.
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validates statistics against a schema.
    ///
    /// # Errors
    /// Returns a structural error when either input is malformed. Detected
    /// deviations are returned in the report, never as errors.
    pub fn validate(&self, statistics: &FeatureStatistics, schema: &Schema) -> Result<AnomalyReport> {
        self.run(statistics, schema, None)
    }

    /// Validates statistics against a schema and checks each feature for
    /// drift relative to a reference summary.
    ///
    /// Drift checks only run for thresholds set in the configuration.
    pub fn validate_with_reference(
        &self,
        statistics: &FeatureStatistics,
        schema: &Schema,
        reference: &FeatureStatistics,
    ) -> Result<AnomalyReport> {
        reference.check()?;
        self.run(statistics, schema, Some(reference))
    }

    fn run(
        &self,
        statistics: &FeatureStatistics,
        schema: &Schema,
        reference: Option<&FeatureStatistics>,
    ) -> Result<AnomalyReport> {
        self.config
            .validate()
            .map_err(|e| StatguardError::configuration(e.to_string()))?;
        statistics.check()?;
        schema.check()?;

        let mut anomalies = Vec::new();

        for constraint in schema.features() {
            let Some(summary) = statistics.feature(&constraint.name) else {
                anomalies.push(checks::feature_missing(constraint));
                continue;
            };

            let mismatch = checks::type_mismatch(constraint, summary);
            let type_ok = mismatch.is_none();
            anomalies.extend(mismatch);
            anomalies.extend(checks::unexpected_missing(constraint, summary, &self.config));

            if type_ok {
                anomalies.extend(checks::out_of_range(constraint, summary));
                anomalies.extend(checks::unexpected_value(constraint, summary, &self.config));

                if let Some(previous) = reference.and_then(|r| r.feature(&summary.name))
                    && previous.feature_type == summary.feature_type
                {
                    anomalies.extend(checks::drift(summary, previous, &self.config));
                }
            }
            debug!("Validated feature '{}'", constraint.name);
        }

        if schema.new_features() == NewFeaturePolicy::Flag {
            anomalies.extend(
                statistics
                    .features
                    .iter()
                    .filter(|s| !schema.contains(&s.name))
                    .map(checks::new_feature),
            );
        }

        anomalies.extend(checks::empty_dataset(statistics, schema.source_row_count()));

        let report = AnomalyReport::new(anomalies);
        log_summary(&report);
        Ok(report)
    }
}

fn log_summary(report: &AnomalyReport) {
    if report.is_empty() {
        info!("Validation found no anomalies");
        return;
    }
    info!(
        "Validation found {} anomalies ({} errors, {} warnings)",
        report.len(),
        report.count_by_severity(Severity::Error),
        report.count_by_severity(Severity::Warning)
    );
    for anomaly in report.iter().map(describe) {
        debug!("{}", anomaly);
    }
}

fn describe(anomaly: &Anomaly) -> String {
    format!(
        "[{}] {} {}: {}",
        anomaly.severity,
        anomaly.kind,
        anomaly.target(),
        anomaly.description
    )
}
