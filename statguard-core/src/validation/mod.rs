//! Validation of feature statistics against a schema.
//!
//! The validator reports deviations as anomalies:
//! - **Structure**: schema features missing from the data, unknown features
//! - **Types**: observed types incompatible with the schema
//! - **Presence**: missing values beyond what the schema allows
//! - **Values**: numeric bounds and categorical domains
//! - **Drift**: distribution shift against reference statistics (opt-in)
//!
//! Anomalies are data. Whether a blocking anomaly stops a pipeline is for
//! the caller to decide from [`AnomalyReport::has_blocking_anomaly`].

mod checks;
mod config;
mod drift;
mod models;
mod validator;

pub use config::{DEFAULT_MAX_LISTED_VALUES, ValidationConfig};
pub use drift::{l_infinity_distance, mean_shift};
pub use models::{
    Anomaly, AnomalyKind, AnomalyReport, DATASET_LEVEL, DriftMetric, Measurement, Severity,
};
pub use validator::Validator;

#[cfg(test)]
mod tests;
