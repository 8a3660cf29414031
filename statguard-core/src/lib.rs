//! Core engine for statguard.
//!
//! This crate computes descriptive statistics for tabular datasets, infers a
//! schema describing acceptable data, and validates new statistics against
//! that schema to produce an anomaly report. It also carries the dataset
//! preparation steps that run ahead of profiling and the persisted artifact
//! formats shared with the CLI.
//!
//! # Guarantees
//! - Pure transformations over in-memory data, no I/O inside the engine
//! - Deterministic results: the same dataset yields byte-identical statistics
//! - Detected deviations are reported as anomalies, never as errors
//!
//! # Example
//! ```rust
//! use statguard_core::dataset::{Column, Dataset};
//! use statguard_core::{compute_statistics, infer_schema, validate};
//!
//! let baseline = Dataset::new(vec![
//!     Column::from_values("rating", [1.0, 3.0, 5.0]),
//!     Column::from_values("category", ["A", "B", "A"]),
//! ])?;
//! let schema = infer_schema(&compute_statistics(&baseline)?)?;
//!
//! let incoming = Dataset::new(vec![
//!     Column::from_values("rating", [2.0, 7.0]),
//!     Column::from_values("category", ["A", "C"]),
//! ])?;
//! let report = validate(&compute_statistics(&incoming)?, &schema)?;
//!
//! assert_eq!(report.len(), 2);
//! assert!(!report.has_blocking_anomaly());
//! # Ok::<(), statguard_core::StatguardError>(())
//! ```

pub mod artifact;
pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod preprocess;
pub mod schema;
pub mod stats;
pub mod validation;

// Re-export commonly used types
pub use artifact::{Artifact, ArtifactFormat, ArtifactKind, DocumentError, FORMAT_VERSION};
pub use config::{ConfigValidationError, EngineConfig};
pub use dataset::{Column, Dataset, Value};
pub use error::{Result, StatguardError};
pub use logging::init_logging;
pub use schema::{FeatureConstraint, Schema, SchemaInferrer};
pub use stats::{FeatureStatistics, FeatureSummary, FeatureType, StatisticsComputer};
pub use validation::{Anomaly, AnomalyKind, AnomalyReport, Severity, Validator};

/// Computes feature statistics with the default configuration.
///
/// # Errors
/// Returns [`StatguardError::EmptyDataset`] if the dataset has no columns.
pub fn compute_statistics(dataset: &Dataset) -> Result<FeatureStatistics> {
    StatisticsComputer::with_defaults().compute(dataset)
}

/// Infers a schema that accepts the summarized data, with the default
/// configuration.
pub fn infer_schema(statistics: &FeatureStatistics) -> Result<Schema> {
    SchemaInferrer::with_defaults().infer(statistics)
}

/// Validates statistics against a schema with the default configuration.
///
/// # Errors
/// Returns a structural error if either input is malformed. Deviations are
/// reported in the returned [`AnomalyReport`].
pub fn validate(statistics: &FeatureStatistics, schema: &Schema) -> Result<AnomalyReport> {
    Validator::with_defaults().validate(statistics, schema)
}
