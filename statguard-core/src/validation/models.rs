//! Anomaly report data structures.
//!
//! Anomalies are data, not errors. A report is produced once per validation
//! run and never changes afterwards.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::stats::FeatureType;

/// Target label used for anomalies that concern the whole dataset.
pub const DATASET_LEVEL: &str = "dataset-level";

/// Kind of deviation detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyKind {
    /// Feature in the schema is absent from the statistics
    FeatureMissing,
    /// Observed type differs from the required type
    TypeMismatch,
    /// Missing values where the schema does not allow them
    UnexpectedMissing,
    /// Observed min/max outside the accepted range
    OutOfRange,
    /// Values outside the accepted domain
    UnexpectedValue,
    /// Feature not described by the schema
    NewFeature,
    /// No rows, while the schema was built from a non-empty dataset
    EmptyDataset,
    /// Distribution moved away from the reference statistics
    Drift,
}

impl std::fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AnomalyKind::FeatureMissing => "FEATURE_MISSING",
            AnomalyKind::TypeMismatch => "TYPE_MISMATCH",
            AnomalyKind::UnexpectedMissing => "UNEXPECTED_MISSING",
            AnomalyKind::OutOfRange => "OUT_OF_RANGE",
            AnomalyKind::UnexpectedValue => "UNEXPECTED_VALUE",
            AnomalyKind::NewFeature => "NEW_FEATURE",
            AnomalyKind::EmptyDataset => "EMPTY_DATASET",
            AnomalyKind::Drift => "DRIFT",
        };
        f.write_str(name)
    }
}

/// Severity of an anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Worth a notification, not a reason to stop
    Warning,
    /// Blocking: downstream stages should not consume the data as-is
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Distance measure used by a drift check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftMetric {
    /// Largest absolute difference between category frequencies
    LInfinity,
    /// Difference of means in reference standard deviations
    MeanShift,
}

/// The measured values that triggered an anomaly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Measurement {
    /// Nothing measurable, e.g. a missing feature
    None,
    /// Required and observed types
    Types {
        /// Type the schema requires
        expected: FeatureType,
        /// Type found in the statistics
        observed: FeatureType,
    },
    /// Missing value counts against the allowance
    Missing {
        /// Missing values observed
        missing_count: u64,
        /// Missing values over total rows
        missing_fraction: f64,
        /// Largest fraction the constraint allows
        allowed_fraction: f64,
    },
    /// Observed bounds against the accepted range
    Range {
        /// Lower bound of the accepted range
        expected_min: f64,
        /// Upper bound of the accepted range
        expected_max: f64,
        /// Smallest observed value
        observed_min: f64,
        /// Largest observed value
        observed_max: f64,
    },
    /// Unknown values against the domain allowance
    Values {
        /// Retained values outside the domain
        unexpected: Vec<String>,
        /// Present values outside the domain, overflow included
        unknown_count: u64,
        /// Unknown values over present values
        unknown_fraction: f64,
        /// Largest unknown fraction the domain allows
        allowed_fraction: f64,
    },
    /// Type of a feature the schema does not know
    Feature {
        /// Type found in the statistics
        observed_type: FeatureType,
    },
    /// Row counts of the new and reference datasets
    Rows {
        /// Rows in the validated dataset
        observed_rows: u64,
        /// Rows the schema was inferred from
        reference_rows: u64,
    },
    /// Distance between new and reference distributions
    Distance {
        /// How the distance was measured
        metric: DriftMetric,
        /// Measured distance
        distance: f64,
        /// Configured threshold it exceeded
        threshold: f64,
    },
}

/// A single detected deviation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    /// Affected feature; absent for dataset-level anomalies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    /// Kind of deviation
    pub kind: AnomalyKind,
    /// Severity
    pub severity: Severity,
    /// Human-readable description
    pub description: String,
    /// Values that triggered the anomaly
    pub measured: Measurement,
}

impl Anomaly {
    /// Creates a feature-level anomaly.
    pub fn for_feature(
        feature: impl Into<String>,
        kind: AnomalyKind,
        severity: Severity,
        description: impl Into<String>,
        measured: Measurement,
    ) -> Self {
        Self {
            feature: Some(feature.into()),
            kind,
            severity,
            description: description.into(),
            measured,
        }
    }

    /// Creates a dataset-level anomaly.
    pub fn dataset_level(
        kind: AnomalyKind,
        severity: Severity,
        description: impl Into<String>,
        measured: Measurement,
    ) -> Self {
        Self {
            feature: None,
            kind,
            severity,
            description: description.into(),
            measured,
        }
    }

    /// Feature name, or [`DATASET_LEVEL`] for global anomalies.
    pub fn target(&self) -> &str {
        self.feature.as_deref().unwrap_or(DATASET_LEVEL)
    }

    /// Returns true for error severity.
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Ordered collection of anomalies from one validation run.
///
/// Serialization always includes the derived `has_blocking_anomaly` flag so
/// that downstream tooling can branch without inspecting every record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnomalyReport {
    anomalies: Vec<Anomaly>,
}

impl AnomalyReport {
    /// Creates a report from anomalies already in report order.
    pub fn new(anomalies: Vec<Anomaly>) -> Self {
        Self { anomalies }
    }

    /// Anomalies in report order
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    /// Returns true if no deviation was found.
    pub fn is_empty(&self) -> bool {
        self.anomalies.is_empty()
    }

    /// Number of anomalies
    pub fn len(&self) -> usize {
        self.anomalies.len()
    }

    /// Iterates over anomalies in report order.
    pub fn iter(&self) -> std::slice::Iter<'_, Anomaly> {
        self.anomalies.iter()
    }

    /// Returns true if any anomaly has error severity.
    pub fn has_blocking_anomaly(&self) -> bool {
        self.anomalies.iter().any(Anomaly::is_blocking)
    }

    /// Number of anomalies with the given severity.
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.anomalies
            .iter()
            .filter(|a| a.severity == severity)
            .count()
    }

    /// Anomalies of a given kind.
    pub fn of_kind(&self, kind: AnomalyKind) -> impl Iterator<Item = &Anomaly> {
        self.anomalies.iter().filter(move |a| a.kind == kind)
    }

    /// Anomalies concerning a given feature.
    pub fn for_feature<'a>(&'a self, feature: &'a str) -> impl Iterator<Item = &'a Anomaly> {
        self.anomalies
            .iter()
            .filter(move |a| a.feature.as_deref() == Some(feature))
    }
}

impl<'a> IntoIterator for &'a AnomalyReport {
    type Item = &'a Anomaly;
    type IntoIter = std::slice::Iter<'a, Anomaly>;

    fn into_iter(self) -> Self::IntoIter {
        self.anomalies.iter()
    }
}

impl Serialize for AnomalyReport {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("AnomalyReport", 2)?;
        state.serialize_field("has_blocking_anomaly", &self.has_blocking_anomaly())?;
        state.serialize_field("anomalies", &self.anomalies)?;
        state.end()
    }
}
