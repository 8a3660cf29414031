//! Versioned envelope around persisted engine outputs.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;
use crate::schema::Schema;
use crate::stats::FeatureStatistics;
use crate::validation::AnomalyReport;

/// Format version written into every artifact.
pub const FORMAT_VERSION: &str = "1.0";

/// Versions this build can read.
pub const SUPPORTED_VERSIONS: &[&str] = &[FORMAT_VERSION];

/// What an artifact contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Feature statistics
    Statistics,
    /// Schema
    Schema,
    /// Anomaly report
    AnomalyReport,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Statistics => write!(f, "statistics"),
            ArtifactKind::Schema => write!(f, "schema"),
            ArtifactKind::AnomalyReport => write!(f, "anomaly_report"),
        }
    }
}

/// An engine output that can be persisted.
pub trait Payload: Serialize + DeserializeOwned {
    /// Kind recorded in the envelope
    const KIND: ArtifactKind;

    /// Structural checks run after loading.
    fn check(&self) -> Result<()>;
}

impl Payload for FeatureStatistics {
    const KIND: ArtifactKind = ArtifactKind::Statistics;

    fn check(&self) -> Result<()> {
        FeatureStatistics::check(self)
    }
}

impl Payload for Schema {
    const KIND: ArtifactKind = ArtifactKind::Schema;

    fn check(&self) -> Result<()> {
        Schema::check(self)
    }
}

impl Payload for AnomalyReport {
    const KIND: ArtifactKind = ArtifactKind::AnomalyReport;

    fn check(&self) -> Result<()> {
        Ok(())
    }
}

/// Payload plus provenance.
///
/// All artifacts written by one pipeline run share a `run_id`, which keeps
/// the payloads themselves free of run-specific data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact<T> {
    /// Persisted format version
    pub format_version: String,
    /// Payload kind
    pub kind: ArtifactKind,
    /// Pipeline run that produced the artifact
    pub run_id: Uuid,
    /// Production timestamp
    pub produced_at: DateTime<Utc>,
    /// The engine output
    pub payload: T,
}

impl<T: Payload> Artifact<T> {
    /// Wraps a payload under a fresh run id.
    pub fn new(payload: T) -> Self {
        Self::for_run(Uuid::new_v4(), payload)
    }

    /// Wraps a payload for an existing run.
    pub fn for_run(run_id: Uuid, payload: T) -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            kind: T::KIND,
            run_id,
            produced_at: Utc::now(),
            payload,
        }
    }

    /// Borrows the payload.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Unwraps the payload.
    pub fn into_payload(self) -> T {
        self.payload
    }
}
