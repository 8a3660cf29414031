//! JSON Schema checks for persisted artifacts.
//!
//! Every document is checked before deserialization: format version first,
//! then the envelope, then the payload for the declared kind. Problems are
//! reported as [`DocumentError`], which callers see as a structural input
//! error.

use std::sync::OnceLock;

use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

use crate::StatguardError;

use super::envelope::{ArtifactKind, SUPPORTED_VERSIONS};

/// Problems found in a persisted document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// An embedded schema failed to compile
    #[error("JSON Schema compilation failed: {message}")]
    SchemaCompilation {
        /// Compiler error text
        message: String,
    },

    /// The document does not match the expected shape
    #[error("Document validation failed with {} errors: {}", .errors.len(), .errors.join("; "))]
    ValidationFailed {
        /// One entry per violation
        errors: Vec<String>,
    },

    /// The document declares a version this build cannot read
    #[error("Unsupported format version '{version}'. Supported versions: {supported:?}")]
    UnsupportedVersion {
        /// Version found in the document
        version: String,
        /// Versions this build reads
        supported: Vec<String>,
    },

    /// The document holds a different kind of artifact
    #[error("Expected a {expected} artifact, found {found}")]
    KindMismatch {
        /// Kind the caller asked for
        expected: ArtifactKind,
        /// Kind declared by the document
        found: String,
    },
}

impl DocumentError {
    fn single(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            errors: vec![message.into()],
        }
    }
}

impl From<DocumentError> for StatguardError {
    fn from(error: DocumentError) -> Self {
        match error {
            DocumentError::SchemaCompilation { .. } => StatguardError::codec(error.to_string()),
            other => StatguardError::structural(other.to_string()),
        }
    }
}

const ENVELOPE_SCHEMA: &str = r##"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "statguard artifact envelope v1.0",
  "type": "object",
  "required": ["format_version", "kind", "run_id", "produced_at", "payload"],
  "properties": {
    "format_version": { "type": "string", "pattern": "^1\\.0$" },
    "kind": { "enum": ["statistics", "schema", "anomaly_report"] },
    "run_id": { "type": "string", "minLength": 1 },
    "produced_at": { "type": "string", "minLength": 1 },
    "payload": { "type": "object" }
  }
}"##;

const STATISTICS_SCHEMA: &str = r##"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "statguard feature statistics v1.0",
  "type": "object",
  "required": ["row_count", "features"],
  "properties": {
    "row_count": { "type": "integer", "minimum": 0 },
    "features": { "type": "array", "items": { "$ref": "#/$defs/feature" } }
  },
  "$defs": {
    "feature": {
      "type": "object",
      "required": ["name", "count", "missing_count", "feature_type"],
      "properties": {
        "name": { "type": "string" },
        "count": { "type": "integer", "minimum": 0 },
        "missing_count": { "type": "integer", "minimum": 0 },
        "feature_type": { "enum": ["numeric", "categorical", "string"] },
        "numeric": {
          "type": "object",
          "required": ["min", "max", "mean", "std_dev", "quantiles"],
          "properties": {
            "min": { "type": "number" },
            "max": { "type": "number" },
            "mean": { "type": "number" },
            "std_dev": { "type": "number", "minimum": 0 },
            "quantiles": { "type": "array", "items": { "type": "number" } }
          }
        },
        "categorical": {
          "type": "object",
          "required": ["distinct_count", "entries", "other_count"],
          "properties": {
            "distinct_count": { "type": "integer", "minimum": 0 },
            "entries": {
              "type": "array",
              "items": {
                "type": "object",
                "required": ["value", "count"],
                "properties": {
                  "value": { "type": "string" },
                  "count": { "type": "integer", "minimum": 0 }
                }
              }
            },
            "other_count": { "type": "integer", "minimum": 0 }
          }
        }
      }
    }
  }
}"##;

const SCHEMA_SCHEMA: &str = r##"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "statguard schema v1.0",
  "type": "object",
  "required": ["source_row_count", "new_features", "features"],
  "properties": {
    "source_row_count": { "type": "integer", "minimum": 0 },
    "new_features": { "enum": ["allow", "flag"] },
    "features": { "type": "array", "items": { "$ref": "#/$defs/constraint" } }
  },
  "$defs": {
    "fraction": { "type": "number", "minimum": 0, "maximum": 1 },
    "constraint": {
      "type": "object",
      "required": ["name", "feature_type", "presence"],
      "properties": {
        "name": { "type": "string" },
        "feature_type": { "enum": ["numeric", "categorical", "string"] },
        "presence": {
          "oneOf": [
            {
              "type": "object",
              "required": ["requirement"],
              "properties": { "requirement": { "const": "required" } }
            },
            {
              "type": "object",
              "required": ["requirement", "max_missing_fraction"],
              "properties": {
                "requirement": { "const": "optional" },
                "max_missing_fraction": { "$ref": "#/$defs/fraction" }
              }
            }
          ]
        },
        "range": {
          "type": "object",
          "required": ["min", "max"],
          "properties": {
            "min": { "type": "number" },
            "max": { "type": "number" }
          }
        },
        "domain": {
          "type": "object",
          "required": ["values", "open", "max_unknown_fraction"],
          "properties": {
            "values": { "type": "array", "items": { "type": "string" } },
            "open": { "type": "boolean" },
            "max_unknown_fraction": { "$ref": "#/$defs/fraction" }
          }
        }
      }
    }
  }
}"##;

const REPORT_SCHEMA: &str = r##"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "statguard anomaly report v1.0",
  "type": "object",
  "required": ["anomalies"],
  "properties": {
    "has_blocking_anomaly": { "type": "boolean" },
    "anomalies": {
      "type": "array",
      "items": {
        "type": "object",
        "required": ["kind", "severity", "description", "measured"],
        "properties": {
          "feature": { "type": "string" },
          "kind": {
            "enum": [
              "FEATURE_MISSING", "TYPE_MISMATCH", "UNEXPECTED_MISSING", "OUT_OF_RANGE",
              "UNEXPECTED_VALUE", "NEW_FEATURE", "EMPTY_DATASET", "DRIFT"
            ]
          },
          "severity": { "enum": ["warning", "error"] },
          "description": { "type": "string" },
          "measured": {
            "type": "object",
            "required": ["type"],
            "properties": { "type": { "type": "string" } }
          }
        }
      }
    }
  }
}"##;

type Compiled = std::result::Result<Validator, String>;

static ENVELOPE: OnceLock<Compiled> = OnceLock::new();
static STATISTICS: OnceLock<Compiled> = OnceLock::new();
static SCHEMA: OnceLock<Compiled> = OnceLock::new();
static REPORT: OnceLock<Compiled> = OnceLock::new();

fn compile(source: &str) -> Compiled {
    let schema: Value = serde_json::from_str(source)
        .map_err(|e| format!("failed to parse embedded schema: {}", e))?;
    jsonschema::validator_for(&schema).map_err(|e| format!("schema compilation error: {}", e))
}

fn compiled(cell: &'static OnceLock<Compiled>, source: &str) -> Result<&'static Validator, DocumentError> {
    cell.get_or_init(|| compile(source))
        .as_ref()
        .map_err(|message| DocumentError::SchemaCompilation {
            message: message.clone(),
        })
}

fn payload_validator(kind: ArtifactKind) -> Result<&'static Validator, DocumentError> {
    match kind {
        ArtifactKind::Statistics => compiled(&STATISTICS, STATISTICS_SCHEMA),
        ArtifactKind::Schema => compiled(&SCHEMA, SCHEMA_SCHEMA),
        ArtifactKind::AnomalyReport => compiled(&REPORT, REPORT_SCHEMA),
    }
}

fn run(validator: &Validator, instance: &Value, scope: &str) -> Result<(), DocumentError> {
    let errors: Vec<String> = validator
        .iter_errors(instance)
        .map(|e| format!("{}: {}", scope, e))
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(DocumentError::ValidationFailed { errors })
    }
}

/// Checks the `format_version` field of a document.
pub fn check_format_version(document: &Value) -> Result<(), DocumentError> {
    let version = document
        .get("format_version")
        .and_then(Value::as_str)
        .ok_or_else(|| DocumentError::single("missing required field 'format_version'"))?;

    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(DocumentError::UnsupportedVersion {
            version: version.to_string(),
            supported: SUPPORTED_VERSIONS.iter().map(|s| s.to_string()).collect(),
        });
    }
    Ok(())
}

/// Checks a document against the envelope and the payload schema of
/// `expected`.
///
/// # Errors
/// Returns the first category of problem found: version, envelope shape,
/// kind, then payload shape.
pub fn check_document(document: &Value, expected: ArtifactKind) -> Result<(), DocumentError> {
    check_format_version(document)?;
    run(compiled(&ENVELOPE, ENVELOPE_SCHEMA)?, document, "envelope")?;

    let found = document
        .get("kind")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if found != expected.to_string() {
        return Err(DocumentError::KindMismatch {
            expected,
            found: found.to_string(),
        });
    }

    let payload = document.get("payload").unwrap_or(&Value::Null);
    run(payload_validator(expected)?, payload, "payload")?;

    if expected == ArtifactKind::AnomalyReport {
        check_blocking_flag(payload)?;
    }
    Ok(())
}

/// A stored `has_blocking_anomaly` must agree with the anomalies.
fn check_blocking_flag(report: &Value) -> Result<(), DocumentError> {
    let Some(stored) = report.get("has_blocking_anomaly").and_then(Value::as_bool) else {
        return Ok(());
    };
    let derived = report
        .get("anomalies")
        .and_then(Value::as_array)
        .is_some_and(|anomalies| {
            anomalies
                .iter()
                .any(|a| a.get("severity").and_then(Value::as_str) == Some("error"))
        });
    if stored != derived {
        return Err(DocumentError::single(format!(
            "has_blocking_anomaly is {} but anomalies imply {}",
            stored, derived
        )));
    }
    Ok(())
}

/// Returns the embedded payload schema for `kind`, for external tooling.
pub fn payload_schema_definition(kind: ArtifactKind) -> crate::Result<Value> {
    let source = match kind {
        ArtifactKind::Statistics => STATISTICS_SCHEMA,
        ArtifactKind::Schema => SCHEMA_SCHEMA,
        ArtifactKind::AnomalyReport => REPORT_SCHEMA,
    };
    serde_json::from_str(source)
        .map_err(|e| StatguardError::serialization("embedded payload schema", e))
}
