//! Text and binary encodings of artifacts.
//!
//! The text form is pretty-printed JSON. The binary form is a 4-byte magic
//! followed by zstd-compressed compact JSON. Both decode through the same
//! document checks.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::{Result, StatguardError};

use super::envelope::{Artifact, Payload};
use super::structure::check_document;

/// Leading bytes of the binary form.
pub const BINARY_MAGIC: &[u8; 4] = b"SGB1";

/// File extension conventionally used for the binary form.
pub const BINARY_EXTENSION: &str = "sgb";

#[cfg(feature = "compression")]
const COMPRESSION_LEVEL: i32 = 3;

/// Encoding of a persisted artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// Pretty-printed JSON
    Text,
    /// Magic-prefixed zstd-compressed JSON
    Binary,
}

impl ArtifactFormat {
    /// Picks the format from a file extension: `.sgb` is binary, anything
    /// else is text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case(BINARY_EXTENSION) => ArtifactFormat::Binary,
            _ => ArtifactFormat::Text,
        }
    }

    /// Detects the format from content.
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(BINARY_MAGIC) {
            ArtifactFormat::Binary
        } else {
            ArtifactFormat::Text
        }
    }
}

/// Serializes an artifact as pretty JSON.
pub fn to_text<T: Payload>(artifact: &Artifact<T>) -> Result<String> {
    serde_json::to_string_pretty(artifact)
        .map_err(|e| StatguardError::serialization(format!("{} artifact", T::KIND), e))
}

/// Parses, checks and deserializes a text artifact.
///
/// # Errors
/// Returns a structural error if the document has the wrong shape, version
/// or kind, or if the payload fails its structural checks.
pub fn from_text<T: Payload>(text: &str) -> Result<Artifact<T>> {
    from_json_bytes(text.as_bytes())
}

fn from_json_bytes<T: Payload>(bytes: &[u8]) -> Result<Artifact<T>> {
    let document: Value = serde_json::from_slice(bytes)
        .map_err(|e| StatguardError::structural(format!("invalid JSON document: {}", e)))?;
    check_document(&document, T::KIND)?;

    let artifact: Artifact<T> = serde_json::from_value(document)
        .map_err(|e| StatguardError::structural(format!("malformed {} artifact: {}", T::KIND, e)))?;
    artifact.payload.check()?;

    debug!("Loaded {} artifact from run {}", T::KIND, artifact.run_id);
    Ok(artifact)
}

/// Serializes an artifact into the compressed binary form.
#[cfg(feature = "compression")]
pub fn to_binary<T: Payload>(artifact: &Artifact<T>) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(artifact)
        .map_err(|e| StatguardError::serialization(format!("{} artifact", T::KIND), e))?;
    let compressed = zstd::encode_all(json.as_slice(), COMPRESSION_LEVEL)
        .map_err(|e| StatguardError::codec(format!("compression failed: {}", e)))?;

    let mut bytes = Vec::with_capacity(BINARY_MAGIC.len() + compressed.len());
    bytes.extend_from_slice(BINARY_MAGIC);
    bytes.extend_from_slice(&compressed);
    debug!(
        "Encoded {} artifact: {} bytes JSON, {} bytes binary",
        T::KIND,
        json.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Decodes the compressed binary form.
///
/// # Errors
/// Returns a codec error for a bad magic or corrupt stream, then the same
/// errors as [`from_text`].
#[cfg(feature = "compression")]
pub fn from_binary<T: Payload>(bytes: &[u8]) -> Result<Artifact<T>> {
    let body = bytes
        .strip_prefix(BINARY_MAGIC.as_slice())
        .ok_or_else(|| StatguardError::codec("missing binary artifact magic"))?;
    let json = zstd::decode_all(body)
        .map_err(|e| StatguardError::codec(format!("decompression failed: {}", e)))?;
    from_json_bytes(&json)
}

/// Encodes an artifact in the given format.
pub fn encode<T: Payload>(artifact: &Artifact<T>, format: ArtifactFormat) -> Result<Vec<u8>> {
    match format {
        ArtifactFormat::Text => to_text(artifact).map(String::into_bytes),
        ArtifactFormat::Binary => binary_or_unavailable(artifact),
    }
}

/// Decodes an artifact of either format, detected from content.
pub fn decode<T: Payload>(bytes: &[u8]) -> Result<Artifact<T>> {
    match ArtifactFormat::detect(bytes) {
        ArtifactFormat::Text => from_json_bytes(bytes),
        ArtifactFormat::Binary => {
            #[cfg(feature = "compression")]
            {
                from_binary(bytes)
            }
            #[cfg(not(feature = "compression"))]
            {
                Err(StatguardError::configuration(
                    "Binary artifacts not available. Compile with --features compression",
                ))
            }
        }
    }
}

#[cfg(feature = "compression")]
fn binary_or_unavailable<T: Payload>(artifact: &Artifact<T>) -> Result<Vec<u8>> {
    to_binary(artifact)
}

#[cfg(not(feature = "compression"))]
fn binary_or_unavailable<T: Payload>(_artifact: &Artifact<T>) -> Result<Vec<u8>> {
    Err(StatguardError::configuration(
        "Binary artifacts not available. Compile with --features compression",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, Dataset};
    use crate::schema::{Schema, SchemaInferrer};
    use crate::stats::{FeatureStatistics, StatisticsComputer};
    use crate::validation::{AnomalyReport, Validator};

    fn statistics() -> FeatureStatistics {
        let dataset = Dataset::new(vec![
            Column::from_values("rating", [Some(1.0), Some(4.5), None, Some(0.1 + 0.2)]),
            Column::from_values("category", ["A", "B", "A", "C"]),
        ])
        .unwrap();
        StatisticsComputer::with_defaults().compute(&dataset).unwrap()
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ArtifactFormat::from_path(Path::new("stats.sgb")),
            ArtifactFormat::Binary
        );
        assert_eq!(
            ArtifactFormat::from_path(Path::new("stats.json")),
            ArtifactFormat::Text
        );
        assert_eq!(ArtifactFormat::from_path(Path::new("stats")), ArtifactFormat::Text);
    }

    #[test]
    fn test_statistics_text_roundtrip() {
        let artifact = Artifact::new(statistics());
        let text = to_text(&artifact).unwrap();
        let decoded: Artifact<FeatureStatistics> = from_text(&text).unwrap();
        assert_eq!(decoded, artifact);
    }

    #[test]
    fn test_schema_and_report_text_roundtrip() {
        let stats = statistics();
        let schema = SchemaInferrer::with_defaults().infer(&stats).unwrap();
        let schema_artifact = Artifact::new(schema);
        let decoded: Artifact<Schema> = from_text(&to_text(&schema_artifact).unwrap()).unwrap();
        assert_eq!(decoded, schema_artifact);

        let report = Validator::with_defaults()
            .validate(&stats, schema_artifact.payload())
            .unwrap();
        let report_artifact = Artifact::for_run(schema_artifact.run_id, report);
        let decoded: Artifact<AnomalyReport> =
            from_text(&to_text(&report_artifact).unwrap()).unwrap();
        assert_eq!(decoded, report_artifact);
    }

    #[test]
    fn test_text_is_pretty_json() {
        let text = to_text(&Artifact::new(AnomalyReport::default())).unwrap();
        assert!(text.contains('\n'));
        assert!(text.contains("\"has_blocking_anomaly\": false"));
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let text = to_text(&Artifact::new(statistics())).unwrap();
        assert!(matches!(
            from_text::<Schema>(&text),
            Err(StatguardError::StructuralInput { .. })
        ));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            from_text::<FeatureStatistics>("{ not json"),
            Err(StatguardError::StructuralInput { .. })
        ));
    }

    #[test]
    fn test_inconsistent_payload_rejected() {
        let mut artifact = Artifact::new(statistics());
        artifact.payload.features[0].missing_count = 99;
        let text = to_text(&artifact).unwrap();
        assert!(matches!(
            from_text::<FeatureStatistics>(&text),
            Err(StatguardError::StructuralInput { .. })
        ));
    }

    #[cfg(feature = "compression")]
    #[test]
    fn test_binary_roundtrip() {
        let artifact = Artifact::new(statistics());
        let bytes = to_binary(&artifact).unwrap();
        assert!(bytes.starts_with(BINARY_MAGIC));
        assert_eq!(ArtifactFormat::detect(&bytes), ArtifactFormat::Binary);

        let decoded: Artifact<FeatureStatistics> = from_binary(&bytes).unwrap();
        assert_eq!(decoded, artifact);
        assert_eq!(decode::<FeatureStatistics>(&bytes).unwrap(), artifact);
    }

    #[cfg(feature = "compression")]
    #[test]
    fn test_binary_corruption_detected() {
        let artifact = Artifact::new(statistics());
        let mut bytes = to_binary(&artifact).unwrap();

        assert!(matches!(
            from_binary::<FeatureStatistics>(&bytes[4..]),
            Err(StatguardError::Codec { .. })
        ));

        bytes.truncate(BINARY_MAGIC.len());
        bytes.extend_from_slice(b"not a zstd frame");
        assert!(matches!(
            from_binary::<FeatureStatistics>(&bytes),
            Err(StatguardError::Codec { .. })
        ));
    }

    #[test]
    fn test_encode_decode_by_format() {
        let artifact = Artifact::new(statistics());
        let text = encode(&artifact, ArtifactFormat::Text).unwrap();
        assert_eq!(decode::<FeatureStatistics>(&text).unwrap(), artifact);
    }
}
