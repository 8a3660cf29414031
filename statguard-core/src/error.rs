//! Error types for the statistics and validation engine.
//!
//! Detected data deviations are never errors: they are returned as
//! [`Anomaly`](crate::validation::Anomaly) records inside a report. The
//! variants here cover malformed inputs, configuration problems and artifact
//! I/O, and each entry point either returns a complete result or one of these
//! errors with no side effects.

use thiserror::Error;

/// Main error type for statguard operations.
#[derive(Debug, Error)]
pub enum StatguardError {
    /// Malformed dataset, schema, statistics or persisted document.
    ///
    /// Not retryable: the same input fails the same way every time.
    #[error("Structural input error: {context}")]
    StructuralInput { context: String },

    /// The dataset has no columns at all.
    #[error("Dataset has no columns")]
    EmptyDataset,

    /// Configuration or validation error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Binary artifact encoding or decoding failed
    #[error("Artifact codec error: {context}")]
    Codec { context: String },
}

/// Convenience type alias for Results with StatguardError
pub type Result<T> = std::result::Result<T, StatguardError>;

impl StatguardError {
    /// Creates a structural input error with context
    pub fn structural(context: impl Into<String>) -> Self {
        Self::StructuralInput {
            context: context.into(),
        }
    }

    /// Creates a structural input error for a specific feature.
    ///
    /// # Arguments
    /// * `feature` - Name of the offending feature
    /// * `problem` - What is wrong with it
    pub fn malformed_feature(feature: &str, problem: impl std::fmt::Display) -> Self {
        Self::StructuralInput {
            context: format!("feature '{}': {}", feature, problem),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a serialization error with context
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    /// Creates a codec error
    pub fn codec(context: impl Into<String>) -> Self {
        Self::Codec {
            context: context.into(),
        }
    }

    /// Returns true if the error was caused by the input itself rather than
    /// the environment.
    ///
    /// Callers use this to decide whether retrying the stage can help.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::StructuralInput { .. } | Self::EmptyDataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = StatguardError::configuration("top_k must be positive");
        assert!(error.to_string().contains("top_k must be positive"));

        let error = StatguardError::structural("column lengths differ");
        assert!(error.to_string().contains("column lengths differ"));
    }

    #[test]
    fn test_malformed_feature_names_feature() {
        let error = StatguardError::malformed_feature("rating", "min 5 exceeds max 1");
        let message = error.to_string();
        assert!(message.contains("'rating'"));
        assert!(message.contains("min 5 exceeds max 1"));
    }

    #[test]
    fn test_input_error_classification() {
        assert!(StatguardError::EmptyDataset.is_input_error());
        assert!(StatguardError::structural("bad").is_input_error());
        assert!(!StatguardError::configuration("bad").is_input_error());
        assert!(!StatguardError::codec("bad").is_input_error());

        let io = StatguardError::Io {
            context: "read schema".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(!io.is_input_error());
    }

    #[test]
    fn test_empty_dataset_message() {
        assert_eq!(
            StatguardError::EmptyDataset.to_string(),
            "Dataset has no columns"
        );
    }
}
