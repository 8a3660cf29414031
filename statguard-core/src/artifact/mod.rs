//! Persisted forms of statistics, schemas and anomaly reports.
//!
//! Each output is wrapped in a versioned [`Artifact`] envelope. Loading
//! checks the document against an embedded JSON Schema and the in-memory
//! structural rules before anything reaches the engine.
//!
//! # Example
//! ```rust
//! use statguard_core::artifact::{Artifact, from_text, to_text};
//! use statguard_core::validation::AnomalyReport;
//!
//! let artifact = Artifact::new(AnomalyReport::default());
//! let text = to_text(&artifact)?;
//! let loaded: Artifact<AnomalyReport> = from_text(&text)?;
//! assert_eq!(loaded, artifact);
//! # Ok::<(), statguard_core::StatguardError>(())
//! ```

mod codec;
mod envelope;
mod structure;

#[cfg(feature = "compression")]
pub use codec::{from_binary, to_binary};
pub use codec::{
    ArtifactFormat, BINARY_EXTENSION, BINARY_MAGIC, decode, encode, from_text, to_text,
};
pub use envelope::{Artifact, ArtifactKind, FORMAT_VERSION, Payload, SUPPORTED_VERSIONS};
pub use structure::{
    DocumentError, check_document, check_format_version, payload_schema_definition,
};
