//! Artifact and configuration file handling.
//!
//! The engine never touches the filesystem, so reading and writing persisted
//! statistics, schemas and reports happens here. The encoding of an artifact
//! follows its file extension: `.sgb` is binary, anything else pretty JSON.

use std::path::Path;

use statguard_core::artifact::{self, Artifact, ArtifactFormat, Payload};
use statguard_core::{EngineConfig, Result, StatguardError};
use tracing::{debug, info};

/// Reads a whole file.
pub async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| StatguardError::Io {
        context: format!("Failed to read {}", path.display()),
        source: e,
    })
}

/// Writes a whole file, replacing any previous content.
pub async fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    tokio::fs::write(path, content)
        .await
        .map_err(|e| StatguardError::Io {
            context: format!("Failed to write to {}", path.display()),
            source: e,
        })
}

/// Saves an artifact in the given format.
pub async fn save_artifact<T: Payload>(
    artifact: &Artifact<T>,
    path: &Path,
    format: ArtifactFormat,
) -> Result<()> {
    let bytes = artifact::encode(artifact, format)?;
    write_file(path, &bytes).await?;
    info!(
        "Saved {} artifact to {} ({:?}, {} bytes)",
        T::KIND,
        path.display(),
        format,
        bytes.len()
    );
    Ok(())
}

/// Saves an artifact in the format implied by the file extension.
pub async fn save_artifact_by_extension<T: Payload>(
    artifact: &Artifact<T>,
    path: &Path,
) -> Result<()> {
    save_artifact(artifact, path, ArtifactFormat::from_path(path)).await
}

/// Loads and checks an artifact of either format.
///
/// # Errors
/// Returns an I/O error if the file cannot be read and a structural or codec
/// error if it is not a valid artifact of kind `T`.
pub async fn load_artifact<T: Payload>(path: &Path) -> Result<Artifact<T>> {
    let bytes = read_file(path).await?;
    let artifact = artifact::decode::<T>(&bytes).map_err(|e| match e {
        StatguardError::StructuralInput { context } => {
            StatguardError::structural(format!("{}: {}", path.display(), context))
        }
        other => other,
    })?;
    debug!("Loaded {} artifact from {}", T::KIND, path.display());
    Ok(artifact)
}

/// Loads the engine configuration, or the defaults when no file is given.
pub async fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        debug!("No configuration file given, using defaults");
        return Ok(EngineConfig::default());
    };

    let bytes = read_file(path).await?;
    let text = String::from_utf8(bytes).map_err(|e| {
        StatguardError::configuration(format!("{} is not valid UTF-8: {}", path.display(), e))
    })?;
    let config = EngineConfig::from_json_str(&text)?;
    info!("Loaded engine configuration from {}", path.display());
    Ok(config)
}
