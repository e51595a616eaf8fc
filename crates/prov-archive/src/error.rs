//! Errores de lectura del archivo.
//! Se convierten a `CoreError` al cruzar el trait `RecordSource`.

use std::path::PathBuf;

use prov_core::{ArtifactId, CoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("io error on {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error("invalid yaml in {path}: {source}")]
    Yaml { path: PathBuf, #[source] source: serde_yaml::Error },
    #[error("missing field `{field}` in {path}")]
    MissingField { path: PathBuf, field: String },
    #[error("malformed field `{field}` in {path}: {reason}")]
    MalformedField { path: PathBuf, field: String, reason: String },
    #[error("no provenance record for artifact {id} (expected {path})")]
    MissingRecord { id: ArtifactId, path: PathBuf },
    #[error("unrecognized ID column name `{found}` in metadata {path}")]
    UnrecognizedIdHeader { path: PathBuf, found: String },
    #[error("metadata {path} has no header or data rows")]
    EmptyMetadata { path: PathBuf },
    #[error("{path} is not an extracted archive: {reason}")]
    NotAnArchive { path: PathBuf, reason: String },
}

impl ArchiveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

impl From<ArchiveError> for CoreError {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::MissingRecord { id, .. } => CoreError::MissingRecord(id),
            other => CoreError::from_source(other),
        }
    }
}
