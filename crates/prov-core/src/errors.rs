//! Errores del core.

use thiserror::Error;

use crate::model::ArtifactId;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no provenance record for artifact {0}")] MissingRecord(ArtifactId),
    #[error("provenance cycle detected at artifact {0}")] CycleDetected(ArtifactId),
    #[error("walk limit exceeded: {0}")] WalkLimitExceeded(String),
    #[error("artifact {0} is referenced but was never named")] UnknownReference(ArtifactId),
    #[error("record source: {0}")] Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl CoreError {
    /// Envuelve un error de una implementación externa de `RecordSource`.
    pub fn from_source<E>(err: E) -> Self
        where E: std::error::Error + Send + Sync + 'static
    {
        Self::Source(Box::new(err))
    }
}
