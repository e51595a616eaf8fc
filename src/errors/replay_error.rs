use std::path::PathBuf;

use prov_archive::ArchiveError;
use prov_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),
    #[error("provenance error: {0}")]
    Core(#[from] CoreError),
    #[error("io error on {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error("output directory is not empty: {0}")]
    OutputDirNotEmpty(PathBuf),
    #[error("output path exists and is not a directory: {0}")]
    OutputNotADirectory(PathBuf),
}

impl ReplayError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prov_core::ArtifactId;

    #[test]
    fn core_variant_from() {
        let err: ReplayError = CoreError::CycleDetected(ArtifactId::from("a")).into();
        assert_eq!(err.to_string(), "provenance error: provenance cycle detected at artifact a");
    }

    #[test]
    fn io_variant_names_the_path() {
        let err = ReplayError::io("out/q2cli.sh", std::io::Error::other("disk full"));
        assert_eq!(err.to_string(), "io error on out/q2cli.sh: disk full");
    }

    #[test]
    fn output_dir_not_empty_format() {
        let err = ReplayError::OutputDirNotEmpty(PathBuf::from("out"));
        assert_eq!(err.to_string(), "output directory is not empty: out");
    }
}
