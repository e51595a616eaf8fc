//! Ubicación de documentos dentro de un archivo extraído.
//!
//! El artifact raíz guarda su provenance directamente en `provenance/`; el
//! resto en `provenance/artifacts/<uuid>/`.

use std::path::{Path, PathBuf};

use log::debug;
use prov_core::constants::{ARTIFACT_EXT, VISUALIZATION_EXT};
use prov_core::ArtifactId;
use uuid::Uuid;

use crate::error::ArchiveError;
use crate::yaml;

const METADATA_FILE: &str = "metadata.yaml";
const PROVENANCE_DIR: &str = "provenance";
const ARTIFACTS_DIR: &str = "artifacts";
const ACTION_DIR: &str = "action";
const ACTION_FILE: &str = "action.yaml";
const VISUALIZATION_TYPE: &str = "Visualization";

#[derive(Debug, Clone)]
pub struct ArchiveLayout {
    root: PathBuf,
    root_id: ArtifactId,
    /// `type` del artifact raíz (`Visualization`, `FeatureTable[Frequency]`, ...).
    root_type: String,
}

impl ArchiveLayout {
    /// Acepta el directorio `<uuid>/` extraído o su padre, si contiene un
    /// único subdirectorio con nombre UUID.
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        if path.is_file() {
            return Err(not_an_archive(path, "expected a directory; extract the archive first"));
        }
        let root = if is_archive_root(path) { path.to_path_buf() } else { find_uuid_child(path)? };
        let metadata_path = root.join(METADATA_FILE);
        let metadata = yaml::load(&metadata_path)?;
        let root_id = ArtifactId::new(yaml::require_str(&metadata, &["uuid"], &metadata_path)?);
        let root_type = yaml::require_str(&metadata, &["type"], &metadata_path)?;
        debug!("layout: root={} id={} type={}", root.display(), root_id, root_type);
        Ok(Self { root, root_id, root_type })
    }

    pub fn root(&self) -> &Path { &self.root }

    pub fn root_id(&self) -> &ArtifactId { &self.root_id }

    pub fn root_type(&self) -> &str { &self.root_type }

    /// Las visualizaciones se guardan como `.qzv`, el resto como `.qza`.
    pub fn root_extension(&self) -> &'static str {
        if self.root_type == VISUALIZATION_TYPE { VISUALIZATION_EXT } else { ARTIFACT_EXT }
    }

    pub fn is_root(&self, id: &ArtifactId) -> bool { id == &self.root_id }

    /// Directorio de provenance del artifact `id`.
    pub fn record_dir(&self, id: &ArtifactId) -> PathBuf {
        let provenance = self.root.join(PROVENANCE_DIR);
        if self.is_root(id) {
            provenance
        } else {
            provenance.join(ARTIFACTS_DIR).join(id.as_str())
        }
    }

    pub fn action_file(&self, id: &ArtifactId) -> PathBuf { self.record_dir(id).join(ACTION_DIR).join(ACTION_FILE) }

    pub fn metadata_file(&self, id: &ArtifactId) -> PathBuf { self.record_dir(id).join(METADATA_FILE) }

    /// Sidecar escrito junto al `action.yaml` (metadata TSV).
    pub fn sidecar(&self, id: &ArtifactId, file_name: &str) -> PathBuf {
        self.record_dir(id).join(ACTION_DIR).join(file_name)
    }
}

fn is_archive_root(path: &Path) -> bool {
    path.join(METADATA_FILE).is_file() && path.join(PROVENANCE_DIR).is_dir()
}

fn find_uuid_child(path: &Path) -> Result<PathBuf, ArchiveError> {
    let entries = std::fs::read_dir(path).map_err(|e| ArchiveError::io(path, e))?;
    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ArchiveError::io(path, e))?;
        let child = entry.path();
        let is_uuid = child.file_name()
                           .and_then(|n| n.to_str())
                           .map(|n| Uuid::parse_str(n).is_ok())
                           .unwrap_or(false);
        if is_uuid && is_archive_root(&child) {
            candidates.push(child);
        }
    }
    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        0 => Err(not_an_archive(path, "no metadata.yaml and no UUID-named archive directory")),
        n => Err(not_an_archive(path, &format!("{n} UUID-named archive directories found"))),
    }
}

fn not_an_archive(path: &Path, reason: &str) -> ArchiveError {
    ArchiveError::NotAnArchive { path: path.to_path_buf(), reason: reason.to_string() }
}
