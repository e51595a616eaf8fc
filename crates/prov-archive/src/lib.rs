//! prov-archive
//!
//! Implementación en disco de `prov_core::RecordSource` sobre un archivo de
//! resultados ya extraído (`<uuid>/metadata.yaml` + `<uuid>/provenance/`).
//!
//! Módulos:
//! - `layout`: ubicación de los documentos de cada artifact.
//! - `yaml`: carga de YAML y limpieza de tags (`!ref`, `!cite`, ...).
//! - `metadata`: inspección de sidecars TSV y recuperación de headers
//!   faltantes.
//! - `loader`: `ArchiveRecordSource`, traduce documentos a registros tipados.

pub mod error;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixture;
pub mod layout;
pub mod loader;
pub mod metadata;
pub mod yaml;

pub use error::ArchiveError;
pub use layout::ArchiveLayout;
pub use loader::ArchiveRecordSource;
pub use metadata::{read_sidecar, MetadataSidecar};
