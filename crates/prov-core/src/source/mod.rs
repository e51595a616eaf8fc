//! Contrato de carga de registros.
//!
//! `RecordSource` es el único punto de contacto entre el core y el formato
//! en disco. Implementaciones: `InMemoryRecordSource` (tests, fixtures) y
//! `prov_archive::ArchiveRecordSource` (archivo extraído).

mod memory;

pub use memory::InMemoryRecordSource;

use crate::errors::CoreError;
use crate::model::{ArtifactId, ProvenanceRecord};

/// Registro cargado junto con los identificadores de los que depende.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedRecord {
    pub record: ProvenanceRecord<ArtifactId>,
    /// Ids no nulos referenciados por los inputs, en orden de slot. Los
    /// parámetros de metadata nunca aparecen aquí.
    pub dependencies: Vec<ArtifactId>,
}

impl LoadedRecord {
    /// Construye el registro derivando las dependencias de sus inputs.
    pub fn from_record(record: ProvenanceRecord<ArtifactId>) -> Self {
        let dependencies = record.dependencies();
        Self { record, dependencies }
    }
}

pub trait RecordSource {
    /// Carga el registro que produjo `id`.
    fn load(&self, id: &ArtifactId) -> Result<LoadedRecord, CoreError>;
}

