use std::cell::Cell;
use std::collections::HashMap;

use super::{LoadedRecord, RecordSource};
use crate::errors::CoreError;
use crate::model::{ArtifactId, ProvenanceRecord};

/// Fuente en memoria indexada por artifact. Cuenta las cargas para que los
/// tests puedan verificar el cache del walker.
#[derive(Debug, Default)]
pub struct InMemoryRecordSource {
    pub inner: HashMap<ArtifactId, LoadedRecord>,
    loads: Cell<usize>,
}

impl InMemoryRecordSource {
    pub fn new() -> Self { Self::default() }

    /// Registra el registro que produjo `id`; las dependencias salen de sus inputs.
    pub fn insert(&mut self, id: impl Into<ArtifactId>, record: ProvenanceRecord) {
        self.inner.insert(id.into(), LoadedRecord::from_record(record));
    }

    /// Variante builder de `insert`.
    pub fn with(mut self, id: impl Into<ArtifactId>, record: ProvenanceRecord) -> Self {
        self.insert(id, record);
        self
    }

    pub fn load_count(&self) -> usize { self.loads.get() }
}

impl RecordSource for InMemoryRecordSource {
    fn load(&self, id: &ArtifactId) -> Result<LoadedRecord, CoreError> {
        self.loads.set(self.loads.get() + 1);
        self.inner.get(id).cloned().ok_or_else(|| CoreError::MissingRecord(id.clone()))
    }
}
