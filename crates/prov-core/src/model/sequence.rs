use serde::{Deserialize, Serialize};

use super::{ArtifactId, ProvenanceRecord};

/// Secuencia deduplicada en orden de construcción: cada registro aparece
/// después de todos los registros de los que depende.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandSequence {
    pub records: Vec<ProvenanceRecord<ArtifactId>>,
}

impl CommandSequence {
    pub fn new(records: Vec<ProvenanceRecord<ArtifactId>>) -> Self { Self { records } }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn iter(&self) -> std::slice::Iter<'_, ProvenanceRecord<ArtifactId>> { self.records.iter() }

    /// Posición del registro que produce `id`, si existe.
    pub fn producer_of(&self, id: &ArtifactId) -> Option<usize> {
        self.records.iter().position(|r| r.outputs().contains(&id))
    }
}

/// Un registro ya renombrado, listo para renderizar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Label base de la ejecución (`demux-summarize_1`) o, para imports, el
    /// nombre asignado al artifact importado.
    pub label: String,
    pub record: ProvenanceRecord<String>,
}

/// Resultado del renamer para una sintaxis concreta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenamedSequence {
    pub commands: Vec<Command>,
    /// Nombre forzado del artifact final.
    pub final_name: String,
    /// Digest de la `CommandSequence` de origen (independiente de la sintaxis).
    pub digest: String,
}
