//! Modelos neutrales: identificadores, registros de provenance y secuencias.

pub mod artifact_id;
pub mod record;
pub mod sequence;

pub use artifact_id::ArtifactId;
pub use record::{ActionRecord, DedupKey, ImportRecord, InputRef, MetadataKind, MetadataRef, OutputRef, Parameter,
                 ProvenanceRecord};
pub use sequence::{Command, CommandSequence, RenamedSequence};
