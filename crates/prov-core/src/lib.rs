//! prov-core: reconstrucción determinista de scripts a partir de provenance.
//!
//! El pipeline es lineal: `RecordSource` -> `GraphWalker` -> `finalize`
//! (dedup) -> `Renamer` -> renderers (crate `prov-render`). Este crate no
//! conoce el formato en disco del archivo; sólo consume registros ya
//! tipados a través del trait `RecordSource`.
pub mod config;
pub mod constants;
pub mod errors;
pub mod graph;
pub mod hashing;
pub mod model;
pub mod rename;
pub mod source;

pub use config::{BooleanStyle, OutputNaming, SyntaxConfig, WordSeparator};
pub use errors::CoreError;
pub use graph::{finalize, walk, GraphWalker, WalkLimits};
pub use model::{ActionRecord, ArtifactId, Command, CommandSequence, ImportRecord, InputRef, MetadataKind, MetadataRef,
                OutputRef, Parameter, ProvenanceRecord, RenamedSequence};
pub use rename::{RenameTable, Renamer};
pub use source::{InMemoryRecordSource, LoadedRecord, RecordSource};

/// Ejecuta walk + dedup sobre una fuente y devuelve la secuencia final.
pub fn resolve<S>(source: &S, root: &ArtifactId, limits: WalkLimits) -> Result<CommandSequence, CoreError>
    where S: RecordSource + ?Sized
{
    let duplicated = walk(source, root, limits)?;
    Ok(finalize(duplicated))
}
