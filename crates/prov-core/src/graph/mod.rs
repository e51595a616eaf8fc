//! Recorrido del grafo de provenance y deduplicación de ejecuciones.

mod dedup;
mod walker;

pub use dedup::finalize;
pub use walker::{walk, GraphWalker, WalkLimits};
