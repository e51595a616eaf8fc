//! Recorrido del grafo de dependencias con pila explícita.
//!
//! El orden producido equivale a un DFS en pre-orden (registro, luego el
//! subárbol de cada dependencia en orden de slot) invertido: cada registro
//! queda después de todo lo que necesita. Un diamante se recorre una vez por
//! camino; los duplicados se eliminan en `finalize`.
//!
//! Invariantes:
//! - Un id que ya está en el camino actual es un ciclo (`CycleDetected`).
//! - `WalkLimits` acota profundidad y cantidad de registros emitidos.
use std::collections::HashMap;

use log::debug;

use crate::errors::CoreError;
use crate::model::{ArtifactId, ProvenanceRecord};
use crate::source::{LoadedRecord, RecordSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkLimits {
    /// Longitud máxima de una cadena de dependencias (raíz = profundidad 0).
    pub max_depth: usize,
    /// Cantidad máxima de registros emitidos, duplicados incluidos.
    pub max_records: usize,
}

impl Default for WalkLimits {
    fn default() -> Self {
        Self { max_depth: 4096,
               max_records: 1_000_000 }
    }
}

pub struct GraphWalker<'a, S: RecordSource + ?Sized> {
    source: &'a S,
    limits: WalkLimits,
    cache: HashMap<ArtifactId, LoadedRecord>,
}

impl<'a, S: RecordSource + ?Sized> GraphWalker<'a, S> {
    pub fn new(source: &'a S, limits: WalkLimits) -> Self {
        Self { source,
               limits,
               cache: HashMap::new() }
    }

    /// Devuelve los registros en orden de construcción, con duplicados.
    pub fn walk(&mut self, root: &ArtifactId) -> Result<Vec<ProvenanceRecord>, CoreError> {
        let mut stack: Vec<(ArtifactId, usize)> = vec![(root.clone(), 0)];
        // path[d] = ancestro a profundidad d del registro en curso
        let mut path: Vec<ArtifactId> = Vec::new();
        let mut preorder: Vec<ProvenanceRecord> = Vec::new();

        while let Some((id, depth)) = stack.pop() {
            path.truncate(depth);
            if path.contains(&id) {
                return Err(CoreError::CycleDetected(id));
            }
            if depth > self.limits.max_depth {
                return Err(CoreError::WalkLimitExceeded(format!("depth {} exceeds max_depth {} at artifact {}",
                                                                depth, self.limits.max_depth, id)));
            }
            if preorder.len() >= self.limits.max_records {
                return Err(CoreError::WalkLimitExceeded(format!("more than {} records reached",
                                                                self.limits.max_records)));
            }

            let loaded = self.load_cached(&id)?;
            debug!("walk: artifact={} depth={} deps={}", id, depth, loaded.dependencies.len());
            // Apilar en orden inverso para desapilar en orden de slot.
            for dep in loaded.dependencies.iter().rev() {
                stack.push((dep.clone(), depth + 1));
            }
            path.push(id);
            preorder.push(loaded.record);
        }

        preorder.reverse();
        Ok(preorder)
    }

    fn load_cached(&mut self, id: &ArtifactId) -> Result<LoadedRecord, CoreError> {
        if let Some(hit) = self.cache.get(id) {
            return Ok(hit.clone());
        }
        let loaded = self.source.load(id)?;
        self.cache.insert(id.clone(), loaded.clone());
        Ok(loaded)
    }
}

/// Atajo para un recorrido único.
pub fn walk<S>(source: &S, root: &ArtifactId, limits: WalkLimits) -> Result<Vec<ProvenanceRecord>, CoreError>
    where S: RecordSource + ?Sized
{
    GraphWalker::new(source, limits).walk(root)
}
