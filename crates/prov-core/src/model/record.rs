//! Registros de provenance.
//!
//! Un registro describe cómo se produjo un artifact: un `Import` (ingesta de
//! datos crudos, sin dependencias) o un `Action` (ejecución de un plugin sobre
//! artifacts de entrada). Los registros son genéricos sobre el tipo de
//! referencia `R`: antes del renombrado apuntan a `ArtifactId`, después a
//! nombres legibles (`String`).
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ArtifactId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRecord<R = ArtifactId> {
    pub execution_id: String,
    pub input_path: String,
    pub input_format: String,
    pub declared_type: String,
    pub produced: R,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRef<R = ArtifactId> {
    pub name: String,
    pub artifact: R,
    /// El slot declara una lista (`- slot: [id, ...]`), aunque tenga un solo
    /// elemento. Los miembros de una colección son refs consecutivas con el
    /// mismo `name`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub collection: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRef<R = ArtifactId> {
    pub name: String,
    pub artifact: R,
}

/// Forma del sidecar de metadata detectada al cargar el registro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataKind {
    /// Exactamente una columna de datos: se pasa como columna (requiere nombre).
    Column,
    /// Tabla completa.
    Full,
}

/// Parámetro que apunta a un archivo de metadata, no a un artifact. Nunca
/// agrega aristas al grafo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRef {
    pub name: String,
    /// Ruta tal como aparecerá en el script (el renamer la reescribe).
    pub file: String,
    /// Ubicación del sidecar dentro del archivo extraído. No entra al digest.
    #[serde(skip)]
    pub source_path: PathBuf,
    pub kind: MetadataKind,
    /// El header fue sintetizado (archivos antiguos sin fila de header).
    pub repaired: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord<R = ArtifactId> {
    pub execution_id: String,
    pub plugin_name: String,
    pub plugin_versions: IndexMap<String, String>,
    pub action_name: String,
    pub inputs: Vec<InputRef<R>>,
    pub metadata: Vec<MetadataRef>,
    pub parameters: Vec<Parameter>,
    pub outputs: Vec<OutputRef<R>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProvenanceRecord<R = ArtifactId> {
    Import(ImportRecord<R>),
    Action(ActionRecord<R>),
}

/// Clave de deduplicación: las acciones colapsan por ejecución, los imports
/// por el artifact que producen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Execution(String),
    Import(ArtifactId),
}

impl<R> ProvenanceRecord<R> {
    pub fn execution_id(&self) -> &str {
        match self {
            Self::Import(imp) => &imp.execution_id,
            Self::Action(act) => &act.execution_id,
        }
    }

    pub fn is_import(&self) -> bool { matches!(self, Self::Import(_)) }

    /// Referencias producidas por el registro, en orden.
    pub fn outputs(&self) -> Vec<&R> {
        match self {
            Self::Import(imp) => vec![&imp.produced],
            Self::Action(act) => act.outputs.iter().map(|o| &o.artifact).collect(),
        }
    }

    /// Referencias consumidas por el registro, en orden de slot.
    pub fn inputs(&self) -> Vec<&R> {
        match self {
            Self::Import(_) => Vec::new(),
            Self::Action(act) => act.inputs.iter().map(|i| &i.artifact).collect(),
        }
    }

    /// Sustituye todas las referencias (inputs y outputs) usando `f`. El
    /// primer error corta la sustitución.
    pub fn try_map_refs<S, E, F>(&self, mut f: F) -> Result<ProvenanceRecord<S>, E>
        where F: FnMut(&R) -> Result<S, E>
    {
        match self {
            Self::Import(imp) => Ok(ProvenanceRecord::Import(ImportRecord { execution_id: imp.execution_id.clone(),
                                                                            input_path: imp.input_path.clone(),
                                                                            input_format: imp.input_format.clone(),
                                                                            declared_type: imp.declared_type.clone(),
                                                                            produced: f(&imp.produced)? })),
            Self::Action(act) => {
                let inputs = act.inputs
                                .iter()
                                .map(|i| Ok(InputRef { name: i.name.clone(),
                                                       artifact: f(&i.artifact)?,
                                                       collection: i.collection }))
                                .collect::<Result<Vec<_>, E>>()?;
                let outputs = act.outputs
                                 .iter()
                                 .map(|o| Ok(OutputRef { name: o.name.clone(),
                                                         artifact: f(&o.artifact)? }))
                                 .collect::<Result<Vec<_>, E>>()?;
                Ok(ProvenanceRecord::Action(ActionRecord { execution_id: act.execution_id.clone(),
                                                           plugin_name: act.plugin_name.clone(),
                                                           plugin_versions: act.plugin_versions.clone(),
                                                           action_name: act.action_name.clone(),
                                                           inputs,
                                                           metadata: act.metadata.clone(),
                                                           parameters: act.parameters.clone(),
                                                           outputs }))
            }
        }
    }
}

impl ProvenanceRecord<ArtifactId> {
    pub fn dedup_key(&self) -> DedupKey {
        match self {
            Self::Import(imp) => DedupKey::Import(imp.produced.clone()),
            Self::Action(act) => DedupKey::Execution(act.execution_id.clone()),
        }
    }

    /// Identificadores de los que depende el registro, en orden de slot. Un
    /// mismo id usado en dos slots aparece dos veces.
    pub fn dependencies(&self) -> Vec<ArtifactId> { self.inputs().into_iter().cloned().collect() }
}
