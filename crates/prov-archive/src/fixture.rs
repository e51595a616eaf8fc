//! Escritura de archivos extraídos sintéticos para tests.
//!
//! Genera el mismo layout y los mismos tags YAML que un archivo real, con
//! sólo los campos que lee el loader (más algo de ruido: `runtime`,
//! `citations`, `website`).

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

/// Archivo extraído en `<parent>/<root_id>/`.
#[derive(Debug, Clone)]
pub struct ArchiveFixture {
    root: PathBuf,
    root_id: String,
}

/// Descripción de un `action.yaml` no-import.
#[derive(Debug, Clone, Default)]
pub struct ActionSpec {
    execution_id: String,
    plugin: String,
    action: String,
    inputs: Vec<(String, InputValue)>,
    parameters: Vec<(String, String)>,
    output_name: Option<String>,
    plugins: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
enum InputValue {
    Null,
    One(String),
    Many(Vec<Option<String>>),
}

impl ActionSpec {
    pub fn new(execution_id: &str, plugin: &str, action: &str) -> Self {
        Self { execution_id: execution_id.to_string(),
               plugin: plugin.to_string(),
               action: action.to_string(),
               plugins: vec![(plugin.to_string(), "2019.1.0".to_string())],
               ..Self::default() }
    }

    pub fn input(mut self, slot: &str, id: &str) -> Self {
        self.inputs.push((slot.to_string(), InputValue::One(id.to_string())));
        self
    }

    pub fn null_input(mut self, slot: &str) -> Self {
        self.inputs.push((slot.to_string(), InputValue::Null));
        self
    }

    /// Slot colección; `None` se escribe como `null`.
    pub fn input_list(mut self, slot: &str, ids: &[Option<&str>]) -> Self {
        let ids = ids.iter().map(|id| id.map(str::to_string)).collect();
        self.inputs.push((slot.to_string(), InputValue::Many(ids)));
        self
    }

    /// `raw_yaml` se escribe tal cual (`10000`, `true`, `null`, `'text'`).
    pub fn param(mut self, name: &str, raw_yaml: &str) -> Self {
        self.parameters.push((name.to_string(), raw_yaml.to_string()));
        self
    }

    /// Parámetro `!metadata`; `reference` puede incluir prefijo `uuid:`.
    pub fn metadata_param(self, name: &str, reference: &str) -> Self {
        let raw = format!("!metadata '{reference}'");
        self.param(name, &raw)
    }

    pub fn output(mut self, name: &str) -> Self {
        self.output_name = Some(name.to_string());
        self
    }

    /// Reemplaza la versión del plugin principal o agrega otro.
    pub fn plugin(mut self, name: &str, version: &str) -> Self {
        match self.plugins.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = version.to_string(),
            None => self.plugins.push((name.to_string(), version.to_string())),
        }
        self
    }

    fn to_yaml(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "execution:\n    uuid: {}\n    runtime:\n        start: 2019-01-01T00:00:00", self.execution_id);
        let _ = writeln!(out, "action:\n    type: method");
        let _ = writeln!(out, "    plugin: !ref 'environment:plugins:{}'", self.plugin);
        let _ = writeln!(out, "    action: {}", self.action);
        if self.inputs.is_empty() {
            let _ = writeln!(out, "    inputs: []");
        } else {
            let _ = writeln!(out, "    inputs:");
            for (slot, value) in &self.inputs {
                let rendered = match value {
                    InputValue::Null => "null".to_string(),
                    InputValue::One(id) => id.clone(),
                    InputValue::Many(ids) => {
                        let items: Vec<&str> = ids.iter().map(|id| id.as_deref().unwrap_or("null")).collect();
                        format!("[{}]", items.join(", "))
                    }
                };
                let _ = writeln!(out, "    -   {slot}: {rendered}");
            }
        }
        if self.parameters.is_empty() {
            let _ = writeln!(out, "    parameters: []");
        } else {
            let _ = writeln!(out, "    parameters:");
            for (name, raw) in &self.parameters {
                let _ = writeln!(out, "    -   {name}: {raw}");
            }
        }
        if let Some(name) = &self.output_name {
            let _ = writeln!(out, "    output-name: {name}");
        }
        let _ = writeln!(out, "    citations:\n    - !cite 'action|{}:2019.1.0|{}|0'", self.plugin, self.action);
        let _ = writeln!(out, "environment:\n    framework:\n        version: 2019.1.0\n    plugins:");
        for (name, version) in &self.plugins {
            let _ = writeln!(out, "        {name}:\n            version: {version}\n            website: https://example.org/{name}");
        }
        out
    }
}

impl ArchiveFixture {
    /// Crea `<parent>/<root_id>/` con su `metadata.yaml` y el directorio
    /// `provenance/`. El `action.yaml` raíz se agrega aparte.
    pub fn create(parent: &Path, root_id: &str, root_type: &str) -> io::Result<Self> {
        let root = parent.join(root_id);
        std::fs::create_dir_all(root.join("provenance"))?;
        let fixture = Self { root, root_id: root_id.to_string() };
        let metadata = artifact_metadata(root_id, root_type);
        std::fs::write(fixture.root.join("metadata.yaml"), &metadata)?;
        std::fs::write(fixture.root.join("provenance").join("metadata.yaml"), &metadata)?;
        Ok(fixture)
    }

    pub fn root(&self) -> &Path { &self.root }

    pub fn root_id(&self) -> &str { &self.root_id }

    fn record_dir(&self, id: &str) -> PathBuf {
        let provenance = self.root.join("provenance");
        if id == self.root_id { provenance } else { provenance.join("artifacts").join(id) }
    }

    fn write_record(&self, id: &str, artifact_type: &str, action_yaml: &str) -> io::Result<()> {
        let dir = self.record_dir(id);
        std::fs::create_dir_all(dir.join("action"))?;
        std::fs::write(dir.join("metadata.yaml"), artifact_metadata(id, artifact_type))?;
        std::fs::write(dir.join("action").join("action.yaml"), action_yaml)
    }

    /// Import; `manifest` lista los archivos ingeridos.
    pub fn add_import(&self, id: &str, execution_id: &str, artifact_type: &str, format: &str, manifest: &[&str])
                      -> io::Result<()> {
        let mut yaml = String::new();
        let _ = writeln!(yaml, "execution:\n    uuid: {execution_id}\naction:\n    type: import\n    format: {format}");
        if manifest.is_empty() {
            let _ = writeln!(yaml, "    manifest: []");
        } else {
            let _ = writeln!(yaml, "    manifest:");
            for name in manifest {
                let _ = writeln!(yaml, "    -   name: {name}\n        md5sum: 0123456789abcdef");
            }
        }
        let _ = writeln!(yaml, "environment:\n    framework:\n        version: 2019.1.0");
        self.write_record(id, artifact_type, &yaml)
    }

    pub fn add_action(&self, id: &str, artifact_type: &str, spec: &ActionSpec) -> io::Result<()> {
        self.write_record(id, artifact_type, &spec.to_yaml())
    }

    /// Escribe un sidecar junto al `action.yaml` de `id`.
    pub fn add_sidecar(&self, id: &str, file_name: &str, contents: &str) -> io::Result<()> {
        let dir = self.record_dir(id).join("action");
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join(file_name), contents)
    }

    /// Escribe un `metadata.yaml` con otro uuid (archivos antiguos).
    pub fn override_metadata_uuid(&self, id: &str, artifact_type: &str, uuid: &str) -> io::Result<()> {
        std::fs::write(self.record_dir(id).join("metadata.yaml"), artifact_metadata(uuid, artifact_type))
    }
}

fn artifact_metadata(uuid: &str, artifact_type: &str) -> String {
    format!("uuid: {uuid}\ntype: {artifact_type}\nformat: null\n")
}
