//! Orquestación completa: archivo extraído -> scripts en disco.
//!
//! Todo se resuelve y renderiza en memoria antes de tocar el directorio de
//! salida: un error fatal no deja scripts a medio escribir.
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;
use prov_archive::{read_sidecar, ArchiveRecordSource};
use prov_core::config::identifier;
use prov_core::hashing::sequence_digest;
use prov_core::{resolve, ProvenanceRecord, RenamedSequence, Renamer, SyntaxConfig, WalkLimits};
use prov_render::{ApiRenderer, CliRenderer, ScriptRenderer};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::ReplayError;

/// Nombre del resultado final cuando la ruta de entrada no sugiere uno.
const DEFAULT_FINAL_STEM: &str = "result";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyntaxChoice {
    Cli,
    Api,
    #[default]
    All,
}

impl SyntaxChoice {
    pub fn includes_cli(self) -> bool { matches!(self, Self::Cli | Self::All) }

    pub fn includes_api(self) -> bool { matches!(self, Self::Api | Self::All) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOptions {
    pub syntax: SyntaxChoice,
    pub limits: WalkLimits,
    pub export_metadata: bool,
    pub cli_script: String,
    pub api_script: String,
    /// Nombre sin extensión del resultado final. `None`: se deriva de la
    /// ruta de entrada.
    pub final_stem: Option<String>,
}

impl ReplayOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self { syntax: SyntaxChoice::default(),
               limits: config.limits(),
               export_metadata: config.export_metadata,
               cli_script: config.cli_script.clone(),
               api_script: config.api_script.clone(),
               final_stem: None }
    }
}

impl Default for ReplayOptions {
    fn default() -> Self { Self::from_config(&AppConfig::default()) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    pub digest: String,
    /// Registros únicos en la secuencia reconstruida.
    pub commands: usize,
    /// Nombre de archivo asignado al artifact raíz.
    pub final_file: String,
    pub scripts: Vec<PathBuf>,
    pub metadata_files: Vec<PathBuf>,
}

/// Reconstruye los scripts del archivo en `input` y los escribe en `output`
/// (vacío o inexistente).
pub fn replay(input: &Path, output: &Path, options: &ReplayOptions) -> Result<ReplayReport, ReplayError> {
    check_output_dir(output)?;

    let source = ArchiveRecordSource::open(input)?;
    let root = source.root_id().clone();
    info!("replay: root={} type={}", root, source.layout().root_type());

    let sequence = resolve(&source, &root, options.limits)?;
    info!("replay: {} unique records", sequence.len());

    let stem = options.final_stem.clone().unwrap_or_else(|| default_stem(input));
    let final_file = format!("{stem}{}", source.layout().root_extension());

    let mut rendered: Vec<(&str, String)> = Vec::new();
    let mut renamed: Option<RenamedSequence> = None;
    if options.syntax.includes_cli() {
        let (_, cli) = Renamer::new(SyntaxConfig::CLI).rename(&sequence, &root, &final_file)?;
        rendered.push((options.cli_script.as_str(), CliRenderer::new().render(&cli)));
        renamed = Some(cli);
    }
    if options.syntax.includes_api() {
        let (_, api) = Renamer::new(SyntaxConfig::API).rename(&sequence, &root, &identifier(&stem))?;
        rendered.push((options.api_script.as_str(), ApiRenderer::new().saving_as(final_file.as_str()).render(&api)));
        renamed.get_or_insert(api);
    }
    let exports = match (&renamed, options.export_metadata) {
        (Some(seq), true) => collect_sidecars(seq)?,
        _ => BTreeMap::new(),
    };

    fs::create_dir_all(output).map_err(|e| ReplayError::io(output, e))?;
    let mut scripts = Vec::with_capacity(rendered.len());
    for (name, text) in &rendered {
        let path = output.join(name);
        write_new(&path, text)?;
        scripts.push(path);
    }
    let mut metadata_files = Vec::with_capacity(exports.len());
    for (relative, contents) in &exports {
        let path = output.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ReplayError::io(parent, e))?;
        }
        write_new(&path, contents)?;
        metadata_files.push(path);
    }
    info!("replay: wrote {} scripts and {} metadata files to {}",
          scripts.len(),
          metadata_files.len(),
          output.display());

    Ok(ReplayReport { digest: sequence_digest(&sequence),
                      commands: sequence.len(),
                      final_file,
                      scripts,
                      metadata_files })
}

/// El destino debe no existir o ser un directorio vacío.
fn check_output_dir(output: &Path) -> Result<(), ReplayError> {
    if !output.exists() {
        return Ok(());
    }
    if !output.is_dir() {
        return Err(ReplayError::OutputNotADirectory(output.to_path_buf()));
    }
    let mut entries = fs::read_dir(output).map_err(|e| ReplayError::io(output, e))?;
    if entries.next().is_some() {
        return Err(ReplayError::OutputDirNotEmpty(output.to_path_buf()));
    }
    Ok(())
}

/// Ruta relativa de exportación -> contenido (con header reparado si hizo falta).
fn collect_sidecars(sequence: &RenamedSequence) -> Result<BTreeMap<String, String>, ReplayError> {
    let mut exports = BTreeMap::new();
    for command in &sequence.commands {
        let ProvenanceRecord::Action(action) = &command.record else { continue };
        for md in &action.metadata {
            if !exports.contains_key(&md.file) {
                exports.insert(md.file.clone(), read_sidecar(&md.source_path)?.contents);
            }
        }
    }
    Ok(exports)
}

/// Nombre del directorio de entrada, salvo que sea el directorio `<uuid>/`
/// del propio archivo.
fn default_stem(input: &Path) -> String {
    let resolved = input.canonicalize().unwrap_or_else(|_| input.to_path_buf());
    resolved.file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| Uuid::parse_str(s).is_err())
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_FINAL_STEM.to_string())
}

fn write_new(path: &Path, contents: &str) -> Result<(), ReplayError> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path).map_err(|e| ReplayError::io(path, e))?;
    file.write_all(contents.as_bytes()).map_err(|e| ReplayError::io(path, e))
}
