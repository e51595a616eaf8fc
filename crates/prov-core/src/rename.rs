//! Renombrado de identificadores a nombres legibles.
//!
//! Dos pasadas sobre la secuencia ya deduplicada:
//! 1. Asignación: cada ejecución recibe un ordinal por `(plugin, action)` y
//!    un label base; cada output todavía sin nombre recibe uno derivado del
//!    label. Los imports se nombran por su input_path. Al final, el artifact
//!    raíz se fuerza al nombre pedido por el usuario.
//! 2. Sustitución: todos los inputs y outputs pasan por la tabla completa. Un
//!    id puede aparecer como input antes de que su productor sea nombrado, por
//!    eso la sustitución no puede hacerse durante la primera pasada.
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use indexmap::IndexMap;
use log::info;

use crate::config::{identifier, SyntaxConfig};
use crate::constants::SCRIPT_MODULE;
use crate::errors::CoreError;
use crate::hashing::sequence_digest;
use crate::model::{ArtifactId, Command, CommandSequence, ProvenanceRecord, RenamedSequence};

/// Nombre final de cada identificador referenciado.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameTable {
    names: IndexMap<ArtifactId, String>,
}

impl RenameTable {
    pub fn get(&self, id: &ArtifactId) -> Option<&str> { self.names.get(id).map(String::as_str) }

    pub fn contains(&self, id: &ArtifactId) -> bool { self.names.contains_key(id) }

    pub fn len(&self) -> usize { self.names.len() }

    pub fn is_empty(&self) -> bool { self.names.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&ArtifactId, &str)> { self.names.iter().map(|(k, v)| (k, v.as_str())) }

    /// Asigna sólo si el id todavía no tiene nombre.
    fn assign(&mut self, id: &ArtifactId, name: impl FnOnce() -> String) {
        if !self.names.contains_key(id) {
            self.names.insert(id.clone(), name());
        }
    }

    fn force(&mut self, id: &ArtifactId, name: String) { self.names.insert(id.clone(), name); }
}

#[derive(Debug, Clone, Copy)]
pub struct Renamer {
    syntax: SyntaxConfig,
}

impl Renamer {
    pub fn new(syntax: SyntaxConfig) -> Self { Self { syntax } }

    pub fn rename(&self,
                  sequence: &CommandSequence,
                  final_id: &ArtifactId,
                  final_name: &str)
                  -> Result<(RenameTable, RenamedSequence), CoreError> {
        let mut table = RenameTable::default();
        let mut executions: HashMap<(&str, &str), usize> = HashMap::new();
        let mut import_paths: HashMap<&str, usize> = HashMap::new();
        let mut labels: Vec<(String, usize)> = Vec::with_capacity(sequence.len());
        let modules = script_modules(sequence);

        for record in sequence.iter() {
            match record {
                ProvenanceRecord::Action(act) => {
                    let ordinal = bump(&mut executions, (act.plugin_name.as_str(), act.action_name.as_str()));
                    let label = self.syntax.action_label(&act.plugin_name, &act.action_name, ordinal);
                    for output in &act.outputs {
                        table.assign(&output.artifact, || self.syntax.output_name(&label, &output.name));
                    }
                    labels.push((label, ordinal));
                }
                ProvenanceRecord::Import(imp) => {
                    let ordinal = bump(&mut import_paths, imp.input_path.as_str());
                    let name = self.syntax.unshadowed(self.syntax.import_name(&imp.input_path, ordinal), &modules);
                    table.assign(&imp.produced, || name.clone());
                    labels.push((name, ordinal));
                }
            }
        }
        let final_name = self.syntax.unshadowed(final_name.to_string(), &modules);
        table.force(final_id, final_name.clone());

        let mut commands = Vec::with_capacity(sequence.len());
        for (record, (label, ordinal)) in sequence.iter().zip(labels) {
            let mut renamed = record.try_map_refs(|id| {
                                        table.get(id)
                                             .map(str::to_string)
                                             .ok_or_else(|| CoreError::UnknownReference(id.clone()))
                                    })?;
            if let ProvenanceRecord::Action(act) = &mut renamed {
                for md in act.metadata.iter_mut() {
                    md.file = SyntaxConfig::metadata_path(&act.plugin_name, &act.action_name, ordinal, &md.file);
                }
            }
            commands.push(Command { label, record: renamed });
        }

        info!("rename[{}]: {} commands, {} names, final={}",
              self.syntax.name,
              commands.len(),
              table.len(),
              final_name);
        let renamed = RenamedSequence { commands,
                                        final_name,
                                        digest: sequence_digest(sequence) };
        Ok((table, renamed))
    }
}

/// Módulos Python que importa el script de la API: `qiime2` y un módulo por
/// plugin usado.
fn script_modules(sequence: &CommandSequence) -> HashSet<String> {
    let mut modules = HashSet::from([SCRIPT_MODULE.to_string()]);
    for record in sequence.iter() {
        if let ProvenanceRecord::Action(act) = record {
            modules.insert(identifier(&SyntaxConfig::API.param_name(&act.plugin_name)));
        }
    }
    modules
}

fn bump<K: Eq + Hash>(counter: &mut HashMap<K, usize>, key: K) -> usize {
    let n = counter.entry(key).or_insert(0);
    *n += 1;
    *n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActionRecord, ImportRecord, InputRef, MetadataKind, MetadataRef, OutputRef};
    use std::path::PathBuf;

    fn import(id: &str, path: &str) -> ProvenanceRecord {
        ProvenanceRecord::Import(ImportRecord { execution_id: format!("imp-{id}"),
                                                input_path: path.into(),
                                                input_format: "FastqFmt".into(),
                                                declared_type: "SampleData".into(),
                                                produced: id.into() })
    }

    fn action(exec: &str, plugin: &str, name: &str, inputs: &[&str], outputs: &[(&str, &str)]) -> ProvenanceRecord {
        ProvenanceRecord::Action(ActionRecord { execution_id: exec.into(),
                                                plugin_name: plugin.into(),
                                                plugin_versions: IndexMap::new(),
                                                action_name: name.into(),
                                                inputs: inputs.iter()
                                                              .map(|i| InputRef { name: "data".into(),
                                                                                  artifact: (*i).into(),
                                                                                  collection: false })
                                                              .collect(),
                                                metadata: vec![],
                                                parameters: vec![],
                                                outputs: outputs.iter()
                                                                .map(|(n, a)| OutputRef { name: (*n).into(),
                                                                                          artifact: (*a).into() })
                                                                .collect() })
    }

    fn two_node() -> CommandSequence {
        CommandSequence::new(vec![import("A", "seqs.fastq"),
                                  action("E1", "demux", "summarize", &["A"], &[("visualization", "B")])])
    }

    #[test]
    fn two_node_graph_cli_names() {
        let (table, renamed) = Renamer::new(SyntaxConfig::CLI).rename(&two_node(), &"B".into(), "result.qzv")
                                                              .unwrap();
        assert_eq!(table.get(&"A".into()), Some("seqs.fastq.qza"));
        assert_eq!(table.get(&"B".into()), Some("result.qzv"));
        assert_eq!(renamed.commands[1].label, "demux-summarize_1");
        assert_eq!(renamed.commands[1].record.inputs(), vec!["seqs.fastq.qza"]);
        assert_eq!(renamed.commands[1].record.outputs(), vec!["result.qzv"]);
    }

    #[test]
    fn two_node_graph_api_names() {
        let (table, renamed) = Renamer::new(SyntaxConfig::API).rename(&two_node(), &"B".into(), "result").unwrap();
        assert_eq!(table.get(&"A".into()), Some("seqs_fastq"));
        assert_eq!(renamed.commands[1].label, "demux_summarize_1");
        assert_eq!(renamed.commands[0].record.outputs(), vec!["seqs_fastq"]);
    }

    #[test]
    fn ordinals_count_per_plugin_action() {
        let seq = CommandSequence::new(vec![import("A", "seqs.fastq"),
                                            action("E1", "demux", "summarize", &["A"], &[("visualization", "B")]),
                                            action("E2", "demux", "summarize", &["A"], &[("visualization", "C")]),
                                            action("E3", "demux", "emp_single", &["A"], &[("per_sample_sequences",
                                                                                           "D")])]);
        let (table, renamed) = Renamer::new(SyntaxConfig::CLI).rename(&seq, &"C".into(), "final.qzv").unwrap();
        assert_eq!(table.get(&"B".into()), Some("demux-summarize_1/visualization.qzv"));
        assert_eq!(renamed.commands[2].label, "demux-summarize_2");
        assert_eq!(table.get(&"D".into()), Some("demux-emp-single_1/per_sample_sequences.qza"));
        assert_eq!(table.get(&"C".into()), Some("final.qzv"));
    }

    #[test]
    fn input_referenced_before_renaming_resolves() {
        // Cada referencia termina con un nombre legible, sin ids crudos.
        let seq = CommandSequence::new(vec![import("A", "seqs.fastq"),
                                            action("E1", "dada2", "denoise_single", &["A"], &[("table", "T"),
                                                                                              ("representative_sequences",
                                                                                               "R")]),
                                            action("E2", "feature_table", "summarize", &["T"], &[("visualization",
                                                                                                 "V")])]);
        let (table, renamed) = Renamer::new(SyntaxConfig::CLI).rename(&seq, &"V".into(), "out.qzv").unwrap();
        for cmd in &renamed.commands {
            for r in cmd.record.inputs().into_iter().chain(cmd.record.outputs()) {
                assert!(!["A", "T", "R", "V"].contains(&r.as_str()), "raw id leaked: {r}");
            }
        }
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn final_name_overrides_import_root() {
        let seq = CommandSequence::new(vec![import("A", "seqs.fastq")]);
        let (table, renamed) = Renamer::new(SyntaxConfig::CLI).rename(&seq, &"A".into(), "raw.qza").unwrap();
        assert_eq!(table.get(&"A".into()), Some("raw.qza"));
        assert_eq!(renamed.commands[0].record.outputs(), vec!["raw.qza"]);
    }

    #[test]
    fn duplicate_import_paths_get_distinct_names() {
        let seq = CommandSequence::new(vec![import("A", "seqs.fastq"), import("B", "seqs.fastq")]);
        let (table, _) = Renamer::new(SyntaxConfig::CLI).rename(&seq, &"Z".into(), "z.qza").unwrap();
        assert_eq!(table.get(&"A".into()), Some("seqs.fastq.qza"));
        assert_eq!(table.get(&"B".into()), Some("seqs.fastq_2.qza"));
    }

    #[test]
    fn api_names_do_not_shadow_imported_modules() {
        let seq = CommandSequence::new(vec![import("A", "demux"),
                                            import("Q", "qiime2"),
                                            action("E1", "demux", "summarize", &["A", "Q"], &[("visualization", "B")])]);
        let (table, _) = Renamer::new(SyntaxConfig::API).rename(&seq, &"B".into(), "summary").unwrap();
        assert_eq!(table.get(&"A".into()), Some("demux_artifact"));
        assert_eq!(table.get(&"Q".into()), Some("qiime2_artifact"));

        let plain = CommandSequence::new(vec![import("A", "seqs"),
                                              action("E1", "demux", "summarize", &["A"], &[("visualization", "B")])]);
        let (_, api) = Renamer::new(SyntaxConfig::API).rename(&plain, &"B".into(), "demux").unwrap();
        assert_eq!(api.final_name, "demux_artifact");

        let (cli, _) = Renamer::new(SyntaxConfig::CLI).rename(&seq, &"B".into(), "demux.qzv").unwrap();
        assert_eq!(cli.get(&"A".into()), Some("demux.qza"));
    }

    #[test]
    fn unknown_reference_is_an_error() {
        let seq = CommandSequence::new(vec![action("E1", "demux", "summarize", &["ghost"], &[("visualization",
                                                                                              "B")])]);
        let err = Renamer::new(SyntaxConfig::CLI).rename(&seq, &"B".into(), "r.qzv").unwrap_err();
        assert!(matches!(err, CoreError::UnknownReference(id) if id.as_str() == "ghost"));
    }

    #[test]
    fn metadata_files_point_at_export_location() {
        let mut rec = action("E1", "diversity", "core_metrics", &["A"], &[("rarefied_table", "B")]);
        if let ProvenanceRecord::Action(act) = &mut rec {
            act.metadata.push(MetadataRef { name: "metadata".into(),
                                            file: "sample_metadata.tsv".into(),
                                            source_path: PathBuf::from("/tmp/x/sample_metadata.tsv"),
                                            kind: MetadataKind::Full,
                                            repaired: false });
        }
        let seq = CommandSequence::new(vec![import("A", "table.biom"), rec]);
        let (_, api) = Renamer::new(SyntaxConfig::API).rename(&seq, &"B".into(), "b").unwrap();
        let ProvenanceRecord::Action(act) = &api.commands[1].record else { panic!("expected action") };
        assert_eq!(act.metadata[0].file, "metadata/diversity-core-metrics_1/sample_metadata.tsv");
    }
}
