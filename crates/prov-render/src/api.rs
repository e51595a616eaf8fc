//! Renderer de la Artifact API de Python.
//!
//! Cada ejecución se liga a una variable con el label de la ejecución
//! (`demux_summarize_1 = demux.actions.summarize(...)`); los outputs se leen
//! como atributos (`demux_summarize_1.visualization`). Un output renombrado
//! a otra cosa (el resultado final) se liga aparte y el footer lo guarda.

use std::collections::BTreeSet;

use prov_core::config::identifier;
use prov_core::constants::PLACEHOLDER;
use prov_core::{ActionRecord, Command, ImportRecord, MetadataKind, MetadataRef, ProvenanceRecord, RenamedSequence,
                SyntaxConfig};

use crate::quote::{python_repr, python_str};
use crate::renderer::{digest_comment, plugin_versions_comment, ScriptRenderer};

const SHEBANG: &str = "#!/usr/bin/env python";
const INDENT: &str = "    ";

#[derive(Debug, Clone)]
pub struct ApiRenderer {
    syntax: SyntaxConfig,
    /// Archivo donde el footer guarda el resultado final; `None` omite el save.
    save_as: Option<String>,
}

impl Default for ApiRenderer {
    fn default() -> Self { Self { syntax: SyntaxConfig::API, save_as: None } }
}

impl ApiRenderer {
    pub fn new() -> Self { Self::default() }

    pub fn saving_as(mut self, file_name: impl Into<String>) -> Self {
        self.save_as = Some(file_name.into());
        self
    }

    fn metadata_line(&self, md: &MetadataRef) -> String {
        let mut load = format!("qiime2.Metadata.load({})", python_str(&md.file));
        if md.kind == MetadataKind::Column {
            load.push_str(&format!(".get_column({})", python_str(PLACEHOLDER)));
        }
        format!("{}={PLACEHOLDER},  # {PLACEHOLDER}: {load}", self.syntax.param_name(&md.name))
    }

    /// Un argumento por slot: los slots colección se agrupan en una lista de
    /// Python (`tables=[t1, t2],`).
    fn input_args(&self, action: &ActionRecord<String>) -> Vec<String> {
        let mut slots: Vec<(&str, bool, Vec<&str>)> = Vec::new();
        for input in &action.inputs {
            let continues = input.collection
                            && slots.last().is_some_and(|(name, collection, _)| *collection && *name == input.name);
            match slots.last_mut() {
                Some((_, _, members)) if continues => members.push(input.artifact.as_str()),
                _ => slots.push((input.name.as_str(), input.collection, vec![input.artifact.as_str()])),
            }
        }
        slots.into_iter()
             .map(|(name, collection, members)| {
                 let value = if collection { format!("[{}]", members.join(", ")) } else { members.join(", ") };
                 format!("{}={value},", self.syntax.param_name(name))
             })
             .collect()
    }

    fn action_block(&self, label: &str, action: &ActionRecord<String>) -> String {
        let plugin = self.syntax.param_name(&action.plugin_name);
        let mut out = format!("{label} = {plugin}.actions.{}(\n", self.syntax.param_name(&action.action_name));
        let mut args = self.input_args(action);
        args.extend(action.metadata.iter().map(|md| self.metadata_line(md)));
        args.extend(action.parameters
                          .iter()
                          .map(|p| format!("{}={},", self.syntax.param_name(&p.name), python_repr(&p.value))));
        for arg in args {
            out.push_str(INDENT);
            out.push_str(&arg);
            out.push('\n');
        }
        out.push_str(")\n");
        for output in &action.outputs {
            let attribute = self.syntax.output_name(label, &output.name);
            if output.artifact != attribute {
                out.push_str(&format!("{} = {attribute}\n", output.artifact));
            }
        }
        out
    }

    fn import_block(&self, import: &ImportRecord<String>) -> String {
        format!("# input format: {}\n{} = qiime2.Artifact.import_data(\n{INDENT}{},\n{INDENT}{},\n{INDENT}view_type={PLACEHOLDER},\n)\n",
                import.input_format,
                import.produced,
                python_str(&import.declared_type),
                python_str(&import.input_path))
    }
}

impl ScriptRenderer for ApiRenderer {
    fn syntax(&self) -> SyntaxConfig { self.syntax }

    fn header(&self, sequence: &RenamedSequence) -> String {
        let mut plugins = BTreeSet::new();
        for command in &sequence.commands {
            if let ProvenanceRecord::Action(action) = &command.record {
                plugins.insert(identifier(&self.syntax.param_name(&action.plugin_name)));
            }
        }
        let mut out = format!("{SHEBANG}\n{}\n\nimport qiime2\n", digest_comment(sequence));
        for plugin in plugins {
            out.push_str(&format!("from qiime2.plugins import {plugin}\n"));
        }
        out
    }

    fn render_command(&self, command: &Command) -> String {
        match &command.record {
            ProvenanceRecord::Action(action) => {
                format!("{}\n{}", plugin_versions_comment(&action.plugin_versions), self.action_block(&command.label, action))
            }
            ProvenanceRecord::Import(import) => {
                format!("{}\n{}", plugin_versions_comment(&Default::default()), self.import_block(import))
            }
        }
    }

    fn footer(&self, sequence: &RenamedSequence) -> String {
        match &self.save_as {
            Some(file) => format!("\n{}.save({})\n", sequence.final_name, python_str(file)),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use prov_core::{InputRef, OutputRef, Parameter};
    use serde_json::json;

    fn summarize(output_artifact: &str) -> Command {
        Command { label: "demux_summarize_1".into(),
                  record: ProvenanceRecord::Action(ActionRecord { execution_id: "E2".into(),
                                                                  plugin_name: "demux".into(),
                                                                  plugin_versions: IndexMap::new(),
                                                                  action_name: "summarize".into(),
                                                                  inputs: vec![InputRef { name: "data".into(),
                                                                                          artifact: "seqs".into(),
                                                                                          collection: false }],
                                                                  metadata: vec![],
                                                                  parameters: vec![Parameter { name: "n".into(),
                                                                                               value: json!(100) },
                                                                                   Parameter { name: "paired".into(),
                                                                                               value: json!(false) }],
                                                                  outputs: vec![OutputRef { name: "visualization".into(),
                                                                                            artifact: output_artifact.into() }] }) }
    }

    #[test]
    fn action_block_uses_literal_booleans() {
        let text = ApiRenderer::new().render_command(&summarize("demux_summarize_1.visualization"));
        assert_eq!(text,
                   "# plugin versions: N/A\n\
                    demux_summarize_1 = demux.actions.summarize(\n    \
                    data=seqs,\n    \
                    n=100,\n    \
                    paired=False,\n\
                    )\n");
    }

    #[test]
    fn collection_slots_render_as_one_list_argument() {
        let mut command = summarize("demux_summarize_1.visualization");
        let ProvenanceRecord::Action(action) = &mut command.record else { unreachable!() };
        action.parameters.clear();
        action.inputs = vec![InputRef { name: "tables".into(), artifact: "t1".into(), collection: true },
                             InputRef { name: "tables".into(), artifact: "t2".into(), collection: true },
                             InputRef { name: "single".into(), artifact: "t3".into(), collection: true },
                             InputRef { name: "data".into(), artifact: "seqs".into(), collection: false }];
        let text = ApiRenderer::new().render_command(&command);
        assert!(text.contains("(\n    tables=[t1, t2],\n    single=[t3],\n    data=seqs,\n)\n"), "{text}");
    }

    #[test]
    fn forced_output_is_bound() {
        let text = ApiRenderer::new().render_command(&summarize("final"));
        assert!(text.ends_with(")\nfinal = demux_summarize_1.visualization\n"));
    }

    #[test]
    fn metadata_lines_carry_placeholder() {
        let md = MetadataRef { name: "sample_metadata".into(),
                               file: "metadata/demux-summarize_1/md.tsv".into(),
                               source_path: Default::default(),
                               kind: MetadataKind::Column,
                               repaired: false };
        assert_eq!(ApiRenderer::new().metadata_line(&md),
                   "sample_metadata=REPLACE_ME,  # REPLACE_ME: \
                    qiime2.Metadata.load('metadata/demux-summarize_1/md.tsv').get_column('REPLACE_ME')");
    }

    #[test]
    fn footer_saves_final_result() {
        let seq = RenamedSequence { commands: vec![], final_name: "final".into(), digest: "d".into() };
        assert_eq!(ApiRenderer::new().footer(&seq), "");
        assert_eq!(ApiRenderer::new().saving_as("final.qzv").footer(&seq), "\nfinal.save('final.qzv')\n");
    }
}
