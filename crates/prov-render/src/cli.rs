//! Renderer de línea de comandos (`qiime <plugin> <action> ...`).
//!
//! Cada comando es una línea lógica partida con `\` de continuación: una
//! línea por flag. Los outputs quedan bajo `--output-dir <label>`; sólo los
//! outputs renombrados fuera de ese directorio (el resultado final) llevan
//! su propio `--o-*`.

use prov_core::constants::PLACEHOLDER;
use prov_core::{ActionRecord, BooleanStyle, Command, ImportRecord, MetadataKind, ProvenanceRecord, RenamedSequence,
                SyntaxConfig};
use serde_json::Value;

use crate::quote::{shell_quote, shell_tokens};
use crate::renderer::{digest_comment, plugin_versions_comment, ScriptRenderer};

const SHEBANG: &str = "#!/bin/sh";

#[derive(Debug, Clone, Copy)]
pub struct CliRenderer {
    syntax: SyntaxConfig,
}

impl Default for CliRenderer {
    fn default() -> Self { Self { syntax: SyntaxConfig::CLI } }
}

impl CliRenderer {
    pub fn new() -> Self { Self::default() }

    fn flag(&self, prefix: &str, name: &str) -> String { format!("--{prefix}-{}", self.syntax.param_name(name)) }

    fn parameter_lines(&self, name: &str, value: &Value) -> Option<String> {
        match (value, self.syntax.booleans) {
            (Value::Null, _) => None,
            (Value::Bool(b), BooleanStyle::PresenceFlag) => {
                let negation = if *b { "" } else { "no-" };
                Some(format!("--p-{negation}{}", self.syntax.param_name(name)))
            }
            (other, _) => {
                let tokens = shell_tokens(other);
                if tokens.is_empty() {
                    // Lista vacía: sin valores que pasar.
                    return None;
                }
                Some(format!("{} {}", self.flag("p", name), tokens.join(" ")))
            }
        }
    }

    fn action_lines(&self, label: &str, action: &ActionRecord<String>) -> Vec<String> {
        let mut lines = vec![format!("qiime {} {}",
                                     self.syntax.param_name(&action.plugin_name),
                                     self.syntax.param_name(&action.action_name))];
        for input in &action.inputs {
            lines.push(format!("{} {}", self.flag("i", &input.name), shell_quote(&input.artifact)));
        }
        for md in &action.metadata {
            lines.push(format!("{}-file {}", self.flag("m", &md.name), shell_quote(&md.file)));
            if md.kind == MetadataKind::Column {
                lines.push(format!("{}-column {}", self.flag("m", &md.name), PLACEHOLDER));
            }
        }
        lines.extend(action.parameters.iter().filter_map(|p| self.parameter_lines(&p.name, &p.value)));
        let own_dir = format!("{label}/");
        for output in action.outputs.iter().filter(|o| !o.artifact.starts_with(&own_dir)) {
            lines.push(format!("{} {}", self.flag("o", &output.name), shell_quote(&output.artifact)));
        }
        lines.push(format!("--output-dir {}", shell_quote(label)));
        lines
    }

    fn import_lines(&self, import: &ImportRecord<String>) -> Vec<String> {
        vec!["qiime tools import".to_string(),
             // El tipo siempre va entre comillas: `[` es un glob en sh.
             format!("--type '{}'", import.declared_type.replace('\'', r"'\''")),
             format!("--input-path {}", shell_quote(&import.input_path)),
             format!("--input-format {}", shell_quote(&import.input_format)),
             format!("--output-path {}", shell_quote(&import.produced))]
    }
}

impl ScriptRenderer for CliRenderer {
    fn syntax(&self) -> SyntaxConfig { self.syntax }

    fn header(&self, sequence: &RenamedSequence) -> String {
        format!("{SHEBANG}\n{}\n# final result: {}\n", digest_comment(sequence), sequence.final_name)
    }

    fn render_command(&self, command: &Command) -> String {
        let (versions, lines) = match &command.record {
            ProvenanceRecord::Action(action) => {
                (plugin_versions_comment(&action.plugin_versions), self.action_lines(&command.label, action))
            }
            ProvenanceRecord::Import(import) => (plugin_versions_comment(&Default::default()), self.import_lines(import)),
        };
        let mut out = versions;
        out.push('\n');
        let last = lines.len() - 1;
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                out.push_str("  ");
            }
            out.push_str(line);
            out.push_str(if i < last { " \\\n" } else { "\n" });
        }
        out
    }

    fn footer(&self, _sequence: &RenamedSequence) -> String { String::new() }
}
