//! Tabla de convenciones por sintaxis de salida.
//!
//! El renamer y los dos renderers consultan esta tabla en lugar de repetir
//! literales: separador de palabras, forma de nombrar outputs y forma de
//! expresar booleanos. Hay una entrada por sintaxis (`SyntaxConfig::CLI`,
//! `SyntaxConfig::API`).
use std::collections::HashSet;

use crate::constants::{ARTIFACT_EXT, METADATA_DIR, VISUALIZATION_EXT, VISUALIZATION_OUTPUT};

/// Sufijo para variables que taparían un módulo importado por el script.
const SHADOW_SUFFIX: &str = "_artifact";

const PYTHON_KEYWORDS: &[&str] = &["False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
                                   "continue", "def", "del", "elif", "else", "except", "finally", "for", "from",
                                   "global", "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass",
                                   "raise", "return", "try", "while", "with", "yield"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordSeparator {
    /// `denoise_single` -> `denoise-single`
    Kebab,
    /// `feature-table` -> `feature_table`
    Snake,
}

impl WordSeparator {
    pub fn apply(&self, s: &str) -> String {
        match self {
            Self::Kebab => s.replace('_', "-"),
            Self::Snake => s.replace('-', "_"),
        }
    }

    fn joiner(&self) -> char {
        match self {
            Self::Kebab => '-',
            Self::Snake => '_',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputNaming {
    /// `label/output.qza` (o `.qzv` para visualizaciones).
    PathWithExtension,
    /// `label.output`
    DottedAttribute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanStyle {
    /// `--p-x` / `--p-no-x`, sin token de valor.
    PresenceFlag,
    /// `x=True` / `x=False`.
    Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxConfig {
    pub name: &'static str,
    pub separator: WordSeparator,
    pub output_naming: OutputNaming,
    pub booleans: BooleanStyle,
}

impl SyntaxConfig {
    pub const CLI: SyntaxConfig = SyntaxConfig { name: "cli",
                                                 separator: WordSeparator::Kebab,
                                                 output_naming: OutputNaming::PathWithExtension,
                                                 booleans: BooleanStyle::PresenceFlag };

    pub const API: SyntaxConfig = SyntaxConfig { name: "api",
                                                 separator: WordSeparator::Snake,
                                                 output_naming: OutputNaming::DottedAttribute,
                                                 booleans: BooleanStyle::Literal };

    /// Label base de la n-ésima ejecución de `plugin`/`action` (n empieza en 1).
    pub fn action_label(&self, plugin: &str, action: &str, ordinal: usize) -> String {
        format!("{}{}{}_{}",
                self.separator.apply(plugin),
                self.separator.joiner(),
                self.separator.apply(action),
                ordinal)
    }

    /// Nombre de un output de acción derivado del label de su ejecución. El
    /// nombre del output se conserva tal cual: es el nombre de archivo que
    /// escribe `--output-dir` y el atributo del objeto de resultados.
    pub fn output_name(&self, label: &str, output: &str) -> String {
        match self.output_naming {
            OutputNaming::PathWithExtension => {
                let ext = if output == VISUALIZATION_OUTPUT { VISUALIZATION_EXT } else { ARTIFACT_EXT };
                format!("{label}/{output}{ext}")
            }
            OutputNaming::DottedAttribute => format!("{}.{}", label, identifier(output)),
        }
    }

    /// Nombre del artifact producido por un import. `ordinal` > 1 sólo cuando
    /// dos imports registraron el mismo input_path.
    pub fn import_name(&self, input_path: &str, ordinal: usize) -> String {
        match self.output_naming {
            OutputNaming::PathWithExtension => {
                if ordinal > 1 {
                    format!("{input_path}_{ordinal}{ARTIFACT_EXT}")
                } else {
                    format!("{input_path}{ARTIFACT_EXT}")
                }
            }
            OutputNaming::DottedAttribute => {
                let ident = identifier(input_path);
                if ordinal > 1 { format!("{ident}_{ordinal}") } else { ident }
            }
        }
    }

    /// `name`, o `name` + sufijo si coincide con uno de los módulos que el
    /// script importa. Sólo la sintaxis con variables puede taparlos.
    pub fn unshadowed(&self, name: String, modules: &HashSet<String>) -> String {
        match self.output_naming {
            OutputNaming::DottedAttribute if modules.contains(&name) => format!("{name}{SHADOW_SUFFIX}"),
            _ => name,
        }
    }

    /// Nombre de parámetro/input/output tal como lo espera la sintaxis.
    pub fn param_name(&self, name: &str) -> String { self.separator.apply(name) }

    /// Ruta (relativa al directorio de salida) donde se exporta un sidecar de
    /// metadata. Es la misma para ambas sintaxis, así ambos scripts comparten
    /// la copia exportada.
    pub fn metadata_path(plugin: &str, action: &str, ordinal: usize, file_name: &str) -> String {
        format!("{}/{}/{}", METADATA_DIR, Self::CLI.action_label(plugin, action, ordinal), file_name)
    }
}

/// Re-codifica un string arbitrario como identificador Python válido.
pub fn identifier(raw: &str) -> String {
    let mut out: String = raw.chars().map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' }).collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if PYTHON_KEYWORDS.contains(&out.as_str()) {
        out.push('_');
    }
    out
}
