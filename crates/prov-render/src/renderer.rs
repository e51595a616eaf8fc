//! Contrato de renderizado.

use indexmap::IndexMap;
use log::debug;
use prov_core::{Command, RenamedSequence, SyntaxConfig};

const NO_VERSIONS: &str = "N/A";

/// Renderiza una secuencia renombrada a texto. La salida depende sólo de la
/// secuencia: mismo input, mismos bytes.
pub trait ScriptRenderer {
    /// Tabla de convenciones con la que se renombró la secuencia.
    fn syntax(&self) -> SyntaxConfig;
    fn header(&self, sequence: &RenamedSequence) -> String;
    /// Bloque de un comando, terminado en `\n`.
    fn render_command(&self, command: &Command) -> String;
    fn footer(&self, sequence: &RenamedSequence) -> String;

    /// Header, un bloque por comando separado por línea en blanco, footer.
    fn render(&self, sequence: &RenamedSequence) -> String {
        let mut out = self.header(sequence);
        for command in &sequence.commands {
            out.push('\n');
            out.push_str(&self.render_command(command));
        }
        out.push_str(&self.footer(sequence));
        debug!("render[{}]: {} commands, {} bytes", self.syntax().name, sequence.commands.len(), out.len());
        out
    }
}

/// `# plugin versions: demux 2019.1.0, types 0.1.0` (o `N/A` sin plugins).
pub fn plugin_versions_comment(versions: &IndexMap<String, String>) -> String {
    if versions.is_empty() {
        return format!("# plugin versions: {NO_VERSIONS}");
    }
    let listed: Vec<String> = versions.iter().map(|(plugin, version)| format!("{plugin} {version}")).collect();
    format!("# plugin versions: {}", listed.join(", "))
}

/// `# provenance digest: <hex>`, común a ambos headers.
pub(crate) fn digest_comment(sequence: &RenamedSequence) -> String {
    format!("# provenance digest: {}", sequence.digest)
}
