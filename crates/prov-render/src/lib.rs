//! prov-render: renderers de scripts a partir de una `RenamedSequence`.
//!
//! - `ScriptRenderer`: contrato común (header, comando, footer).
//! - `CliRenderer`: script de shell con llamadas `qiime ...`.
//! - `ApiRenderer`: script Python contra la Artifact API.
//! - `quote`: quoting de shell y `repr` estilo Python.
//!
//! Los renderers no tocan el filesystem: devuelven `String` y el caller
//! decide dónde escribir.

pub mod api;
pub mod cli;
pub mod quote;
pub mod renderer;

pub use api::ApiRenderer;
pub use cli::CliRenderer;
pub use renderer::{plugin_versions_comment, ScriptRenderer};
