//! provscript
//!
//! Reconstruye scripts reproducibles a partir de la provenance de un archivo
//! de resultados extraído:
//! - `config`: variables de entorno (`.env`) con defaults.
//! - `errors`: `ReplayError`, agrega errores de archivo, core e IO.
//! - `pipeline`: `replay`, une loader, walker, renamer y renderers.
//!
//! La lógica vive en los crates `prov-core`, `prov-archive` y `prov-render`;
//! el binario está en `prov-cli`.

pub mod config;
pub mod errors;
pub mod pipeline;

pub use config::{AppConfig, CONFIG};
pub use errors::ReplayError;
pub use pipeline::{replay, ReplayOptions, ReplayReport, SyntaxChoice};
