//! Constantes compartidas por loader, renamer y renderers.
//!
//! Algunos valores (extensiones, sentinelas) terminan literalmente en los
//! scripts generados; cambiarlos altera la salida byte a byte.

/// Nombre de output que recibe trato especial: se guarda como `.qzv`.
pub const VISUALIZATION_OUTPUT: &str = "visualization";

/// Extensión para artifacts de datos.
pub const ARTIFACT_EXT: &str = ".qza";

/// Extensión para visualizaciones.
pub const VISUALIZATION_EXT: &str = ".qzv";

/// Nombre de output reportado para archivos anteriores al campo
/// `output-name`. Debe corregirse a mano en el script.
pub const LEGACY_OUTPUT_NAME: &str = "legacy-unnamed";

/// Token que el usuario debe reemplazar en el script generado.
pub const PLACEHOLDER: &str = "REPLACE_ME";

/// Sufijo del input_path sintético cuando un import no registró un único archivo.
pub const IMPORT_DIR_SUFFIX: &str = "_import_dir";

/// Directorio (relativo al output) donde se exportan los sidecars de metadata.
pub const METADATA_DIR: &str = "metadata";

/// Nombre de la columna ID usada al sintetizar un header faltante.
pub const ID_COLUMN: &str = "id";

/// Módulo raíz que importa todo script de la API.
pub const SCRIPT_MODULE: &str = "qiime2";
