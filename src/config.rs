//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable (`CONFIG`).
//! Los flags de la CLI tienen prioridad sobre estos valores.
use std::env;

use dotenvy::dotenv;
use log::warn;
use once_cell::sync::Lazy;
use prov_core::WalkLimits;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub const ENV_CLI_SCRIPT: &str = "PROVSCRIPT_CLI_SCRIPT";
pub const ENV_API_SCRIPT: &str = "PROVSCRIPT_API_SCRIPT";
pub const ENV_MAX_DEPTH: &str = "PROVSCRIPT_MAX_DEPTH";
pub const ENV_MAX_RECORDS: &str = "PROVSCRIPT_MAX_RECORDS";
pub const ENV_EXPORT_METADATA: &str = "PROVSCRIPT_EXPORT_METADATA";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Nombre del script de línea de comandos dentro del directorio de salida.
    pub cli_script: String,
    /// Nombre del script de la Artifact API.
    pub api_script: String,
    pub max_depth: usize,
    pub max_records: usize,
    /// Copiar los sidecars de metadata junto a los scripts.
    pub export_metadata: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let limits = WalkLimits::default();
        Self { cli_script: "q2cli.sh".to_string(),
               api_script: "artifact_api.py".to_string(),
               max_depth: limits.max_depth,
               max_records: limits.max_records,
               export_metadata: true }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria. Un
    /// valor que no se puede parsear conserva el default y se reporta.
    pub fn from_lookup<F>(lookup: F) -> Self
        where F: Fn(&str) -> Option<String>
    {
        let defaults = Self::default();
        Self { cli_script: lookup(ENV_CLI_SCRIPT).unwrap_or(defaults.cli_script),
               api_script: lookup(ENV_API_SCRIPT).unwrap_or(defaults.api_script),
               max_depth: parsed(&lookup, ENV_MAX_DEPTH, defaults.max_depth, |v| v.parse().ok()),
               max_records: parsed(&lookup, ENV_MAX_RECORDS, defaults.max_records, |v| v.parse().ok()),
               export_metadata: parsed(&lookup, ENV_EXPORT_METADATA, defaults.export_metadata, parse_bool) }
    }

    pub fn limits(&self) -> WalkLimits { WalkLimits { max_depth: self.max_depth, max_records: self.max_records } }
}

fn parsed<F, T, P>(lookup: &F, key: &str, default: T, parse: P) -> T
    where F: Fn(&str) -> Option<String>,
          P: Fn(&str) -> Option<T>
{
    match lookup(key) {
        None => default,
        Some(raw) => parse(raw.trim()).unwrap_or_else(|| {
                                          warn!("config: invalid value `{}` for {}, using default", raw, key);
                                          default
                                      }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
