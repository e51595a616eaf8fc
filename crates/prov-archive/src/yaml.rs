//! Carga de documentos YAML de provenance.
//!
//! Los documentos usan tags propios (`!ref`, `!cite`, `!metadata`,
//! `!no-provenance`, `!color`, `!set`). serde_yaml los conserva como
//! `Value::Tagged`; aquí se exponen helpers que los atraviesan. Sólo
//! `!metadata` tiene significado para el loader (`tag_name`).

use std::path::Path;

use serde_json::{Map, Number, Value as JsonValue};
use serde_yaml::Value;

use crate::error::ArchiveError;

pub const METADATA_TAG: &str = "metadata";

pub fn load(path: &Path) -> Result<Value, ArchiveError> {
    let text = std::fs::read_to_string(path).map_err(|e| ArchiveError::io(path, e))?;
    serde_yaml::from_str(&text).map_err(|source| ArchiveError::Yaml { path: path.to_path_buf(), source })
}

/// Quita cualquier número de tags anidados.
pub fn untag(mut value: &Value) -> &Value {
    while let Value::Tagged(tagged) = value {
        value = &tagged.value;
    }
    value
}

/// Nombre del tag externo sin el `!` inicial.
pub fn tag_name(value: &Value) -> Option<String> {
    match value {
        Value::Tagged(tagged) => Some(tagged.tag.to_string().trim_start_matches('!').to_string()),
        _ => None,
    }
}

/// Navega mappings anidados ignorando tags intermedios.
pub fn get<'a>(doc: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(doc, |current, key| untag(current).as_mapping()?.get(*key))
}

pub fn require<'a>(doc: &'a Value, keys: &[&str], path: &Path) -> Result<&'a Value, ArchiveError> {
    get(doc, keys).ok_or_else(|| ArchiveError::MissingField { path: path.to_path_buf(), field: keys.join(".") })
}

/// Igual que `require`, pero el valor debe ser escalar no nulo.
pub fn require_str(doc: &Value, keys: &[&str], path: &Path) -> Result<String, ArchiveError> {
    let value = require(doc, keys, path)?;
    scalar_string(value).ok_or_else(|| ArchiveError::MalformedField { path: path.to_path_buf(),
                                                                      field: keys.join("."),
                                                                      reason: "expected a scalar value".into() })
}

/// Representación textual de un escalar (string, número o bool).
pub fn scalar_string(value: &Value) -> Option<String> {
    match untag(value) {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Entradas `- name: value` de listas de inputs/parámetros: un mapping de
/// exactamente una clave.
pub fn single_entry(item: &Value) -> Option<(String, &Value)> {
    let mapping = untag(item).as_mapping()?;
    if mapping.len() != 1 {
        return None;
    }
    let (key, value) = mapping.iter().next()?;
    Some((scalar_string(key)?, value))
}

/// Convierte a JSON descartando tags. Floats no finitos pasan a `null`.
pub fn to_json(value: &Value) -> JsonValue {
    match untag(value) {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                JsonValue::from(i)
            } else if let Some(u) = n.as_u64() {
                JsonValue::from(u)
            } else {
                n.as_f64().and_then(Number::from_f64).map(JsonValue::Number).unwrap_or(JsonValue::Null)
            }
        }
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Sequence(items) => JsonValue::Array(items.iter().map(to_json).collect()),
        Value::Mapping(mapping) => {
            let mut out = Map::new();
            for (k, v) in mapping {
                let key = scalar_string(k).unwrap_or_else(|| "null".to_string());
                out.insert(key, to_json(v));
            }
            JsonValue::Object(out)
        }
        // `untag` ya consumió todos los niveles.
        Value::Tagged(_) => JsonValue::Null,
    }
}
