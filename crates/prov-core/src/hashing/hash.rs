//! Hash helpers sobre blake3.

use blake3::Hasher;
use serde_json::Value;

use super::to_canonical_json;
use crate::model::CommandSequence;

/// Hashea un string y devuelve hex.
pub fn hash_str(input: &str) -> String {
    let mut h = Hasher::new();
    h.update(input.as_bytes());
    h.finalize().to_hex().to_string()
}

pub fn hash_value(value: &Value) -> String { hash_str(&to_canonical_json(value)) }

/// Digest estable de una secuencia deduplicada. No depende de la ruta donde
/// se extrajo el archivo (los `source_path` no se serializan).
pub fn sequence_digest(sequence: &CommandSequence) -> String {
    // Serializar structs propios a Value no puede fallar (claves string).
    let value = serde_json::to_value(sequence).unwrap_or(Value::Null);
    hash_value(&value)
}
