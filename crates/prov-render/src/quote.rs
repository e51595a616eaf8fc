//! Formateo de valores para shell y Python.

use std::borrow::Cow;

use serde_json::Value;

/// Caracteres que no requieren comillas en `sh`.
fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ',' | ':' | '=' | '+' | '@' | '%')
}

/// Devuelve `s` tal cual si es seguro, o entre comillas simples.
pub fn shell_quote(s: &str) -> Cow<'_, str> {
    if !s.is_empty() && s.chars().all(is_shell_safe) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(format!("'{}'", s.replace('\'', r"'\''")))
}

/// Tokens de shell para el valor de un parámetro no booleano. Las listas
/// pasan como varios tokens; los objetos como JSON compacto.
pub fn shell_tokens(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![shell_quote(s).into_owned()],
        Value::Array(items) => items.iter().flat_map(shell_tokens).collect(),
        Value::Object(_) => vec![shell_quote(&value.to_string()).into_owned()],
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

/// String literal de Python con comillas simples.
pub fn python_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Equivalente a `repr()` de Python para valores JSON.
pub fn python_repr(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => python_str(s),
        Value::Array(items) => format!("[{}]", items.iter().map(python_repr).collect::<Vec<_>>().join(", ")),
        Value::Object(map) => {
            let entries: Vec<String> = map.iter().map(|(k, v)| format!("{}: {}", python_str(k), python_repr(v))).collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}
