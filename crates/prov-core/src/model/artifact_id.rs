use std::fmt;

use serde::{Deserialize, Serialize};

/// Identificador estable de un artifact, asignado al crearlo y nunca
/// reutilizado. Se trata como opaco: el core no valida su forma.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(String);

impl ArtifactId {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for ArtifactId {
    fn from(id: &str) -> Self { Self(id.to_string()) }
}

impl From<String> for ArtifactId {
    fn from(id: String) -> Self { Self(id) }
}

impl AsRef<str> for ArtifactId {
    fn as_ref(&self) -> &str { &self.0 }
}
