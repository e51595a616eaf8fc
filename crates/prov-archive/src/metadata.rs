//! Inspección de sidecars de metadata (TSV).
//!
//! Sólo interesa cuántas columnas de datos tiene el archivo: con una sola
//! columna el parámetro se emite como columna (y requiere nombre), con más
//! como tabla completa. Archivos viejos pueden venir sin fila de header; en
//! ese caso se sintetiza uno a partir de la primera fila de datos y se
//! reintenta una sola vez.

use std::path::Path;

use log::warn;
use prov_core::constants::ID_COLUMN;
use prov_core::MetadataKind;

use crate::error::ArchiveError;

/// Nombres de columna ID aceptados sin distinguir mayúsculas.
const ID_HEADERS_CASE_INSENSITIVE: &[&str] =
    &["id", "sampleid", "sample id", "sample-id", "featureid", "feature id", "feature-id"];
/// Nombres históricos aceptados sólo con esta grafía exacta.
const ID_HEADERS_EXACT: &[&str] = &["#SampleID", "#Sample ID", "#OTUID", "#OTU ID", "sample_name"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataSidecar {
    pub kind: MetadataKind,
    pub column_count: usize,
    /// Contenido a exportar (incluye el header sintetizado si lo hubo).
    pub contents: String,
    pub repaired: bool,
}

pub fn is_id_header(name: &str) -> bool {
    let trimmed = name.trim();
    ID_HEADERS_EXACT.contains(&trimmed)
    || ID_HEADERS_CASE_INSENSITIVE.iter().any(|h| h.eq_ignore_ascii_case(trimmed))
}

/// Lee el sidecar en `path` aplicando la recuperación de header.
pub fn read_sidecar(path: &Path) -> Result<MetadataSidecar, ArchiveError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ArchiveError::io(path, e))?;
    match interrogate(path, &contents) {
        Ok(column_count) => Ok(sidecar(column_count, contents, false)),
        Err(ArchiveError::UnrecognizedIdHeader { found, .. }) => {
            warn!("metadata {}: unrecognized ID header `{}`, synthesizing one", path.display(), found);
            let repaired = synthesize_header(&contents).ok_or_else(|| ArchiveError::EmptyMetadata { path: path.to_path_buf() })?;
            let column_count = interrogate(path, &repaired)?;
            Ok(sidecar(column_count, repaired, true))
        }
        Err(other) => Err(other),
    }
}

fn sidecar(column_count: usize, contents: String, repaired: bool) -> MetadataSidecar {
    let kind = if column_count == 1 { MetadataKind::Column } else { MetadataKind::Full };
    MetadataSidecar { kind, column_count, contents, repaired }
}

/// Devuelve el número de columnas de datos (sin contar la columna ID).
pub fn interrogate(path: &Path, contents: &str) -> Result<usize, ArchiveError> {
    let header = header_cells(contents).ok_or_else(|| ArchiveError::EmptyMetadata { path: path.to_path_buf() })?;
    let id = header[0].trim();
    if !is_id_header(id) {
        return Err(ArchiveError::UnrecognizedIdHeader { path: path.to_path_buf(), found: id.to_string() });
    }
    Ok(header.len() - 1)
}

/// Primera fila significativa partida por tabs, sin celdas vacías al final.
/// Se saltan líneas en blanco, comentarios y directivas `#q2:` (todo `#...`
/// que no sea un header ID).
fn header_cells(contents: &str) -> Option<Vec<&str>> {
    for line in contents.lines().map(|l| l.trim_end_matches('\r')) {
        if line.trim().is_empty() {
            continue;
        }
        let mut cells: Vec<&str> = line.split('\t').collect();
        let first = cells[0].trim();
        if first.starts_with('#') && !is_id_header(first) {
            continue;
        }
        while cells.len() > 1 && cells.last().is_some_and(|c| c.trim().is_empty()) {
            cells.pop();
        }
        return Some(cells);
    }
    None
}

/// Antepone como header la primera fila de datos con su primera celda
/// reemplazada por `id`. `None` si no hay filas de datos.
fn synthesize_header(contents: &str) -> Option<String> {
    let mut header = header_cells(contents)?;
    header[0] = ID_COLUMN;
    Some(format!("{}\n{}", header.join("\t"), contents))
}
