//! Column-name → metafield-key normalization and per-row metafield extraction.

use indexmap::IndexMap;

use crate::app_config::SourceColumns;
use crate::rows::Row;

/// Canonical metafield key for a raw column name.
///
/// Lowercases, turns spaces and hyphens into underscores, and drops
/// parentheses: `"LOC (Cutting Length)"` → `"loc_cutting_length"`.
#[must_use]
pub fn normalize_field_key(raw: &str) -> String {
    raw.to_lowercase()
        .replace(' ', "_")
        .replace(['(', ')'], "")
        .replace('-', "_")
}

/// Metafield entries for one row: every non-reserved column with a
/// non-blank value, keyed by [`normalize_field_key`].
///
/// Columns that normalize to the same key overwrite one another in column
/// order; the key keeps the position of its first occurrence.
#[must_use]
pub fn metadata_entries(row: &Row, columns: &SourceColumns) -> IndexMap<String, String> {
    let mut entries = IndexMap::new();
    for (column, value) in row.iter() {
        if columns.is_reserved(column) {
            continue;
        }
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        entries.insert(normalize_field_key(column), value.to_owned());
    }
    entries
}

/// Two or more metadata columns that share a normalized key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCollision {
    pub key: String,
    pub columns: Vec<String>,
}

/// Finds every normalized key claimed by more than one non-reserved header.
#[must_use]
pub fn find_key_collisions(headers: &[String], columns: &SourceColumns) -> Vec<KeyCollision> {
    let mut by_key: IndexMap<String, Vec<String>> = IndexMap::new();
    for header in headers.iter().filter(|h| !columns.is_reserved(h)) {
        by_key
            .entry(normalize_field_key(header))
            .or_default()
            .push(header.clone());
    }
    by_key
        .into_iter()
        .filter(|(_, cols)| cols.len() > 1)
        .map(|(key, columns)| KeyCollision { key, columns })
        .collect()
}
