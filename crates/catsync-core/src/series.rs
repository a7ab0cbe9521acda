//! Grouping rows into series and deriving the parent product's identity.

use indexmap::IndexMap;

use crate::app_config::SourceColumns;
use crate::rows::Row;

/// Rows that share a series key, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesGroup {
    pub key: String,
    pub rows: Vec<Row>,
}

/// Series key for a row.
///
/// Uses the explicit series column when filled in; otherwise the item code
/// up to its first `-`, or failing that its first `/`, or the whole code.
/// Returns `None` when neither column yields anything.
#[must_use]
pub fn series_key(row: &Row, columns: &SourceColumns) -> Option<String> {
    let explicit = row.value(&columns.series).trim();
    if !explicit.is_empty() {
        return Some(explicit.to_owned());
    }

    let code = row.value(&columns.item_code).trim();
    let derived = if let Some((prefix, _)) = code.split_once('-') {
        prefix
    } else if let Some((prefix, _)) = code.split_once('/') {
        prefix
    } else {
        code
    };

    (!derived.is_empty()).then(|| derived.to_owned())
}

/// Partitions rows into series groups in a single pass.
///
/// Groups appear in order of first sighting and keep row order within each
/// group. Rows with no derivable key are dropped.
#[must_use]
pub fn group_by_series(rows: Vec<Row>, columns: &SourceColumns) -> Vec<SeriesGroup> {
    let mut groups: IndexMap<String, Vec<Row>> = IndexMap::new();
    for row in rows {
        if let Some(key) = series_key(&row, columns) {
            groups.entry(key).or_default().push(row);
        }
    }
    groups
        .into_iter()
        .map(|(key, rows)| SeriesGroup { key, rows })
        .collect()
}

/// Product handle for a series: `"series-"` plus the key lowercased with
/// `.`, space and `/` turned into `-`.
#[must_use]
pub fn series_handle(key: &str) -> String {
    let slug = key.to_lowercase().replace(['.', ' ', '/'], "-");
    format!("series-{slug}")
}

/// Product title: the first row's product name, or `"Series {key}"` when
/// that is blank.
#[must_use]
pub fn series_title(group: &SeriesGroup, columns: &SourceColumns) -> String {
    group
        .rows
        .first()
        .map(|row| row.value(&columns.product_name).trim())
        .filter(|name| !name.is_empty())
        .map_or_else(|| format!("Series {}", group.key), str::to_owned)
}
