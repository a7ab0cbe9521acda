//! Source-table loading.
//!
//! A [`Row`] is one line of the product master sheet keyed by trimmed column
//! name. Rows without an item code and without a series code carry nothing
//! to sync and are dropped while reading.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;

use crate::app_config::SourceColumns;
use crate::error::SourceError;

/// One source-table line: column name → trimmed cell value, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: IndexMap<String, String>,
}

impl Row {
    #[must_use]
    pub fn new(fields: IndexMap<String, String>) -> Self {
        Self { fields }
    }

    /// Value of `column`, or `None` when the column is absent.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Value of `column` with absent columns read as the empty string.
    #[must_use]
    pub fn value(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Parsed source table: the cleaned header row plus every retained row.
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

/// Reads the CSV at `path`.
///
/// # Errors
///
/// Returns [`SourceError::NotFound`] when the file does not exist,
/// [`SourceError::Io`] when it cannot be opened, and [`SourceError::Csv`]
/// when it is not valid CSV.
pub fn load_source_table(path: &Path, columns: &SourceColumns) -> Result<SourceTable, SourceError> {
    if !path.exists() {
        return Err(SourceError::NotFound(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_source_table(file, columns)
}

/// Reads CSV data from any reader.
///
/// Header names and cell values are trimmed, a leading UTF-8 BOM is
/// removed, and columns with a blank header are ignored. A duplicated header
/// keeps its first position and its last value.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] when the data is not valid CSV.
pub fn read_source_table<R: Read>(
    reader: R,
    columns: &SourceColumns,
) -> Result<SourceTable, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let raw_headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_owned())
        .collect();

    let mut headers: Vec<String> = Vec::new();
    for header in &raw_headers {
        if !header.is_empty() && !headers.contains(header) {
            headers.push(header.clone());
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Row = raw_headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, value)| (header.clone(), value.trim().to_owned()))
            .collect();

        if row.value(&columns.item_code).is_empty() && row.value(&columns.series).is_empty() {
            continue;
        }
        rows.push(row);
    }

    Ok(SourceTable { headers, rows })
}
