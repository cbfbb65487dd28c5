use indexmap::IndexMap;
use rowsheet_error::{Result, SheetsError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cell values keyed by column name.
///
/// Key order is kept; for a sheet without a header row it becomes the header
/// order.
pub type RowData = IndexMap<String, Value>;

/// Position of the header row.
pub const HEADER_ROW: usize = 1;

/// How to select rows for `find_row`.
#[derive(Debug, Clone, PartialEq)]
pub enum RowQuery {
    /// A single 1-based row position.
    Index(usize),
    /// All rows whose cells match every column/value pair.
    Match(RowData),
}

impl From<usize> for RowQuery {
    fn from(value: usize) -> Self {
        RowQuery::Index(value)
    }
}

impl From<RowData> for RowQuery {
    fn from(value: RowData) -> Self {
        RowQuery::Match(value)
    }
}

/// One or more 1-based row positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIndexes(pub Vec<usize>);

impl RowIndexes {
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }

    /// Check that positions are present and none of them target the header.
    pub(crate) fn validate_data_rows(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(SheetsError::validation("No row indexes provided"));
        }
        for &idx in &self.0 {
            validate_data_row(idx)?;
        }
        Ok(())
    }
}

impl From<usize> for RowIndexes {
    fn from(value: usize) -> Self {
        RowIndexes(vec![value])
    }
}

impl From<Vec<usize>> for RowIndexes {
    fn from(value: Vec<usize>) -> Self {
        RowIndexes(value)
    }
}

impl From<&[usize]> for RowIndexes {
    fn from(value: &[usize]) -> Self {
        RowIndexes(value.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for RowIndexes {
    fn from(value: [usize; N]) -> Self {
        RowIndexes(value.to_vec())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundRow {
    pub row_index: usize,
    pub data: RowData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedRow {
    pub row_index: usize,
    pub row_data: RowData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedRows {
    pub count: usize,
}

/// Row positions are 1-based and row 1 holds the header.
pub(crate) fn validate_data_row(idx: usize) -> Result<()> {
    match idx {
        0 => Err(SheetsError::validation("Row indexes are 1-based, got 0")),
        HEADER_ROW => Err(SheetsError::validation(
            "Row 1 is the header row and cannot be targeted",
        )),
        _ => Ok(()),
    }
}

/// Every column name used in a query or write must start with an uppercase
/// letter.
pub(crate) fn validate_keys<'a>(keys: impl IntoIterator<Item = &'a String>) -> Result<()> {
    for key in keys {
        let upper = key.chars().next().is_some_and(char::is_uppercase);
        if !upper {
            return Err(
                SheetsError::validation("Column names must start with an uppercase letter")
                    .with_field("key", key),
            );
        }
    }
    Ok(())
}

/// Read the header row out of a value range.
///
/// Header cells are stringified. Duplicate non-empty names are rejected since
/// they make column lookups ambiguous.
pub(crate) fn read_headers(values: &[Vec<Value>]) -> Result<Vec<String>> {
    let headers: Vec<String> = match values.first() {
        Some(row) => row.iter().map(cell_to_string).collect(),
        None => return Ok(Vec::new()),
    };

    for (idx, header) in headers.iter().enumerate() {
        if header.is_empty() {
            continue;
        }
        if headers[..idx].contains(header) {
            return Err(SheetsError::validation("Duplicate column name in header row")
                .with_field("column", header));
        }
    }

    Ok(headers)
}

/// Pair header names with a row's cells. Cells past the end of a short row are
/// left out.
pub(crate) fn zip_row(headers: &[String], row: &[Value]) -> RowData {
    headers
        .iter()
        .zip(row.iter())
        .map(|(h, v)| (h.clone(), v.clone()))
        .collect()
}

/// Check a single cell against a query value.
///
/// String cells are treated as comma separated tag lists and compared case
/// insensitively against a string query value. Anything else needs to be
/// strictly equal.
pub(crate) fn cell_matches(cell: &Value, query: &Value) -> bool {
    match (cell, query) {
        (Value::String(cell), Value::String(query)) => {
            let query = query.to_lowercase();
            cell.split(',')
                .any(|part| part.trim().to_lowercase() == query)
        }
        (cell, query) => cell == query,
    }
}

pub(crate) fn row_matches(headers: &[String], row: &[Value], query: &RowData) -> bool {
    query.iter().all(|(key, expected)| {
        let Some(col) = headers.iter().position(|h| h == key) else {
            return false;
        };
        match row.get(col) {
            Some(cell) => cell_matches(cell, expected),
            None => false,
        }
    })
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
