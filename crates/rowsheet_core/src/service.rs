//! Remote service contract used by the sheet client.
//!
//! Types mirror the Sheets v4 REST resources, trimmed to the fields the client
//! reads or writes.

use std::fmt::Debug;
use std::path::Path;

use rowsheet_error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The operations the sheet client needs from the remote spreadsheet service.
///
/// All ranges are in A1 notation and already include the (quoted) sheet name.
pub trait SheetsService: Debug + Sync + Send {
    /// Read the values in a range.
    fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> impl Future<Output = Result<ValueRange>> + Send;

    /// Overwrite the values in a range, starting at its top-left cell.
    fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: ValueRange,
    ) -> impl Future<Output = Result<UpdateValuesResponse>> + Send;

    /// Append rows after the last row of the table found in the range.
    fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: ValueRange,
    ) -> impl Future<Output = Result<AppendValuesResponse>> + Send;

    /// Write several ranges in one request.
    fn batch_update_values(
        &self,
        spreadsheet_id: &str,
        request: BatchUpdateValuesRequest,
    ) -> impl Future<Output = Result<BatchUpdateValuesResponse>> + Send;

    /// Apply structural changes to the spreadsheet.
    fn batch_update(
        &self,
        spreadsheet_id: &str,
        request: BatchUpdateSpreadsheetRequest,
    ) -> impl Future<Output = Result<BatchUpdateSpreadsheetResponse>> + Send;

    /// Get spreadsheet metadata, including the properties of every sheet.
    fn get_spreadsheet(
        &self,
        spreadsheet_id: &str,
    ) -> impl Future<Output = Result<Spreadsheet>> + Send;
}

/// Exchanges a credentials artifact for an authenticated service.
pub trait ServiceConnector: Sync + Send {
    type Service: SheetsService;

    fn connect(
        &self,
        credentials_path: &Path,
    ) -> impl Future<Output = Result<Self::Service>> + Send;
}

// <https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets.values#ValueRange>
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    /// Row-major cell values. Omitted by the service when the range is empty.
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    pub fn new(range: impl Into<String>, values: Vec<Vec<Value>>) -> Self {
        ValueRange {
            range: Some(range.into()),
            major_dimension: Some("ROWS".to_string()),
            values,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueInputOption {
    Raw,
    UserEntered,
}

impl ValueInputOption {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "RAW",
            Self::UserEntered => "USER_ENTERED",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    pub spreadsheet_id: Option<String>,
    pub updated_range: Option<String>,
    pub updated_rows: Option<u64>,
    pub updated_columns: Option<u64>,
    pub updated_cells: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendValuesResponse {
    pub spreadsheet_id: Option<String>,
    /// Range of the table the values were appended to.
    pub table_range: Option<String>,
    pub updates: Option<UpdateValuesResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateValuesRequest {
    pub value_input_option: ValueInputOption,
    pub data: Vec<ValueRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateValuesResponse {
    pub spreadsheet_id: Option<String>,
    pub total_updated_rows: Option<u64>,
    pub total_updated_columns: Option<u64>,
    pub total_updated_cells: Option<u64>,
    pub total_updated_sheets: Option<u64>,
    #[serde(default)]
    pub responses: Vec<UpdateValuesResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateSpreadsheetRequest {
    pub requests: Vec<SpreadsheetRequest>,
}

/// A single structural change.
///
/// Serializes as `{"deleteDimension": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpreadsheetRequest {
    DeleteDimension(DeleteDimensionRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDimensionRequest {
    pub range: DimensionRange,
}

/// Half-open `[start_index, end_index)` range of rows or columns, 0-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionRange {
    pub sheet_id: i64,
    pub dimension: Dimension,
    pub start_index: usize,
    pub end_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dimension {
    Rows,
    Columns,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateSpreadsheetResponse {
    pub spreadsheet_id: Option<String>,
    /// One reply per request, in request order. Delete replies are empty
    /// objects.
    #[serde(default)]
    pub replies: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spreadsheet {
    pub spreadsheet_id: Option<String>,
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    /// The first sheet of a spreadsheet has id 0, which the service may omit.
    #[serde(default)]
    pub sheet_id: i64,
    pub title: String,
    pub index: Option<i64>,
}
