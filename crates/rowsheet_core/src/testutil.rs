//! In-memory sheets service for tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rowsheet_error::{Result, SheetsError};
use serde_json::Value;

use crate::range::parse_start_row;
use crate::service::{
    AppendValuesResponse,
    BatchUpdateSpreadsheetRequest,
    BatchUpdateSpreadsheetResponse,
    BatchUpdateValuesRequest,
    BatchUpdateValuesResponse,
    ServiceConnector,
    Sheet,
    SheetProperties,
    SheetsService,
    Spreadsheet,
    SpreadsheetRequest,
    UpdateValuesResponse,
    ValueRange,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetValues(String),
    UpdateValues(String, ValueRange),
    AppendValues(String, ValueRange),
    BatchUpdateValues(BatchUpdateValuesRequest),
    BatchUpdate(BatchUpdateSpreadsheetRequest),
    GetSpreadsheet,
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Call::GetValues(_) | Call::GetSpreadsheet)
    }
}

#[derive(Debug, Default)]
struct FakeState {
    /// (sheet id, title, rows)
    sheets: Vec<(i64, String, Vec<Vec<Value>>)>,
    calls: Vec<Call>,
    fail_with: Option<String>,
}

/// Sheets service backed by in-memory grids. Cloning shares state.
#[derive(Debug, Clone, Default)]
pub struct FakeSheetsService {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSheetsService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(self, sheet_id: i64, title: &str, rows: Vec<Vec<Value>>) -> Self {
        self.state
            .lock()
            .sheets
            .push((sheet_id, title.to_string(), rows));
        self
    }

    /// Make every subsequent call fail with a transport error.
    pub fn fail_with(&self, msg: &str) {
        self.state.lock().fail_with = Some(msg.to_string());
    }

    pub fn rows(&self, title: &str) -> Vec<Vec<Value>> {
        let state = self.state.lock();
        state
            .sheets
            .iter()
            .find(|(_, t, _)| t == title)
            .map(|(_, _, rows)| rows.clone())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    fn begin(&self, call: Call) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(call);
        match &state.fail_with {
            Some(msg) => Err(SheetsError::transport(msg.clone())),
            None => Ok(()),
        }
    }

    fn with_rows<T>(
        &self,
        range: &str,
        f: impl FnOnce(&mut Vec<Vec<Value>>, Option<usize>) -> T,
    ) -> Result<T> {
        let (sheet, start_row) = split_range(range)?;
        let mut state = self.state.lock();
        let (_, _, rows) = state
            .sheets
            .iter_mut()
            .find(|(_, t, _)| *t == sheet)
            .ok_or_else(|| SheetsError::transport(format!("Unable to parse range: {range}")))?;
        Ok(f(rows, start_row))
    }

    fn write_rows(&self, range: &str, values: &[Vec<Value>]) -> Result<UpdateValuesResponse> {
        self.with_rows(range, |rows, start| {
            let start = start.unwrap_or(1);
            for (offset, new_row) in values.iter().enumerate() {
                let idx = start - 1 + offset;
                if rows.len() <= idx {
                    rows.resize(idx + 1, Vec::new());
                }
                let row = &mut rows[idx];
                if row.len() < new_row.len() {
                    row.resize(new_row.len(), Value::String(String::new()));
                }
                for (col, cell) in new_row.iter().enumerate() {
                    row[col] = cell.clone();
                }
            }
            UpdateValuesResponse {
                spreadsheet_id: None,
                updated_range: Some(format!("{}!A{start}", sheet_of(range))),
                updated_rows: Some(values.len() as u64),
                updated_columns: None,
                updated_cells: None,
            }
        })
    }
}

/// Split a range into an unquoted sheet name and optional start row.
///
/// Like the real service, a bare name is not taken as a sheet name since it
/// may also be a cell reference, so only quoted names are accepted.
fn split_range(range: &str) -> Result<(String, Option<usize>)> {
    let sheet = sheet_of(range)
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SheetsError::transport(format!("Unable to parse range: {range}")))?;
    Ok((sheet.replace("''", "'"), parse_start_row(range)))
}

/// Sheet part of a range, as written (still quoted).
fn sheet_of(range: &str) -> &str {
    match range.rfind('!') {
        Some(idx) => &range[..idx],
        None => range,
    }
}

impl SheetsService for FakeSheetsService {
    async fn get_values(&self, _spreadsheet_id: &str, range: &str) -> Result<ValueRange> {
        self.begin(Call::GetValues(range.to_string()))?;
        let values = self.with_rows(range, |rows, _| rows.clone())?;
        Ok(ValueRange {
            range: Some(range.to_string()),
            major_dimension: Some("ROWS".to_string()),
            values,
        })
    }

    async fn update_values(
        &self,
        _spreadsheet_id: &str,
        range: &str,
        values: ValueRange,
    ) -> Result<UpdateValuesResponse> {
        self.begin(Call::UpdateValues(range.to_string(), values.clone()))?;
        self.write_rows(range, &values.values)
    }

    async fn append_values(
        &self,
        _spreadsheet_id: &str,
        range: &str,
        values: ValueRange,
    ) -> Result<AppendValuesResponse> {
        self.begin(Call::AppendValues(range.to_string(), values.clone()))?;
        let start = self.with_rows(range, |rows, _| rows.len() + 1)?;
        let updates = self.write_rows(&format!("{}!A{start}", sheet_of(range)), &values.values)?;
        Ok(AppendValuesResponse {
            spreadsheet_id: None,
            table_range: None,
            updates: Some(updates),
        })
    }

    async fn batch_update_values(
        &self,
        _spreadsheet_id: &str,
        request: BatchUpdateValuesRequest,
    ) -> Result<BatchUpdateValuesResponse> {
        self.begin(Call::BatchUpdateValues(request.clone()))?;
        let mut responses = Vec::with_capacity(request.data.len());
        for vr in &request.data {
            let range = vr.range.clone().unwrap_or_default();
            responses.push(self.write_rows(&range, &vr.values)?);
        }
        Ok(BatchUpdateValuesResponse {
            total_updated_rows: Some(responses.len() as u64),
            responses,
            ..Default::default()
        })
    }

    async fn batch_update(
        &self,
        _spreadsheet_id: &str,
        request: BatchUpdateSpreadsheetRequest,
    ) -> Result<BatchUpdateSpreadsheetResponse> {
        self.begin(Call::BatchUpdate(request.clone()))?;
        let mut state = self.state.lock();
        let mut replies = Vec::new();
        for req in &request.requests {
            let SpreadsheetRequest::DeleteDimension(delete) = req;
            let (_, _, rows) = state
                .sheets
                .iter_mut()
                .find(|(id, _, _)| *id == delete.range.sheet_id)
                .ok_or_else(|| SheetsError::transport("No sheet with id"))?;
            let end = usize::min(delete.range.end_index, rows.len());
            if delete.range.start_index < end {
                rows.drain(delete.range.start_index..end);
            }
            replies.push(Value::Object(Default::default()));
        }
        Ok(BatchUpdateSpreadsheetResponse {
            spreadsheet_id: None,
            replies,
        })
    }

    async fn get_spreadsheet(&self, _spreadsheet_id: &str) -> Result<Spreadsheet> {
        self.begin(Call::GetSpreadsheet)?;
        let state = self.state.lock();
        let sheets = state
            .sheets
            .iter()
            .enumerate()
            .map(|(idx, (id, title, _))| Sheet {
                properties: SheetProperties {
                    sheet_id: *id,
                    title: title.clone(),
                    index: Some(idx as i64),
                },
            })
            .collect();
        Ok(Spreadsheet {
            spreadsheet_id: None,
            sheets,
        })
    }
}

/// Connector handing out a fixed fake service, recording the paths it was
/// asked to connect with.
#[derive(Debug, Default)]
pub struct FakeConnector {
    pub service: FakeSheetsService,
    pub fail_with: Option<String>,
    pub connected: Mutex<Vec<PathBuf>>,
}

impl ServiceConnector for FakeConnector {
    type Service = FakeSheetsService;

    async fn connect(&self, credentials_path: &Path) -> Result<Self::Service> {
        self.connected.lock().push(credentials_path.to_path_buf());
        match &self.fail_with {
            Some(msg) => Err(SheetsError::new(msg.clone())),
            None => Ok(self.service.clone()),
        }
    }
}
