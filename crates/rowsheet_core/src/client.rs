use rowsheet_error::{ErrorKind, Result, SheetsError};
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::config::{SheetClientConfig, require_non_blank};
use crate::range::{parse_start_row, row_range, sheet_range};
use crate::row::{
    AddedRow,
    DeletedRows,
    FoundRow,
    RowData,
    RowIndexes,
    RowQuery,
    read_headers,
    row_matches,
    validate_data_row,
    validate_keys,
    zip_row,
};
use crate::service::{
    BatchUpdateSpreadsheetRequest,
    BatchUpdateValuesRequest,
    BatchUpdateValuesResponse,
    DeleteDimensionRequest,
    Dimension,
    DimensionRange,
    ServiceConnector,
    SheetsService,
    SpreadsheetRequest,
    ValueInputOption,
    ValueRange,
};

/// Row oriented client for a single sheet.
///
/// Row 1 of the sheet is the header row and defines the column names. Nothing
/// is cached, every operation reads the current state of the sheet first.
#[derive(Debug)]
pub struct SheetClient<S: SheetsService> {
    spreadsheet_id: String,
    sheet_name: String,
    service: S,
}

impl<S> SheetClient<S>
where
    S: SheetsService,
{
    /// Validate the config and connect to the service using its credentials.
    ///
    /// Missing config fields fail before the connector is used.
    pub async fn create<C>(config: &SheetClientConfig, connector: &C) -> Result<Self>
    where
        C: ServiceConnector<Service = S>,
    {
        let config = config.validate()?;
        debug!(
            spreadsheet_id = %config.spreadsheet_id,
            sheet = %config.sheet_name,
            credentials = %config.credentials_path.display(),
            "connecting sheet client"
        );

        let service = connector
            .connect(&config.credentials_path)
            .await
            .map_err(|e| {
                SheetsError::with_source("Failed to initialize sheets service", Box::new(e))
                    .with_kind(ErrorKind::Initialization)
                    .with_field("credentials", config.credentials_path.display())
            })?;

        Ok(SheetClient {
            spreadsheet_id: config.spreadsheet_id,
            sheet_name: config.sheet_name,
            service,
        })
    }

    /// Create a client from an already authenticated service.
    pub fn new(
        service: S,
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
    ) -> Result<Self> {
        let spreadsheet_id: String = spreadsheet_id.into();
        let sheet_name: String = sheet_name.into();
        let spreadsheet_id = require_non_blank(Some(spreadsheet_id.as_str()), "spreadsheet_id")?;
        let sheet_name = require_non_blank(Some(sheet_name.as_str()), "sheet_name")?;
        Ok(SheetClient {
            spreadsheet_id,
            sheet_name,
            service,
        })
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Find rows by position or by matching column values.
    ///
    /// A position past the end of the sheet yields no rows. When matching,
    /// string cells are comma separated tag lists compared case insensitively.
    pub async fn find_row(&self, query: impl Into<RowQuery>) -> Result<Vec<FoundRow>> {
        self.find_row_inner(query.into())
            .await
            .map_err(|e| e.wrap("Failed to find row"))
    }

    /// Append a row, extending the header row with any new column names.
    pub async fn add_row(&self, row_data: RowData) -> Result<AddedRow> {
        self.add_row_inner(row_data)
            .await
            .map_err(|e| e.wrap("Failed to add row"))
    }

    /// Overwrite the given columns of one or more rows, leaving other columns
    /// untouched.
    pub async fn update_row(
        &self,
        row_indexes: impl Into<RowIndexes>,
        row_data: RowData,
    ) -> Result<BatchUpdateValuesResponse> {
        self.update_row_inner(row_indexes.into(), row_data)
            .await
            .map_err(|e| e.wrap("Failed to update row"))
    }

    /// Delete one or more rows.
    pub async fn delete_row(&self, row_indexes: impl Into<RowIndexes>) -> Result<DeletedRows> {
        self.delete_row_inner(row_indexes.into())
            .await
            .map_err(|e| e.wrap("Failed to delete row"))
    }

    /// Resolve the numeric id of the configured sheet.
    pub async fn sheet_id(&self) -> Result<i64> {
        let spreadsheet = self.service.get_spreadsheet(&self.spreadsheet_id).await?;
        spreadsheet
            .sheets
            .iter()
            .find(|s| s.properties.title == self.sheet_name)
            .map(|s| s.properties.sheet_id)
            .ok_or_else(|| {
                SheetsError::lookup("Sheet not found in spreadsheet")
                    .with_field("sheet", &self.sheet_name)
                    .with_field("spreadsheet_id", &self.spreadsheet_id)
            })
    }

    async fn find_row_inner(&self, query: RowQuery) -> Result<Vec<FoundRow>> {
        match query {
            RowQuery::Index(idx) => {
                validate_data_row(idx)?;
                let values = self.read_values().await?;
                let headers = read_headers(&values)?;
                let found = match values.get(idx - 1) {
                    Some(row) => vec![FoundRow {
                        row_index: idx,
                        data: zip_row(&headers, row),
                    }],
                    None => Vec::new(),
                };
                Ok(found)
            }
            RowQuery::Match(query) => {
                validate_keys(query.keys())?;
                let values = self.read_values().await?;
                let headers = read_headers(&values)?;

                let found = values
                    .iter()
                    .enumerate()
                    .skip(1)
                    .filter(|(_, row)| row_matches(&headers, row, &query))
                    .map(|(idx, row)| FoundRow {
                        row_index: idx + 1,
                        data: zip_row(&headers, row),
                    })
                    .collect();

                Ok(found)
            }
        }
    }

    async fn add_row_inner(&self, row_data: RowData) -> Result<AddedRow> {
        if row_data.is_empty() {
            return Err(SheetsError::validation("No row data provided"));
        }
        validate_keys(row_data.keys())?;

        let values = self.read_values().await?;
        let mut headers = read_headers(&values)?;
        let header_range = sheet_range(&self.sheet_name, Some("A1"));

        if headers.is_empty() {
            headers = row_data.keys().cloned().collect();
            debug!(columns = headers.len(), "writing header row to empty sheet");
            let update = ValueRange::new(&header_range, vec![string_cells(&headers)]);
            self.service
                .update_values(&self.spreadsheet_id, &header_range, update)
                .await?;
        } else {
            let new_columns: Vec<String> = row_data
                .keys()
                .filter(|k| !headers.contains(k))
                .cloned()
                .collect();

            if !new_columns.is_empty() {
                debug!(?new_columns, "extending header row");
                headers.extend(new_columns);

                // Columns are positional, so rewrite the header along with
                // every existing row.
                let mut rows = Vec::with_capacity(values.len());
                rows.push(string_cells(&headers));
                rows.extend(values.iter().skip(1).cloned());
                let update = ValueRange::new(&header_range, rows);
                self.service
                    .update_values(&self.spreadsheet_id, &header_range, update)
                    .await?;
            }
        }

        let new_row: Vec<Value> = headers
            .iter()
            .map(|h| {
                row_data
                    .get(h)
                    .cloned()
                    .unwrap_or_else(|| Value::String(String::new()))
            })
            .collect();

        let append = ValueRange::new(&header_range, vec![new_row]);
        let resp = self
            .service
            .append_values(&self.spreadsheet_id, &header_range, append)
            .await?;

        let row_index = resp
            .updates
            .and_then(|u| u.updated_range)
            .and_then(|r| parse_start_row(&r))
            .unwrap_or_else(|| usize::max(values.len(), 1) + 1);
        debug!(%row_index, "appended row");

        Ok(AddedRow {
            row_index,
            row_data,
        })
    }

    async fn update_row_inner(
        &self,
        row_indexes: RowIndexes,
        row_data: RowData,
    ) -> Result<BatchUpdateValuesResponse> {
        row_indexes.validate_data_rows()?;
        validate_keys(row_data.keys())?;

        let values = self.read_values().await?;
        let headers = read_headers(&values)?;

        let mut columns = Vec::with_capacity(row_data.len());
        for (key, value) in &row_data {
            match headers.iter().position(|h| h == key) {
                Some(col) => columns.push((col, value)),
                None => warn!(column = %key, "column not in header row, skipping"),
            }
        }

        let data = row_indexes
            .as_slice()
            .iter()
            .map(|&idx| {
                let mut row = values.get(idx - 1).cloned().unwrap_or_default();
                for &(col, value) in &columns {
                    if row.len() <= col {
                        row.resize(col + 1, Value::String(String::new()));
                    }
                    row[col] = value.clone();
                }
                ValueRange::new(row_range(&self.sheet_name, idx), vec![row])
            })
            .collect();

        let request = BatchUpdateValuesRequest {
            value_input_option: ValueInputOption::UserEntered,
            data,
        };
        debug!(rows = request.data.len(), "updating rows");

        self.service
            .batch_update_values(&self.spreadsheet_id, request)
            .await
    }

    async fn delete_row_inner(&self, row_indexes: RowIndexes) -> Result<DeletedRows> {
        row_indexes.validate_data_rows()?;

        // Highest first so earlier deletes don't shift later ones.
        let mut indexes = row_indexes.into_vec();
        indexes.sort_unstable_by(|a, b| b.cmp(a));
        indexes.dedup();

        let sheet_id = self.sheet_id().await?;
        let requests = indexes
            .iter()
            .map(|&idx| {
                SpreadsheetRequest::DeleteDimension(DeleteDimensionRequest {
                    range: DimensionRange {
                        sheet_id,
                        dimension: Dimension::Rows,
                        start_index: idx - 1,
                        end_index: idx,
                    },
                })
            })
            .collect();

        debug!(%sheet_id, ?indexes, "deleting rows");
        let resp = self
            .service
            .batch_update(
                &self.spreadsheet_id,
                BatchUpdateSpreadsheetRequest { requests },
            )
            .await?;

        Ok(DeletedRows {
            count: resp.replies.len(),
        })
    }

    async fn read_values(&self) -> Result<Vec<Vec<Value>>> {
        let range = sheet_range(&self.sheet_name, None);
        let resp = self
            .service
            .get_values(&self.spreadsheet_id, &range)
            .await?;
        trace!(%range, rows = resp.values.len(), "read values");
        Ok(resp.values)
    }
}

fn string_cells(names: &[String]) -> Vec<Value> {
    names.iter().map(|n| Value::String(n.clone())).collect()
}
