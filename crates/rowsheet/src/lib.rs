//! Row oriented create/read/update/delete over a single Google sheet.
//!
//! ```no_run
//! use rowsheet::{RowQuery, SheetClient, SheetClientConfig};
//! use rowsheet::http::reqwest_client::ReqwestClient;
//! use rowsheet::http::sheets::GoogleSheetsConnector;
//!
//! # async fn run() -> rowsheet::Result<()> {
//! let config = SheetClientConfig::new("spreadsheet-id", "Sheet1");
//! let connector = GoogleSheetsConnector::new(ReqwestClient::default())?;
//! let client = SheetClient::create(&config, &connector).await?;
//! let rows = client.find_row(RowQuery::Index(2)).await?;
//! # let _ = rows;
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod commands;

pub use rowsheet_core::{
    AddedRow,
    DeletedRows,
    FoundRow,
    RowData,
    RowIndexes,
    RowQuery,
    SheetClient,
    SheetClientConfig,
    convert_drive_link,
    convert_drive_link_value,
};
pub use rowsheet_error::{ErrorKind, Result, SheetsError};
pub use rowsheet_http as http;
