//! Row oriented access to a single sheet of a spreadsheet.
//!
//! The header row (row 1) provides column names, data rows are exposed as maps
//! from column name to cell value.

pub mod client;
pub mod config;
pub mod drive_link;
pub mod range;
pub mod row;
pub mod service;

#[cfg(test)]
pub(crate) mod testutil;

pub use client::SheetClient;
pub use config::SheetClientConfig;
pub use drive_link::{convert_drive_link, convert_drive_link_value};
pub use row::{AddedRow, DeletedRows, FoundRow, RowData, RowIndexes, RowQuery};
pub use service::{ServiceConnector, SheetsService};
