use std::path::PathBuf;

use clap::Parser;
use rowsheet_core::{RowData, SheetClientConfig};
use serde_json::Value;

/// Which sheet to operate on and how to authenticate.
#[derive(Debug, Clone, Parser)]
pub struct SheetArgs {
    /// Path to a service account key file.
    ///
    /// Defaults to `./credentials.json`.
    #[clap(long, env = "ROWSHEET_CREDENTIALS", value_parser)]
    pub credentials: Option<PathBuf>,

    /// Id of the spreadsheet, as found in its url.
    #[clap(long, env = "ROWSHEET_SPREADSHEET_ID")]
    pub spreadsheet_id: Option<String>,

    /// Name of the sheet (tab) within the spreadsheet.
    #[clap(long, env = "ROWSHEET_SHEET")]
    pub sheet: Option<String>,
}

impl SheetArgs {
    pub fn to_config(&self) -> SheetClientConfig {
        SheetClientConfig {
            credentials_path: self.credentials.clone(),
            spreadsheet_id: self.spreadsheet_id.clone(),
            sheet_name: self.sheet.clone(),
        }
    }
}

#[derive(Debug, Clone, Parser)]
pub struct FindArgs {
    #[clap(flatten)]
    pub sheet: SheetArgs,

    /// Row position to fetch (row 1 is the header).
    #[clap(required_unless_present = "filters", conflicts_with = "filters")]
    pub row: Option<usize>,

    /// Column filter of the form `Column=value`. May be repeated.
    #[clap(long = "where", value_name = "COLUMN=VALUE", value_parser = parse_key_value)]
    pub filters: Vec<(String, String)>,
}

#[derive(Debug, Clone, Parser)]
pub struct AddArgs {
    #[clap(flatten)]
    pub sheet: SheetArgs,

    /// Cell values of the form `Column=value`.
    #[clap(required = true, value_name = "COLUMN=VALUE", value_parser = parse_key_value)]
    pub values: Vec<(String, String)>,
}

#[derive(Debug, Clone, Parser)]
pub struct UpdateArgs {
    #[clap(flatten)]
    pub sheet: SheetArgs,

    /// Row positions to update.
    #[clap(required = true)]
    pub rows: Vec<usize>,

    /// Cell values to set, of the form `Column=value`. May be repeated.
    #[clap(long = "set", required = true, value_name = "COLUMN=VALUE", value_parser = parse_key_value)]
    pub values: Vec<(String, String)>,
}

#[derive(Debug, Clone, Parser)]
pub struct DeleteArgs {
    #[clap(flatten)]
    pub sheet: SheetArgs,

    /// Row positions to delete.
    #[clap(required = true)]
    pub rows: Vec<usize>,
}

#[derive(Debug, Clone, Parser)]
pub struct DriveLinkArgs {
    /// Google Drive share link.
    pub url: String,
}

/// Parse a `Key=value` argument. The value may contain further `=`.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!("expected COLUMN=VALUE, got '{s}'")),
    }
}

pub fn to_row_data(pairs: &[(String, String)]) -> RowData {
    pairs
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}
