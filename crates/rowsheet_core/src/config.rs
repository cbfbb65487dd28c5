use std::path::PathBuf;

use rowsheet_error::{Result, SheetsError};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CREDENTIALS_PATH: &str = "./credentials.json";

/// Input for constructing a sheet client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetClientConfig {
    /// Path to a service account key file. Defaults to
    /// `./credentials.json`.
    pub credentials_path: Option<PathBuf>,
    pub spreadsheet_id: Option<String>,
    pub sheet_name: Option<String>,
}

/// Config with required fields checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValidatedConfig {
    pub credentials_path: PathBuf,
    pub spreadsheet_id: String,
    pub sheet_name: String,
}

impl SheetClientConfig {
    pub fn new(spreadsheet_id: impl Into<String>, sheet_name: impl Into<String>) -> Self {
        SheetClientConfig {
            credentials_path: None,
            spreadsheet_id: Some(spreadsheet_id.into()),
            sheet_name: Some(sheet_name.into()),
        }
    }

    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<ValidatedConfig> {
        let spreadsheet_id = require_non_blank(self.spreadsheet_id.as_deref(), "spreadsheet_id")?;
        let sheet_name = require_non_blank(self.sheet_name.as_deref(), "sheet_name")?;
        let credentials_path = self
            .credentials_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH));

        Ok(ValidatedConfig {
            credentials_path,
            spreadsheet_id,
            sheet_name,
        })
    }
}

pub(crate) fn require_non_blank(value: Option<&str>, field: &'static str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.to_string()),
        _ => Err(SheetsError::configuration(format!("Missing required config field '{field}'"))
            .with_field("field", field)),
    }
}
