//! Sheets v4 REST implementation of the sheets service.
//!
//! See <https://developers.google.com/sheets/api/reference/rest>

use std::path::Path;

use reqwest::{Method, Request};
use rowsheet_core::service::{
    AppendValuesResponse,
    BatchUpdateSpreadsheetRequest,
    BatchUpdateSpreadsheetResponse,
    BatchUpdateValuesRequest,
    BatchUpdateValuesResponse,
    ServiceConnector,
    SheetsService,
    Spreadsheet,
    UpdateValuesResponse,
    ValueInputOption,
    ValueRange,
};
use rowsheet_error::{Result, ResultExt, SheetsError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::client::{HttpClient, read_checked_json_response, set_bearer_auth, set_json_body};
use crate::credentials::{SPREADSHEETS_SCOPE, ServiceAccount};

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/";

#[derive(Debug, Clone)]
pub struct GoogleSheetsService<C: HttpClient> {
    client: C,
    base_url: Url,
    access_token: String,
}

impl<C> GoogleSheetsService<C>
where
    C: HttpClient,
{
    pub fn new(client: C, base_url: Url, access_token: impl Into<String>) -> Self {
        GoogleSheetsService {
            client,
            base_url,
            access_token: access_token.into(),
        }
    }

    /// Build `{base}/v4/spreadsheets/{id}` with extra path segments appended.
    ///
    /// Segments are percent encoded, so ranges with spaces or quotes are safe
    /// to pass as is.
    fn spreadsheet_url(&self, spreadsheet_id: &str, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| SheetsError::new("Base url cannot be a base"))?;
            path.pop_if_empty().extend(["v4", "spreadsheets", spreadsheet_id]);
            path.extend(segments);
        }
        Ok(url)
    }

    async fn send<T>(&self, method: Method, url: Url, body: Option<&impl Serialize>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        debug!(%method, %url, "sheets request");
        let mut request = Request::new(method, url);
        set_bearer_auth(&mut request, &self.access_token)?;
        if let Some(body) = body {
            set_json_body(&mut request, body)?;
        }

        let resp = self.client.do_request(request).await?;
        read_checked_json_response(resp).await
    }
}

/// Request body that serializes to nothing, for calls without a body.
const NO_BODY: Option<&()> = None;

impl<C> SheetsService for GoogleSheetsService<C>
where
    C: HttpClient,
{
    async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRange> {
        let url = self.spreadsheet_url(spreadsheet_id, &["values", range])?;
        self.send(Method::GET, url, NO_BODY).await
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: ValueRange,
    ) -> Result<UpdateValuesResponse> {
        let mut url = self.spreadsheet_url(spreadsheet_id, &["values", range])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", ValueInputOption::UserEntered.as_str());
        self.send(Method::PUT, url, Some(&values)).await
    }

    async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: ValueRange,
    ) -> Result<AppendValuesResponse> {
        let segment = format!("{range}:append");
        let mut url = self.spreadsheet_url(spreadsheet_id, &["values", &segment])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", ValueInputOption::UserEntered.as_str())
            .append_pair("insertDataOption", "INSERT_ROWS");
        self.send(Method::POST, url, Some(&values)).await
    }

    async fn batch_update_values(
        &self,
        spreadsheet_id: &str,
        request: BatchUpdateValuesRequest,
    ) -> Result<BatchUpdateValuesResponse> {
        let url = self.spreadsheet_url(spreadsheet_id, &["values:batchUpdate"])?;
        self.send(Method::POST, url, Some(&request)).await
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        request: BatchUpdateSpreadsheetRequest,
    ) -> Result<BatchUpdateSpreadsheetResponse> {
        let mut url = self.spreadsheet_url(spreadsheet_id, &[])?;
        // The batch update method is a suffix on the id segment.
        url.path_segments_mut()
            .map_err(|_| SheetsError::new("Base url cannot be a base"))?
            .pop()
            .push(&format!("{spreadsheet_id}:batchUpdate"));
        self.send(Method::POST, url, Some(&request)).await
    }

    async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<Spreadsheet> {
        let mut url = self.spreadsheet_url(spreadsheet_id, &[])?;
        url.query_pairs_mut()
            .append_pair("fields", "spreadsheetId,sheets.properties");
        self.send(Method::GET, url, NO_BODY).await
    }
}

/// Connects to the Sheets API using a service account key file.
#[derive(Debug, Clone)]
pub struct GoogleSheetsConnector<C: HttpClient> {
    client: C,
    base_url: Url,
}

impl<C> GoogleSheetsConnector<C>
where
    C: HttpClient,
{
    pub fn new(client: C) -> Result<Self> {
        let base_url = Url::parse(DEFAULT_BASE_URL).context("Failed to parse base url")?;
        Ok(GoogleSheetsConnector { client, base_url })
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }
}

impl<C> ServiceConnector for GoogleSheetsConnector<C>
where
    C: HttpClient,
{
    type Service = GoogleSheetsService<C>;

    async fn connect(&self, credentials_path: &Path) -> Result<Self::Service> {
        let account = ServiceAccount::try_from_path(credentials_path)?;
        let token = account
            .fetch_access_token(&self.client, SPREADSHEETS_SCOPE)
            .await?;
        debug!(expires_in = token.expires_in, "fetched sheets access token");

        Ok(GoogleSheetsService::new(
            self.client.clone(),
            self.base_url.clone(),
            token.access_token,
        ))
    }
}
