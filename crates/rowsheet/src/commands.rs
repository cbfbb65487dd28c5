use clap::Subcommand;
use rowsheet_core::{RowIndexes, RowQuery, SheetClient, SheetsService, convert_drive_link};
use rowsheet_error::{Result, ResultExt, SheetsError};
use rowsheet_http::reqwest_client::ReqwestClient;
use rowsheet_http::sheets::{GoogleSheetsConnector, GoogleSheetsService};
use serde_json::{Value, json};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::args::{
    AddArgs,
    DeleteArgs,
    DriveLinkArgs,
    FindArgs,
    SheetArgs,
    UpdateArgs,
    to_row_data,
};

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find rows by position or by column values.
    Find(FindArgs),
    /// Append a row, adding new columns to the header as needed.
    Add(AddArgs),
    /// Set columns on one or more rows.
    Update(UpdateArgs),
    /// Delete one or more rows.
    Delete(DeleteArgs),
    /// Convert a Google Drive share link into a direct link.
    DriveLink(DriveLinkArgs),
}

impl Commands {
    /// Run the command, returning the json value to print.
    pub fn run(self) -> Result<Value> {
        match self {
            Commands::DriveLink(args) => Ok(Value::String(convert_drive_link(&args.url))),
            command => {
                let runtime = build_runtime()?;
                runtime.block_on(command.run_remote())
            }
        }
    }

    async fn run_remote(self) -> Result<Value> {
        let sheet = match &self {
            Commands::Find(args) => &args.sheet,
            Commands::Add(args) => &args.sheet,
            Commands::Update(args) => &args.sheet,
            Commands::Delete(args) => &args.sheet,
            Commands::DriveLink(_) => {
                return Err(SheetsError::new("drive-link does not use a sheet"));
            }
        };
        let client = connect(sheet).await?;
        self.execute(&client).await
    }

    /// Execute the command against a connected client.
    pub async fn execute<S>(self, client: &SheetClient<S>) -> Result<Value>
    where
        S: SheetsService,
    {
        let value = match self {
            Commands::Find(args) => {
                let query = match args.row {
                    Some(row) => RowQuery::Index(row),
                    None => RowQuery::Match(to_row_data(&args.filters)),
                };
                let rows = client.find_row(query).await?;
                serde_json::to_value(rows).context("Failed to encode found rows")?
            }
            Commands::Add(args) => {
                let added = client.add_row(to_row_data(&args.values)).await?;
                serde_json::to_value(added).context("Failed to encode added row")?
            }
            Commands::Update(args) => {
                let resp = client
                    .update_row(RowIndexes(args.rows), to_row_data(&args.values))
                    .await?;
                serde_json::to_value(resp).context("Failed to encode update response")?
            }
            Commands::Delete(args) => {
                let deleted = client.delete_row(RowIndexes(args.rows)).await?;
                json!({ "countOfDeletedRows": deleted.count })
            }
            Commands::DriveLink(args) => Value::String(convert_drive_link(&args.url)),
        };
        Ok(value)
    }
}

async fn connect(args: &SheetArgs) -> Result<SheetClient<GoogleSheetsService<ReqwestClient>>> {
    let config = args.to_config();
    let connector = GoogleSheetsConnector::new(ReqwestClient::default())?;
    let client = SheetClient::create(&config, &connector).await?;
    debug!(
        spreadsheet_id = client.spreadsheet_id(),
        sheet = client.sheet_name(),
        "connected"
    );
    Ok(client)
}

fn build_runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .thread_name("rowsheet")
        .build()
        .context("Failed to build tokio runtime")
}
