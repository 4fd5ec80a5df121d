use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, instrument};

use crate::config::{DashboardConfig, require};
use crate::error::{Result, SheetError};
use crate::io::{SheetReader, SheetWriter};
use crate::model::RawTable;

/// Root of the Sheets v4 REST API.
pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";
const SPREADSHEET_LINK_PREFIX: &str = "https://docs.google.com/spreadsheets/d";

/// Read-only client for the hosted spreadsheet service, authenticated by API
/// key.
#[derive(Debug, Clone)]
pub struct GoogleSheets {
    client: Client,
    base_url: String,
    config: DashboardConfig,
}

impl GoogleSheets {
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// Points the client at another API root, e.g. a local stand-in service.
    pub fn with_base_url(config: &DashboardConfig, base_url: impl Into<String>) -> Result<Self> {
        require("apiKey", &config.api_key)?;
        Ok(Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            config: config.clone(),
        })
    }

    /// One-time client initialisation for the write path.
    ///
    /// Validates the OAuth settings, loads the service discovery document and
    /// hands back a handle carrying the user's access token.
    #[instrument(level = "info", skip_all, fields(client_id = %self.config.client_id))]
    pub async fn authorize(&self, access_token: impl Into<String>) -> Result<AuthorizedSheets> {
        self.config.validate_write()?;
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(SheetError::NotAuthorized("missing access token".into()));
        }

        let url = format!("{}/$discovery/rest", self.base_url);
        let request = self
            .client
            .get(&url)
            .query(&[("version", "v4"), ("key", self.config.api_key.as_str())]);
        let discovery: Value = send(request)
            .await
            .map_err(|err| SheetError::NotAuthorized(err.to_string()))?
            .json()
            .await
            .map_err(|err| SheetError::NotAuthorized(err.to_string()))?;
        let service = discovery
            .get("name")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        debug!(service, "discovery document loaded");
        info!("sheets client initialised");

        Ok(AuthorizedSheets {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            access_token,
        })
    }
}

#[async_trait]
impl SheetReader for GoogleSheets {
    #[instrument(level = "debug", skip(self))]
    async fn read_values(&self, sheet_id: &str, range: &str) -> Result<RawTable> {
        let url = values_url(&self.base_url, sheet_id, range);
        let request = self
            .client
            .get(&url)
            .query(&[("key", self.config.api_key.as_str())]);
        let body: ValueRange = send(request).await?.json().await?;
        rows_from_values(body.values)
    }
}

/// Write-capable handle produced by [`GoogleSheets::authorize`].
#[derive(Debug, Clone)]
pub struct AuthorizedSheets {
    client: Client,
    base_url: String,
    access_token: String,
}

#[async_trait]
impl SheetWriter for AuthorizedSheets {
    #[instrument(level = "debug", skip(self))]
    async fn create_spreadsheet(&self, title: &str, tab: &str) -> Result<String> {
        let url = format!("{}/v4/spreadsheets", self.base_url);
        let body = json!({
            "properties": { "title": title },
            "sheets": [{ "properties": { "title": tab } }],
        });
        let request = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body);
        let created: SpreadsheetCreated = send(request).await?.json().await?;
        Ok(created.spreadsheet_id)
    }

    #[instrument(level = "debug", skip(self, rows), fields(row_count = rows.len()))]
    async fn write_values(&self, spreadsheet_id: &str, range: &str, rows: &RawTable) -> Result<()> {
        let url = values_url(&self.base_url, spreadsheet_id, range);
        let request = self
            .client
            .put(&url)
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "range": range, "values": rows }));
        send(request).await?;
        Ok(())
    }

    fn spreadsheet_url(&self, spreadsheet_id: &str) -> String {
        format!("{SPREADSHEET_LINK_PREFIX}/{spreadsheet_id}")
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpreadsheetCreated {
    spreadsheet_id: String,
}

fn values_url(base_url: &str, spreadsheet_id: &str, range: &str) -> String {
    format!(
        "{base_url}/v4/spreadsheets/{}/values/{}",
        urlencoding::encode(spreadsheet_id),
        urlencoding::encode(range)
    )
}

async fn send(request: RequestBuilder) -> Result<Response> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SheetError::Api {
        status: status.as_u16(),
        body,
    })
}

/// Converts the `values` member of a value range into string cells.
fn rows_from_values(values: Vec<Vec<Value>>) -> Result<RawTable> {
    values
        .into_iter()
        .enumerate()
        .map(|(row_idx, row)| {
            row.into_iter()
                .map(|cell| match cell {
                    Value::String(text) => Ok(text),
                    Value::Number(number) => Ok(number.to_string()),
                    Value::Bool(flag) => Ok(flag.to_string()),
                    Value::Null => Ok(String::new()),
                    other => Err(SheetError::MalformedResponse(format!(
                        "unexpected cell {other} in row {row_idx}"
                    ))),
                })
                .collect()
        })
        .collect()
}
