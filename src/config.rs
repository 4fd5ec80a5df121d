use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, SheetError};
use crate::export::ExportHeader;
use crate::view::SortMode;

/// Range read from the source sheet and written in exports.
pub const DEFAULT_RANGE: &str = "user_mock_data";
/// Display title of spreadsheets created by an export.
pub const DEFAULT_EXPORT_TITLE: &str = "Filtered Data Sheet";
/// OAuth scopes needed to create and write spreadsheets.
pub const DEFAULT_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

/// Static configuration injected at startup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardConfig {
    pub sheet_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_range")]
    pub range: String,
    #[serde(default = "default_export_title")]
    pub export_title: String,
    #[serde(default = "default_range")]
    pub export_tab: String,
    #[serde(default)]
    pub sort_mode: SortMode,
    #[serde(default)]
    pub export_header: ExportHeader,
}

impl DashboardConfig {
    /// Builds a configuration with defaults for everything but the sheet.
    pub fn new(sheet_id: impl Into<String>) -> Self {
        Self {
            sheet_id: sheet_id.into(),
            api_key: String::new(),
            client_id: String::new(),
            scopes: default_scopes(),
            range: default_range(),
            export_title: default_export_title(),
            export_tab: default_range(),
            sort_mode: SortMode::default(),
            export_header: ExportHeader::default(),
        }
    }

    /// Loads a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SheetError::MissingInput(path.to_path_buf()));
        }
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Checks the values needed to read the source sheet.
    pub fn validate_read(&self) -> Result<()> {
        require("sheetId", &self.sheet_id)?;
        require("range", &self.range)
    }

    /// Checks the values needed before a write client may be initialised.
    pub fn validate_write(&self) -> Result<()> {
        require("clientId", &self.client_id)?;
        if self.scopes.iter().all(|scope| scope.trim().is_empty()) {
            return Err(SheetError::InvalidConfig("scopes must not be empty".into()));
        }
        require("exportTitle", &self.export_title)?;
        require("exportTab", &self.export_tab)
    }
}

pub(crate) fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(SheetError::InvalidConfig(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|scope| scope.to_string()).collect()
}

fn default_range() -> String {
    DEFAULT_RANGE.to_string()
}

fn default_export_title() -> String {
    DEFAULT_EXPORT_TITLE.to_string()
}
