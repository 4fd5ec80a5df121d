use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, SheetError>;

/// Error type covering the different failure cases that can occur when the
/// dashboard loads, queries, or exports sheet data.
#[derive(Debug, Error)]
pub enum SheetError {
    /// Wrapper for IO failures such as reading configuration files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport level failures talking to the spreadsheet service.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The spreadsheet service answered with a non-success status.
    #[error("spreadsheet service returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The service answered, but not with the shape we expect.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a workbook does not contain the requested tab.
    #[error("missing sheet '{0}'")]
    MissingSheet(String),

    /// Reading the source sheet failed; the previous data set stays in place.
    #[error("error fetching sheet data: {0}")]
    Ingestion(String),

    /// Creating the export spreadsheet failed.
    #[error("error creating export spreadsheet: {0}")]
    ExportCreate(String),

    /// The export spreadsheet was created but writing the rows failed.
    #[error("error writing export data: {0}")]
    ExportWrite(String),

    /// Export was requested while the working view is empty.
    #[error("no data to export")]
    NothingToExport,

    /// Export was requested while a previous export is still running.
    #[error("an export is already in progress")]
    ExportInProgress,

    /// Raised when the configuration is missing a required value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Raised when the write client could not be initialised.
    #[error("sheets client not authorized: {0}")]
    NotAuthorized(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl SheetError {
    /// Returns `true` for errors that are user-facing signals rather than
    /// system failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, SheetError::NothingToExport | SheetError::ExportInProgress)
    }
}
