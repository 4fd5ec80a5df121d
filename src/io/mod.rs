//! Adapters for the stores sheet data is read from and exported to.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::RawTable;

pub mod google;
pub mod workbook;

/// Read side of a sheet store.
#[async_trait]
pub trait SheetReader: Send + Sync {
    /// Returns the raw rows of `range` in the spreadsheet `sheet_id`. An empty
    /// range yields an empty table.
    async fn read_values(&self, sheet_id: &str, range: &str) -> Result<RawTable>;
}

/// Write side of a sheet store.
#[async_trait]
pub trait SheetWriter: Send + Sync {
    /// Creates a spreadsheet with a single tab and returns its identifier.
    async fn create_spreadsheet(&self, title: &str, tab: &str) -> Result<String>;

    /// Writes `rows` verbatim (no formula evaluation) into `range`.
    async fn write_values(&self, spreadsheet_id: &str, range: &str, rows: &RawTable)
    -> Result<()>;

    /// Link a user can open to view the spreadsheet.
    fn spreadsheet_url(&self, spreadsheet_id: &str) -> String;
}
