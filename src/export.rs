use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::{Result, SheetError};
use crate::io::SheetWriter;
use crate::model::{ExportResult, RawTable, Record};

/// How the header row of an export is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportHeader {
    /// Field names of the first record only; fields other records add are lost.
    FirstRecord,
    /// Every field seen in the view, in order of first appearance.
    #[default]
    Union,
}

/// Where and how an export is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub title: String,
    pub tab: String,
    pub header: ExportHeader,
}

/// Rejects an empty view before anything is sent to the store.
pub fn ensure_exportable(records: &[Record]) -> Result<()> {
    if records.is_empty() {
        Err(SheetError::NothingToExport)
    } else {
        Ok(())
    }
}

/// Computes the header row for `records`.
pub fn export_header(records: &[Record], policy: ExportHeader) -> Vec<String> {
    match policy {
        ExportHeader::FirstRecord => records
            .first()
            .map(|record| record.keys().map(str::to_string).collect())
            .unwrap_or_default(),
        ExportHeader::Union => {
            let mut header: Vec<String> = Vec::new();
            for key in records.iter().flat_map(|record| record.keys()) {
                if !header.iter().any(|existing| existing == key) {
                    header.push(key.to_string());
                }
            }
            header
        }
    }
}

/// Header row followed by one row per record, cells in header order.
pub fn build_payload(records: &[Record], policy: ExportHeader) -> RawTable {
    let header = export_header(records, policy);
    let mut rows = Vec::with_capacity(records.len() + 1);
    for record in records {
        rows.push(
            header
                .iter()
                .map(|field| record.get(field).unwrap_or_default().to_string())
                .collect(),
        );
    }
    rows.insert(0, header);
    rows
}

/// Creates a new spreadsheet and writes the records into it.
///
/// Every successful call creates another spreadsheet; callers guard against
/// duplicate invocation.
#[instrument(
    level = "info",
    skip_all,
    fields(title = %options.title, tab = %options.tab, record_count = records.len())
)]
pub async fn export_view<W>(
    writer: &W,
    records: &[Record],
    options: &ExportOptions,
) -> Result<ExportResult>
where
    W: SheetWriter + ?Sized,
{
    ensure_exportable(records)?;
    let payload = build_payload(records, options.header);

    let spreadsheet_id = writer
        .create_spreadsheet(&options.title, &options.tab)
        .await
        .map_err(|err| {
            warn!(error = %err, "spreadsheet creation failed");
            SheetError::ExportCreate(err.to_string())
        })?;
    info!(%spreadsheet_id, "created export spreadsheet");

    writer
        .write_values(&spreadsheet_id, &options.tab, &payload)
        .await
        .map_err(|err| {
            warn!(error = %err, %spreadsheet_id, "writing export data failed");
            SheetError::ExportWrite(err.to_string())
        })?;

    let url = writer.spreadsheet_url(&spreadsheet_id);
    info!(%url, row_count = records.len(), "data exported");
    Ok(ExportResult {
        spreadsheet_id,
        url,
        row_count: records.len(),
    })
}
