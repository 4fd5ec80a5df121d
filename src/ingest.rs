use tracing::{debug, info, instrument, warn};

use crate::error::{Result, SheetError};
use crate::io::SheetReader;
use crate::model::{RawTable, Record};

/// Fetches `range` of `sheet_id` and converts it into records.
///
/// Any failure of the store is reported as [`SheetError::Ingestion`].
#[instrument(level = "info", skip(reader))]
pub async fn ingest<R>(reader: &R, sheet_id: &str, range: &str) -> Result<Vec<Record>>
where
    R: SheetReader + ?Sized,
{
    let rows = reader.read_values(sheet_id, range).await.map_err(|err| {
        warn!(error = %err, "sheet read failed");
        SheetError::Ingestion(err.to_string())
    })?;
    debug!(row_count = rows.len(), "raw rows received");

    let records = records_from_rows(rows);
    info!(record_count = records.len(), "records ingested");
    Ok(records)
}

/// Uses the first row as header and zips every following row against it.
pub fn records_from_rows(rows: RawTable) -> Vec<Record> {
    let mut rows = rows.into_iter();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    rows.map(|row| Record::from_row(&header, &row)).collect()
}
