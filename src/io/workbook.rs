use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use calamine::{DataType, Reader, Xlsx, open_workbook};
use rust_xlsxwriter::{DocProperties, Workbook};
use tracing::{debug, instrument};

use crate::error::{Result, SheetError};
use crate::io::{SheetReader, SheetWriter};
use crate::model::RawTable;

const WORKBOOK_EXTENSION: &str = "xlsx";
/// Manifest inside the store directory mapping spreadsheet ids to titles.
pub const TITLES_MANIFEST: &str = "titles.json";

/// A directory of `.xlsx` workbooks exposed as a sheet store.
///
/// Spreadsheet identifiers are file names relative to the directory (the
/// extension may be omitted) and ranges name a worksheet. Display titles of
/// created spreadsheets are kept in [`TITLES_MANIFEST`] so any store opened on
/// the same directory can rewrite them without losing the title.
#[derive(Debug, Clone)]
pub struct WorkbookStore {
    root: PathBuf,
}

impl WorkbookStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a spreadsheet identifier to its workbook path.
    pub fn path_for(&self, spreadsheet_id: &str) -> PathBuf {
        let path = self.root.join(spreadsheet_id);
        if path.extension().is_some() {
            path
        } else {
            path.with_extension(WORKBOOK_EXTENSION)
        }
    }

    /// Title the spreadsheet was created with, if this directory created it.
    pub fn title_of(&self, spreadsheet_id: &str) -> Result<Option<String>> {
        Ok(self.load_titles()?.remove(spreadsheet_id))
    }

    fn remember_title(&self, spreadsheet_id: &str, title: &str) -> Result<()> {
        let mut titles = self.load_titles()?;
        titles.insert(spreadsheet_id.to_string(), title.to_string());
        std::fs::write(
            self.root.join(TITLES_MANIFEST),
            serde_json::to_string_pretty(&titles)?,
        )?;
        Ok(())
    }

    fn load_titles(&self) -> Result<BTreeMap<String, String>> {
        let path = self.root.join(TITLES_MANIFEST);
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

#[async_trait]
impl SheetReader for WorkbookStore {
    #[instrument(level = "debug", skip(self))]
    async fn read_values(&self, sheet_id: &str, range: &str) -> Result<RawTable> {
        let path = self.path_for(sheet_id);
        if !path.exists() {
            return Err(SheetError::MissingInput(path));
        }
        read_rows(&path, range)
    }
}

#[async_trait]
impl SheetWriter for WorkbookStore {
    #[instrument(level = "debug", skip(self))]
    async fn create_spreadsheet(&self, title: &str, tab: &str) -> Result<String> {
        std::fs::create_dir_all(&self.root)?;
        let spreadsheet_id = uuid::Uuid::new_v4().simple().to_string();
        write_rows(&self.path_for(&spreadsheet_id), title, tab, &RawTable::new())?;
        self.remember_title(&spreadsheet_id, title)?;
        Ok(spreadsheet_id)
    }

    #[instrument(level = "debug", skip(self, rows), fields(row_count = rows.len()))]
    async fn write_values(&self, spreadsheet_id: &str, range: &str, rows: &RawTable) -> Result<()> {
        let path = self.path_for(spreadsheet_id);
        if !path.exists() {
            return Err(SheetError::MissingInput(path));
        }
        let title = self.title_of(spreadsheet_id)?.unwrap_or_default();
        write_rows(&path, &title, range, rows)
    }

    fn spreadsheet_url(&self, spreadsheet_id: &str) -> String {
        format!("file://{}", self.path_for(spreadsheet_id).display())
    }
}

/// Reads every row of the named worksheet as string cells, anchored at A1:
/// leading blank rows stay as empty rows and leading blank columns as empty
/// cells.
pub fn read_rows(path: &Path, sheet: &str) -> Result<RawTable> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range(sheet)
        .ok_or_else(|| SheetError::MissingSheet(sheet.to_string()))??;

    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut rows: RawTable = (0..start_row).map(|_| Vec::new()).collect();
    rows.extend(range.rows().map(|row| {
        let mut cells = vec![String::new(); start_col as usize];
        cells.extend(row.iter().map(|cell| cell_to_string(Some(cell))));
        cells
    }));
    debug!(row_count = rows.len(), "worksheet read");
    Ok(rows)
}

/// Writes `rows` as plain strings into a single-tab workbook at `path`.
pub fn write_rows(path: &Path, title: &str, sheet: &str, rows: &RawTable) -> Result<()> {
    let mut workbook = Workbook::new();
    if !title.is_empty() {
        workbook.set_properties(&DocProperties::new().set_title(title));
    }

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet)?;
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            worksheet.write_string(row_idx as u32, col_idx as u16, cell)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
