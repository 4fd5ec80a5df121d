#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use sheet_dashboard::io::{SheetReader, SheetWriter};
use sheet_dashboard::model::{RawTable, Record};
use sheet_dashboard::{Result, SheetError};
use tokio::sync::oneshot;

pub fn raw(rows: &[&[&str]]) -> RawTable {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

pub fn record(fields: &[(&str, &str)]) -> Record {
    fields.iter().copied().collect()
}

pub fn people() -> RawTable {
    raw(&[&["name", "age"], &["Al", "30"], &["Bo", "25"]])
}

pub fn names(records: &[Record]) -> Vec<&str> {
    records
        .iter()
        .map(|record| record.get("name").unwrap_or_default())
        .collect()
}

/// In-memory store recording every remote call.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub table: Mutex<RawTable>,
    pub reads: AtomicUsize,
    pub created: Mutex<Vec<(String, String)>>,
    pub written: Mutex<Vec<(String, String, RawTable)>>,
    pub fail_read: Mutex<bool>,
    pub fail_create: bool,
    pub fail_write: bool,
}

impl MemoryStore {
    pub fn with_table(table: RawTable) -> Self {
        Self {
            table: Mutex::new(table),
            ..Self::default()
        }
    }

    pub fn set_table(&self, table: RawTable) {
        *self.table.lock().unwrap() = table;
    }

    pub fn set_fail_read(&self, fail: bool) {
        *self.fail_read.lock().unwrap() = fail;
    }

    pub fn created(&self) -> Vec<(String, String)> {
        self.created.lock().unwrap().clone()
    }

    pub fn written(&self) -> Vec<(String, String, RawTable)> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl SheetReader for MemoryStore {
    async fn read_values(&self, _sheet_id: &str, _range: &str) -> Result<RawTable> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if *self.fail_read.lock().unwrap() {
            return Err(SheetError::Api {
                status: 403,
                body: "permission denied".into(),
            });
        }
        Ok(self.table.lock().unwrap().clone())
    }
}

#[async_trait]
impl SheetWriter for MemoryStore {
    async fn create_spreadsheet(&self, title: &str, tab: &str) -> Result<String> {
        if self.fail_create {
            return Err(SheetError::Api {
                status: 500,
                body: "backend error".into(),
            });
        }
        let mut created = self.created.lock().unwrap();
        created.push((title.to_string(), tab.to_string()));
        Ok(format!("sheet-{}", created.len()))
    }

    async fn write_values(&self, spreadsheet_id: &str, range: &str, rows: &RawTable) -> Result<()> {
        if self.fail_write {
            return Err(SheetError::Api {
                status: 400,
                body: "bad range".into(),
            });
        }
        self.written
            .lock()
            .unwrap()
            .push((spreadsheet_id.to_string(), range.to_string(), rows.clone()));
        Ok(())
    }

    fn spreadsheet_url(&self, spreadsheet_id: &str) -> String {
        format!("memory://{spreadsheet_id}")
    }
}

/// Reader whose first call waits until released; later calls answer at once.
pub struct GatedReader {
    pub first: RawTable,
    pub later: RawTable,
    calls: AtomicUsize,
    gate: tokio::sync::Mutex<Option<oneshot::Receiver<()>>>,
}

impl GatedReader {
    pub fn new(first: RawTable, later: RawTable) -> (Self, oneshot::Sender<()>) {
        let (release, gate) = oneshot::channel();
        let reader = Self {
            first,
            later,
            calls: AtomicUsize::new(0),
            gate: tokio::sync::Mutex::new(Some(gate)),
        };
        (reader, release)
    }
}

#[async_trait]
impl SheetReader for GatedReader {
    async fn read_values(&self, _sheet_id: &str, _range: &str) -> Result<RawTable> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            let gate = self.gate.lock().await.take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            return Ok(self.first.clone());
        }
        Ok(self.later.clone())
    }
}

/// Writer whose spreadsheet creation waits until released.
pub struct GatedWriter {
    pub inner: MemoryStore,
    gate: tokio::sync::Mutex<Option<oneshot::Receiver<()>>>,
}

impl GatedWriter {
    pub fn new() -> (Self, oneshot::Sender<()>) {
        let (release, gate) = oneshot::channel();
        let writer = Self {
            inner: MemoryStore::default(),
            gate: tokio::sync::Mutex::new(Some(gate)),
        };
        (writer, release)
    }
}

#[async_trait]
impl SheetWriter for GatedWriter {
    async fn create_spreadsheet(&self, title: &str, tab: &str) -> Result<String> {
        let gate = self.gate.lock().await.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.inner.create_spreadsheet(title, tab).await
    }

    async fn write_values(&self, spreadsheet_id: &str, range: &str, rows: &RawTable) -> Result<()> {
        self.inner.write_values(spreadsheet_id, range, rows).await
    }

    fn spreadsheet_url(&self, spreadsheet_id: &str) -> String {
        self.inner.spreadsheet_url(spreadsheet_id)
    }
}
