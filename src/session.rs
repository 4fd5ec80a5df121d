//! The single owner of all mutable dashboard state.
//!
//! Remote calls run without holding the state lock. Ingest responses carry the
//! generation they were requested under and are dropped when a newer request
//! has been issued in the meantime.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::config::DashboardConfig;
use crate::error::{Result, SheetError};
use crate::export::{self, ExportOptions};
use crate::ingest;
use crate::io::{SheetReader, SheetWriter};
use crate::model::{ExportResult, Identity, Record};
use crate::view::ViewEngine;

/// Pending flag plus error slot of one kind of remote operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatus {
    pub in_progress: bool,
    pub error: Option<String>,
}

impl OperationStatus {
    fn begin(&mut self) {
        self.in_progress = true;
        self.error = None;
    }

    fn finish<T>(&mut self, result: &Result<T>) {
        self.in_progress = false;
        self.error = result.as_ref().err().map(ToString::to_string);
    }
}

/// What happened to the response of a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The records replaced the canonical collection.
    Applied { record_count: usize },
    /// A newer reload was started before this one finished; its response was
    /// dropped.
    Superseded,
}

/// Everything the presentation layer needs to render the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub greeting: Option<String>,
    pub columns: Vec<String>,
    pub records: Vec<Record>,
    pub search_term: String,
    pub loading: OperationStatus,
    pub export: OperationStatus,
}

#[derive(Debug)]
struct SessionState {
    engine: ViewEngine,
    load: OperationStatus,
    export: OperationStatus,
    load_generation: u64,
}

/// A signed-in user's view onto one source sheet.
#[derive(Debug)]
pub struct Dashboard<R> {
    reader: Arc<R>,
    config: Arc<DashboardConfig>,
    identity: Option<Identity>,
    state: Arc<Mutex<SessionState>>,
}

impl<R> Clone for Dashboard<R> {
    fn clone(&self) -> Self {
        Self {
            reader: Arc::clone(&self.reader),
            config: Arc::clone(&self.config),
            identity: self.identity.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<R: SheetReader> Dashboard<R> {
    pub fn new(reader: R, config: DashboardConfig) -> Result<Self> {
        config.validate_read()?;
        let state = SessionState {
            engine: ViewEngine::new(config.sort_mode),
            load: OperationStatus::default(),
            export: OperationStatus::default(),
            load_generation: 0,
        };
        Ok(Self {
            reader: Arc::new(reader),
            config: Arc::new(config),
            identity: None,
            state: Arc::new(Mutex::new(state)),
        })
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn greeting(&self) -> Option<String> {
        self.identity.as_ref().map(Identity::greeting)
    }

    /// Re-reads the source sheet. On failure the previous records stay in
    /// place and the error is kept in the load status.
    #[instrument(level = "info", skip_all, fields(sheet_id = %self.config.sheet_id))]
    pub async fn reload(&self) -> Result<LoadOutcome> {
        let generation = {
            let mut state = self.state.lock().await;
            state.load_generation += 1;
            state.load.begin();
            state.load_generation
        };

        let result = ingest::ingest(
            self.reader.as_ref(),
            &self.config.sheet_id,
            &self.config.range,
        )
        .await;

        let mut state = self.state.lock().await;
        if state.load_generation != generation {
            warn!(generation, current = state.load_generation, "dropping stale sheet response");
            return Ok(LoadOutcome::Superseded);
        }
        state.load.finish(&result);
        let records = result?;
        let record_count = records.len();
        state.engine.replace_collection(records);
        Ok(LoadOutcome::Applied { record_count })
    }

    /// Applies a search intent and returns the new working view.
    pub async fn set_search_term(&self, term: &str) -> Vec<Record> {
        let mut state = self.state.lock().await;
        state.engine.set_search_term(term).to_records()
    }

    /// Applies a column-header sort intent and returns the new working view.
    pub async fn sort_by(&self, field: &str) -> Vec<Record> {
        let mut state = self.state.lock().await;
        state.engine.sort_by(field).to_records()
    }

    /// Exports the current working view through an authorised writer.
    ///
    /// Only one export may run at a time; a second request while one is
    /// pending fails with [`SheetError::ExportInProgress`].
    #[instrument(level = "info", skip_all)]
    pub async fn export<W>(&self, writer: &W) -> Result<ExportResult>
    where
        W: SheetWriter + ?Sized,
    {
        let records = {
            let mut state = self.state.lock().await;
            if state.export.in_progress {
                return Err(SheetError::ExportInProgress);
            }
            let records = state.engine.view().to_records();
            export::ensure_exportable(&records)?;
            state.export.begin();
            records
        };

        let options = ExportOptions {
            title: self.config.export_title.clone(),
            tab: self.config.export_tab.clone(),
            header: self.config.export_header,
        };
        let result = export::export_view(writer, &records, &options).await;

        let mut state = self.state.lock().await;
        state.export.finish(&result);
        if let Ok(exported) = &result {
            info!(url = %exported.url, "export finished");
        }
        result
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        let state = self.state.lock().await;
        DashboardSnapshot {
            greeting: self.greeting(),
            columns: state
                .engine
                .columns()
                .into_iter()
                .map(str::to_string)
                .collect(),
            records: state.engine.view().to_records(),
            search_term: state.engine.search_term().to_string(),
            loading: state.load.clone(),
            export: state.export.clone(),
        }
    }
}
