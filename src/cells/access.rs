//! Data access layer shared by all request handlers.
//!
//! Holds the accepting flag and the backend attached for the current run.
//! Both read operations check the two before any backend call, so a request
//! that arrives during shutdown never races a pool that is being closed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use thiserror::Error;

use super::stats::StatsSummary;
use super::types::Cell;
use crate::db::Backend;
use crate::observability::LogSink;

/// Per-request failure of the data layer.
#[derive(Debug, Error)]
pub enum DataError {
    /// Service is stopping, idle, or has no backend attached.
    #[error("service is stopping or not connected")]
    Unavailable,

    /// The backend failed this request. The service keeps running.
    #[error("query failed: {0}")]
    Query(String),
}

/// `ArcSwapOption` needs a sized pointee.
struct Attached(Arc<dyn Backend>);

pub struct DataAccess {
    accepting: AtomicBool,
    backend: ArcSwapOption<Attached>,
    log: Arc<LogSink>,
}

impl DataAccess {
    pub fn new(log: Arc<LogSink>) -> Self {
        Self {
            accepting: AtomicBool::new(false),
            backend: ArcSwapOption::empty(),
            log,
        }
    }

    /// Attach the backend for a new run and start accepting work.
    pub fn attach(&self, backend: Arc<dyn Backend>) {
        self.backend.store(Some(Arc::new(Attached(backend))));
        self.accepting.store(true, Ordering::Release);
    }

    /// Refuse new backend work. Requests already past the check finish.
    pub fn stop_accepting(&self) {
        self.accepting.store(false, Ordering::Release);
    }

    /// Take the backend out so it can be closed.
    pub fn detach(&self) -> Option<Arc<dyn Backend>> {
        self.stop_accepting();
        self.backend.swap(None).map(|attached| Arc::clone(&attached.0))
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::Acquire)
    }

    pub fn is_attached(&self) -> bool {
        self.backend.load().is_some()
    }

    fn backend(&self) -> Result<Arc<dyn Backend>, DataError> {
        if !self.is_accepting() {
            return Err(DataError::Unavailable);
        }
        self.backend
            .load_full()
            .map(|attached| Arc::clone(&attached.0))
            .ok_or(DataError::Unavailable)
    }

    async fn active_cells(&self, operation: &str) -> Result<Vec<Cell>, DataError> {
        let backend = self.backend()?;
        match backend.fetch_cells().await {
            Ok(mut cells) => {
                cells.retain(Cell::is_active);
                cells.sort_by_key(|cell| cell.number);
                Ok(cells)
            }
            Err(e) => {
                self.log.error(&format!("Error fetching {operation}: {e}"));
                Err(DataError::Query(e.to_string()))
            }
        }
    }

    /// Every cell with a non-zero status, ascending by number.
    pub async fn list_active_cells(&self) -> Result<Vec<Cell>, DataError> {
        self.active_cells("cells").await
    }

    /// Counts over the active cells, computed in-process on each call.
    pub async fn compute_stats(&self) -> Result<StatsSummary, DataError> {
        let cells = self.active_cells("stats").await?;
        Ok(StatsSummary::from_cells(&cells))
    }
}

impl std::fmt::Debug for DataAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataAccess")
            .field("accepting", &self.is_accepting())
            .field("attached", &self.is_attached())
            .finish()
    }
}
