//! Backend access subsystem.
//!
//! # Data Flow
//! ```text
//! Service::start
//!     → Connector::connect(DatabaseConfig) (open + validate pool)
//!     → Arc<dyn Backend> attached to cells::DataAccess
//!
//! Request
//!     → DataAccess → Backend::fetch_cells (one pooled connection)
//!
//! Service::stop
//!     → Backend::close (release pooled connections)
//! ```
//!
//! # Design Decisions
//! - The rest of the crate only sees the two traits, so tests swap in doubles
//! - Pool concurrency is the driver's job; no extra locking around queries
//! - `close` is explicit because in-flight handlers may still hold the `Arc`

pub mod error;
pub mod memory;
pub mod mssql;

use std::sync::Arc;

use async_trait::async_trait;

use crate::cells::Cell;
use crate::config::DatabaseConfig;

pub use error::DbError;
pub use memory::{MemoryBackend, MemoryConnector};
pub use mssql::{MssqlBackend, MssqlConnector};

/// A pooled, read-only view of the cell table.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Read the cell rows. Implementations should already skip status 0 and
    /// order by number, but callers do not rely on it.
    async fn fetch_cells(&self) -> Result<Vec<Cell>, DbError>;

    /// Release pooled connections. Later calls to `fetch_cells` fail.
    async fn close(&self) -> Result<(), DbError>;
}

/// Opens a [`Backend`] from connection parameters.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, config: &DatabaseConfig) -> Result<Arc<dyn Backend>, DbError>;
}
