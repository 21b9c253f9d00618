//! In-memory backend for demos and tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::{Backend, Connector, DbError};
use crate::cells::Cell;
use crate::config::DatabaseConfig;

/// Backend serving a fixed list of cells.
///
/// Rows are returned exactly as stored, unfiltered and unsorted, which makes
/// it useful for checking that the data layer does its own filtering.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    cells: Vec<Cell>,
    closed: AtomicBool,
}

impl MemoryBackend {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            closed: AtomicBool::new(false),
        }
    }

    /// A small warehouse with every known status represented.
    pub fn sample() -> Self {
        let cells = (1..=24)
            .map(|number| {
                let status = match number % 8 {
                    0 => 0,
                    1 | 2 | 5 => 180,
                    3 | 6 => 200,
                    4 => 190,
                    _ => 210,
                };
                Cell::new(number, status)
            })
            .collect();
        Self::new(cells)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn fetch_cells(&self) -> Result<Vec<Cell>, DbError> {
        if self.is_closed() {
            return Err(DbError::Closed);
        }
        Ok(self.cells.clone())
    }

    async fn close(&self) -> Result<(), DbError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(DbError::Closed);
        }
        Ok(())
    }
}

/// Connector handing out a fresh [`MemoryBackend`] per run, seeded from a
/// template list.
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    seed: Arc<Vec<Cell>>,
}

impl MemoryConnector {
    pub fn new(seed: Vec<Cell>) -> Self {
        Self { seed: Arc::new(seed) }
    }

    pub fn sample() -> Self {
        Self::new(MemoryBackend::sample().cells)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, config: &DatabaseConfig) -> Result<Arc<dyn Backend>, DbError> {
        tracing::info!(database = %config.database, cells = self.seed.len(), "Using in-memory backend");
        Ok(Arc::new(MemoryBackend::new(self.seed.as_ref().clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_rows_as_stored() {
        let backend = MemoryBackend::new(vec![Cell::new(3, 200), Cell::new(1, 0)]);
        let rows = backend.fetch_cells().await.unwrap();
        assert_eq!(rows, vec![Cell::new(3, 200), Cell::new(1, 0)]);
    }

    #[tokio::test]
    async fn closed_backend_refuses_queries() {
        let backend = MemoryBackend::sample();
        backend.close().await.unwrap();
        assert!(backend.is_closed());
        assert!(matches!(backend.fetch_cells().await, Err(DbError::Closed)));
        assert!(matches!(backend.close().await, Err(DbError::Closed)));
    }

    #[tokio::test]
    async fn connector_gives_independent_backends() {
        let connector = MemoryConnector::new(vec![Cell::new(1, 180)]);
        let config = DatabaseConfig::default();
        let first = connector.connect(&config).await.unwrap();
        let second = connector.connect(&config).await.unwrap();

        first.close().await.unwrap();
        assert_eq!(second.fetch_cells().await.unwrap(), vec![Cell::new(1, 180)]);
    }

    #[test]
    fn sample_covers_every_status() {
        let cells = MemoryConnector::sample().seed;
        for status in [0, 180, 190, 200, 210] {
            assert!(cells.iter().any(|c| c.status == status), "missing {status}");
        }
    }
}
