//! Shared test doubles and helpers for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use cell_monitor::config::{DatabaseConfig, ServiceConfig};
use cell_monitor::db::{Backend, Connector, DbError, MemoryBackend};
use cell_monitor::Cell;
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::{watch, Notify};
use tower::ServiceExt;

/// The reference data set: one of each class plus an excluded cell.
pub fn reference_cells() -> Vec<Cell> {
    vec![
        Cell::new(1, 180),
        Cell::new(2, 200),
        Cell::new(3, 190),
        Cell::new(4, 0),
        Cell::new(5, 210),
    ]
}

/// Config listening on an OS-assigned port, serving a temp static dir that
/// holds a single `index.html`.
pub fn test_config() -> (ServiceConfig, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>cells</h1>").unwrap();
    let config = ServiceConfig {
        port: 0,
        static_dir: dir.path().to_path_buf(),
        ..ServiceConfig::default()
    };
    (config, dir)
}

/// Collect every line handed to a log callback.
#[derive(Clone, Default)]
pub struct LogCapture {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LogCapture {
    pub fn callback(&self) -> impl Fn(&str) + Send + Sync + 'static {
        let lines = Arc::clone(&self.lines);
        move |line: &str| lines.lock().unwrap().push(line.to_string())
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

/// One-shot barrier: callers of `pass` block until `open`.
#[derive(Clone)]
pub struct Gate {
    entered: Arc<Notify>,
    release: Arc<watch::Sender<bool>>,
}

impl Gate {
    pub fn new() -> Self {
        Self {
            entered: Arc::new(Notify::new()),
            release: Arc::new(watch::Sender::new(false)),
        }
    }

    pub async fn pass(&self) {
        self.entered.notify_one();
        let mut open = self.release.subscribe();
        let _ = open.wait_for(|open| *open).await;
    }

    /// Wait until some caller is blocked in `pass`.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn open(&self) {
        self.release.send_replace(true);
    }
}

/// Backend whose queries block on a gate. Never opening it gives a hung
/// request.
pub struct GatedBackend {
    pub gate: Gate,
    cells: Vec<Cell>,
}

impl GatedBackend {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            gate: Gate::new(),
            cells,
        }
    }
}

#[async_trait]
impl Backend for GatedBackend {
    async fn fetch_cells(&self) -> Result<Vec<Cell>, DbError> {
        self.gate.pass().await;
        Ok(self.cells.clone())
    }

    async fn close(&self) -> Result<(), DbError> {
        Ok(())
    }
}

/// Backend whose every query fails with a driver-looking message.
pub struct FailingBackend;

pub const FAILING_BACKEND_MESSAGE: &str = "Login failed for user 'sa' on 10.0.0.5";

#[async_trait]
impl Backend for FailingBackend {
    async fn fetch_cells(&self) -> Result<Vec<Cell>, DbError> {
        Err(DbError::Other(FAILING_BACKEND_MESSAGE.to_string()))
    }

    async fn close(&self) -> Result<(), DbError> {
        Ok(())
    }
}

/// Connector that hands out the same backend on every connect.
pub struct SharedConnector {
    backend: Arc<dyn Backend>,
}

impl SharedConnector {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Connector for SharedConnector {
    async fn connect(&self, _config: &DatabaseConfig) -> Result<Arc<dyn Backend>, DbError> {
        Ok(Arc::clone(&self.backend))
    }
}

/// Connector whose `connect` blocks on a gate.
pub struct GatedConnector {
    pub gate: Gate,
}

impl GatedConnector {
    pub fn new() -> Self {
        Self { gate: Gate::new() }
    }
}

#[async_trait]
impl Connector for GatedConnector {
    async fn connect(&self, _config: &DatabaseConfig) -> Result<Arc<dyn Backend>, DbError> {
        self.gate.pass().await;
        Ok(Arc::new(MemoryBackend::new(reference_cells())))
    }
}

/// Connector with scripted failures that counts connects and closes.
pub struct ScriptedConnector {
    cells: Vec<Cell>,
    failing_connects: AtomicUsize,
    close_fails: bool,
    connects: AtomicUsize,
    closes: Arc<AtomicUsize>,
}

impl ScriptedConnector {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            failing_connects: AtomicUsize::new(0),
            close_fails: false,
            connects: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail the next `n` connects.
    pub fn failing_first(self, n: usize) -> Self {
        self.failing_connects.store(n, Ordering::SeqCst);
        self
    }

    /// Backends from this connector fail to close.
    pub fn with_close_failure(mut self) -> Self {
        self.close_fails = true;
        self
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, _config: &DatabaseConfig) -> Result<Arc<dyn Backend>, DbError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let should_fail = self
            .failing_connects
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(DbError::Pool("connection refused".to_string()));
        }
        Ok(Arc::new(ScriptedBackend {
            cells: self.cells.clone(),
            close_fails: self.close_fails,
            closes: Arc::clone(&self.closes),
        }))
    }
}

struct ScriptedBackend {
    cells: Vec<Cell>,
    close_fails: bool,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn fetch_cells(&self) -> Result<Vec<Cell>, DbError> {
        Ok(self.cells.clone())
    }

    async fn close(&self) -> Result<(), DbError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.close_fails {
            return Err(DbError::Other("pool already poisoned".to_string()));
        }
        Ok(())
    }
}

/// Issue a GET through the router without a socket.
pub async fn get(router: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

/// Base URL for talking to a started service over loopback.
pub fn loopback_base(addr: std::net::SocketAddr) -> String {
    format!("http://127.0.0.1:{}", addr.port())
}
