//! The service lifecycle controller.
//!
//! A [`Service`] owns one optional run: backend pool, listener task and the
//! public URL. `start` and `stop` are serialized by an async mutex. A `start`
//! that cannot take it right away is rejected unless the service is idle; a
//! `stop` queues behind whatever transition is in flight and then acts on
//! its result.

use std::net::SocketAddr;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use thiserror::Error;
use tokio::sync::{oneshot, watch, Mutex};

use super::shutdown::{DrainOutcome, Shutdown, GRACE_PERIOD};
use super::state::ServiceState;
use crate::cells::DataAccess;
use crate::config::ServiceConfig;
use crate::db::{Connector, DbError, MssqlConnector};
use crate::http::HttpServer;
use crate::net::{self, ListenError};
use crate::observability::LogSink;

/// Why `start` failed. The service is back in `Idle` in every case.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// `start` called while not `Idle`, or while another transition runs.
    #[error("service is already active (state: {0})")]
    AlreadyActive(ServiceState),

    /// The backend could not be reached or rejected the login.
    #[error("failed to connect to database: {0}")]
    BackendConnect(#[source] DbError),

    /// The HTTP port could not be bound.
    #[error(transparent)]
    Listen(#[from] ListenError),
}

/// Where a running service can be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// `http://<lan-address>:<port>`
    pub url: String,
    /// Socket the listener is bound to (`0.0.0.0:<port>`).
    pub local_addr: SocketAddr,
}

struct ActiveRun {
    shutdown: Shutdown,
}

/// Resets the state to `Idle` if a `start` is abandoned half way, whether it
/// failed or its future was dropped.
struct StartGuard<'a> {
    state: &'a watch::Sender<ServiceState>,
    armed: bool,
}

impl StartGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for StartGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.send_replace(ServiceState::Idle);
        }
    }
}

pub struct Service {
    connector: Arc<dyn Connector>,
    data: Arc<DataAccess>,
    log: Arc<LogSink>,
    state: watch::Sender<ServiceState>,
    endpoint: ArcSwapOption<Endpoint>,
    run: Mutex<Option<ActiveRun>>,
}

impl Service {
    pub fn new<C>(connector: C) -> Self
    where
        C: Connector + 'static,
    {
        Self::with_connector(Arc::new(connector))
    }

    pub fn with_connector(connector: Arc<dyn Connector>) -> Self {
        let log = Arc::new(LogSink::new());
        Self {
            connector,
            data: Arc::new(DataAccess::new(Arc::clone(&log))),
            log,
            state: watch::Sender::new(ServiceState::Idle),
            endpoint: ArcSwapOption::empty(),
            run: Mutex::new(None),
        }
    }

    /// Service backed by SQL Server.
    pub fn mssql() -> Self {
        Self::new(MssqlConnector)
    }

    /// Receive human-readable `[HH:MM:SS] message` lines.
    pub fn set_log_callback<F>(&self, callback: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.log.set_callback(callback);
    }

    pub fn clear_log_callback(&self) {
        self.log.clear_callback();
    }

    pub fn state(&self) -> ServiceState {
        *self.state.borrow()
    }

    /// Follow state changes.
    pub fn watch_state(&self) -> watch::Receiver<ServiceState> {
        self.state.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.state() == ServiceState::Running
    }

    /// Public URL while running.
    pub fn url(&self) -> Option<String> {
        self.endpoint.load().as_ref().map(|e| e.url.clone())
    }

    /// Bound socket address while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.endpoint.load().as_ref().map(|e| e.local_addr)
    }

    /// The data layer shared by every router this service builds.
    pub fn data_access(&self) -> Arc<DataAccess> {
        Arc::clone(&self.data)
    }

    fn set_state(&self, state: ServiceState) {
        let previous = self.state.send_replace(state);
        tracing::debug!(from = %previous, to = %state, "Service state changed");
    }

    /// Connect the backend, bind `0.0.0.0:port` and start serving.
    ///
    /// Returns the URL a LAN client should use. Only valid from `Idle`;
    /// there is no implicit restart, call [`stop`](Self::stop) first. A
    /// start that finds another transition in flight is rejected, except
    /// that it waits out a `stop` on an already idle service. No deadline is
    /// applied here beyond the driver's own connect timeout.
    pub async fn start(&self, config: &ServiceConfig) -> Result<String, ServiceError> {
        let mut run = match self.run.try_lock() {
            Ok(run) => run,
            // Only a no-op `stop` holds the lock while the state reads Idle.
            Err(_) if self.state() == ServiceState::Idle => self.run.lock().await,
            Err(_) => return Err(ServiceError::AlreadyActive(self.state())),
        };
        let current = self.state();
        if run.is_some() || !current.can_start() {
            return Err(ServiceError::AlreadyActive(current));
        }

        self.set_state(ServiceState::Starting);
        let guard = StartGuard {
            state: &self.state,
            armed: true,
        };

        self.log.info("Connecting to database...");
        let backend = match self.connector.connect(&config.database).await {
            Ok(backend) => backend,
            Err(e) => {
                self.log.error(&format!("Failed to start server: {e}"));
                return Err(ServiceError::BackendConnect(e));
            }
        };
        self.log.info("Connected to database");

        let address = net::resolve_local_address();

        let (listener, local_addr) = match net::bind(config.port).await {
            Ok(bound) => bound,
            Err(e) => {
                self.log.error(&format!("Failed to start server: {e}"));
                if let Err(close_err) = backend.close().await {
                    self.log.warn(&format!("DB close error: {close_err}"));
                }
                return Err(ServiceError::Listen(e));
            }
        };

        let port = local_addr.port();
        let url = format!("http://{address}:{port}");

        self.data.attach(backend);
        let server = HttpServer::new(Arc::clone(&self.data), &config.static_dir);
        let connections = server.connections();
        let (trigger, signal) = oneshot::channel();
        let task = tokio::spawn(server.run(listener, signal));

        *run = Some(ActiveRun {
            shutdown: Shutdown::new(trigger, task, connections),
        });
        self.endpoint.store(Some(Arc::new(Endpoint {
            url: url.clone(),
            local_addr,
        })));

        guard.disarm();
        self.set_state(ServiceState::Running);
        self.log.info(&format!("Server started on port {port}"));
        self.log.info(&format!("Mobile URL: {url}"));

        Ok(url)
    }

    /// Stop serving and release the backend. Never fails.
    ///
    /// A no-op from `Idle`. Otherwise data endpoints start answering 503
    /// at once, open connections get [`GRACE_PERIOD`] to finish before they
    /// are aborted, and the pool is closed. Returning does not guarantee
    /// that aborted connections are fully torn down yet.
    pub async fn stop(&self) {
        let mut run = self.run.lock().await;
        let active = run.take();

        // A stop whose future was dropped can leave Stopping behind with no
        // run; finish its cleanup instead of treating it as idle.
        if active.is_none() && self.state() == ServiceState::Idle {
            return;
        }

        self.set_state(ServiceState::Stopping);
        self.log.info("Stopping server...");
        self.data.stop_accepting();
        self.endpoint.store(None);

        if let Some(active) = active {
            match active.shutdown.drain(GRACE_PERIOD).await {
                DrainOutcome::Drained => self.log.info("HTTP server closed"),
                DrainOutcome::ForceClosed { open_connections } => self.log.warn(&format!(
                    "Force closing server... ({open_connections} open connections)"
                )),
                DrainOutcome::Exited => self.log.warn("HTTP server had already exited"),
            }
        }

        if let Some(backend) = self.data.detach() {
            match backend.close().await {
                Ok(()) => self.log.info("Database connection closed"),
                Err(e) => self.log.warn(&format!("DB close error: {e}")),
            }
        }

        self.set_state(ServiceState::Idle);
        self.log.info("Server stopped successfully");
    }
}

impl Default for Service {
    fn default() -> Self {
        Self::mssql()
    }
}

impl Drop for Service {
    fn drop(&mut self) {
        if let Some(active) = self.run.get_mut().take() {
            tracing::warn!("Service dropped while running; aborting server");
            self.data.stop_accepting();
            active.shutdown.abort();
        }
    }
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("state", &self.state())
            .field("url", &self.url())
            .finish()
    }
}
