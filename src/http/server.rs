//! HTTP server setup and the accept loop.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers and middleware
//! - Serve HTTP/1.1 and HTTP/2 connections from a bound listener
//! - Stop accepting on the shutdown signal, then drain gracefully
//!
//! The drain has no deadline of its own; the lifecycle controller bounds it
//! and aborts this task (and with it every connection task) when it expires.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::{conn::auto::Builder, graceful::GracefulShutdown},
    service::TowerToHyperService,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers;
use crate::cells::DataAccess;
use crate::net::ConnectionTracker;

/// Build the router: JSON API under `/api`, static files everywhere else.
pub fn build_router(data: Arc<DataAccess>, static_dir: &Path) -> Router {
    // Any LAN client (a phone browser) may call the API.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/cells", get(handlers::list_cells))
        .route("/stats", get(handlers::stats))
        .route("/health", get(handlers::health))
        .with_state(data);

    Router::new()
        .nest("/api", api)
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors)
}

/// Pause after a failed accept. Errors such as EMFILE come back immediately
/// on every call until descriptors are freed.
const ACCEPT_BACKOFF: Duration = Duration::from_secs(1);

/// Sleep out [`ACCEPT_BACKOFF`]. Returns `true` if shutdown fired meanwhile.
async fn back_off(shutdown: &mut oneshot::Receiver<()>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(ACCEPT_BACKOFF) => false,
        _ = shutdown => true,
    }
}

/// HTTP server for one run of the service.
pub struct HttpServer {
    router: Router,
    connections: ConnectionTracker,
}

impl HttpServer {
    pub fn new(data: Arc<DataAccess>, static_dir: &Path) -> Self {
        Self {
            router: build_router(data, static_dir),
            connections: ConnectionTracker::new(),
        }
    }

    /// Handle on the live connection count.
    pub fn connections(&self) -> ConnectionTracker {
        self.connections.clone()
    }

    /// Accept connections until `shutdown` fires (or its sender is dropped),
    /// then close the listener and wait for open connections to finish.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: oneshot::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let builder = Builder::new(TokioExecutor::new());
        let graceful = GracefulShutdown::new();
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(pair) => pair,
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to accept connection");
                            if back_off(&mut shutdown).await {
                                break;
                            }
                            continue;
                        }
                    };

                    let guard = self.connections.track();
                    tracing::debug!(connection_id = %guard.id(), peer = %peer, "Connection accepted");

                    let service = TowerToHyperService::new(self.router.clone());
                    let conn = builder.serve_connection_with_upgrades(TokioIo::new(stream), service);
                    let conn = graceful.watch(conn.into_owned());

                    tasks.spawn(async move {
                        if let Err(e) = conn.await {
                            tracing::debug!(connection_id = %guard.id(), error = %e, "Connection ended with error");
                        }
                        drop(guard);
                    });
                }
                _ = &mut shutdown => break,
            }

            while tasks.try_join_next().is_some() {}
        }

        drop(listener);
        tracing::info!(
            open_connections = self.connections.active_count(),
            "Listener closed, draining connections"
        );

        graceful.shutdown().await;
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
