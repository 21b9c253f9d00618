//! TCP listener binding.
//!
//! # Responsibilities
//! - Bind the HTTP port on all IPv4 interfaces
//! - Report bind failures (port in use, permission) as a typed error

use std::net::{Ipv4Addr, SocketAddr};

use thiserror::Error;
use tokio::net::TcpListener;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenError {
    /// Failed to bind to address.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

impl ListenError {
    pub fn addr(&self) -> SocketAddr {
        match self {
            ListenError::Bind { addr, .. } => *addr,
        }
    }
}

/// Bind `0.0.0.0:port`. Port `0` picks a free port; the returned address
/// carries the port actually bound.
pub async fn bind(port: u16) -> Result<(TcpListener, SocketAddr), ListenError> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ListenError::Bind { addr, source })?;

    let local_addr = listener
        .local_addr()
        .map_err(|source| ListenError::Bind { addr, source })?;

    tracing::info!(address = %local_addr, "Listener bound");
    Ok((listener, local_addr))
}
