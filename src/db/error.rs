//! Backend error type.

use thiserror::Error;

/// Failures raised by a [`Backend`](super::Backend) or its
/// [`Connector`](super::Connector).
#[derive(Debug, Error)]
pub enum DbError {
    /// The pool could not hand out a connection.
    #[error("connection pool error: {0}")]
    Pool(String),

    /// The driver rejected or failed the query.
    #[error("query failed: {0}")]
    Query(#[from] tiberius::error::Error),

    /// A row did not have the expected shape.
    #[error("unexpected row: {0}")]
    Row(String),

    /// The backend was already closed.
    #[error("backend is closed")]
    Closed,

    /// Failure reported by a non-driver backend.
    #[error("{0}")]
    Other(String),
}

impl<E: std::fmt::Display> From<bb8::RunError<E>> for DbError {
    fn from(err: bb8::RunError<E>) -> Self {
        match err {
            bb8::RunError::User(e) => DbError::Pool(e.to_string()),
            bb8::RunError::TimedOut => DbError::Pool("timed out waiting for a connection".into()),
        }
    }
}
