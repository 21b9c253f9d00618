//! Request handlers. Thin: all logic lives in [`DataAccess`].

use std::sync::Arc;

use axum::{extract::State, Json};

use super::response::{ApiError, DataResponse, HealthResponse};
use crate::cells::{Cell, DataAccess, DataError, StatsSummary};

/// Result type for data handlers.
pub type HandlerResult<T> = Result<Json<DataResponse<T>>, ApiError>;

fn log_unavailable(err: &DataError, path: &str) {
    if matches!(err, DataError::Unavailable) {
        tracing::debug!(path, "Rejected request: service not accepting");
    }
}

/// GET /api/cells
pub async fn list_cells(State(data): State<Arc<DataAccess>>) -> HandlerResult<Vec<Cell>> {
    let cells = data.list_active_cells().await.map_err(|e| {
        log_unavailable(&e, "/api/cells");
        ApiError::from_data(e, "Failed to fetch cells")
    })?;
    Ok(Json(DataResponse::new(cells)))
}

/// GET /api/stats
pub async fn stats(State(data): State<Arc<DataAccess>>) -> HandlerResult<StatsSummary> {
    let stats = data.compute_stats().await.map_err(|e| {
        log_unavailable(&e, "/api/stats");
        ApiError::from_data(e, "Failed to fetch stats")
    })?;
    Ok(Json(DataResponse::new(stats)))
}

/// GET /api/health
///
/// Liveness only; never touches the backend.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::now())
}
