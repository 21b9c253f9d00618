//! Response envelopes and error mapping.
//!
//! Every body carries a `success` flag. Failures use fixed, short messages;
//! backend detail stays in the logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::cells::DataError;

pub const UNAVAILABLE_MESSAGE: &str = "Server is stopping or not connected";
pub const HEALTH_MESSAGE: &str = "API is running";

/// `{ "success": true, "data": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { success: true, data }
    }
}

/// `{ "success": false, "error": "..." }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    /// ISO-8601 UTC with millisecond precision.
    pub timestamp: String,
}

impl HealthResponse {
    pub fn now() -> Self {
        Self {
            success: true,
            message: HEALTH_MESSAGE.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Failure of a data endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 503: stopping, idle, or no backend.
    Unavailable,
    /// 500: the backend failed; carries the public message.
    Query(&'static str),
}

impl ApiError {
    /// Map a data-layer error, using `failure` as the public 500 message.
    pub fn from_data(err: DataError, failure: &'static str) -> Self {
        match err {
            DataError::Unavailable => ApiError::Unavailable,
            DataError::Query(_) => ApiError::Query(failure),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ApiError::Unavailable => UNAVAILABLE_MESSAGE,
            ApiError::Query(message) => message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorResponse::new(self.message()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_errors_map_to_status_codes() {
        let unavailable = ApiError::from_data(DataError::Unavailable, "Failed to fetch cells");
        assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(unavailable.message(), UNAVAILABLE_MESSAGE);

        let query = ApiError::from_data(DataError::Query("login failed for user 'sa'".into()), "Failed to fetch cells");
        assert_eq!(query.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(query.message(), "Failed to fetch cells");
    }

    #[test]
    fn health_timestamp_is_iso8601_utc() {
        let health = HealthResponse::now();
        assert!(health.success);
        assert!(health.timestamp.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&health.timestamp).is_ok());
    }

    #[test]
    fn error_body_shape() {
        let json = serde_json::to_value(ErrorResponse::new("nope")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "error": "nope" }));
    }
}
