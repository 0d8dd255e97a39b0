//! Error responses for the HTTP API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use remind_scheduler::SchedulerError;

/// Errors surfaced to HTTP callers as `{"error": ...}` bodies.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad or missing request field (400).
    #[error("{0}")]
    Validation(String),

    /// Unknown appointment id (404).
    #[error("Appointment not found")]
    NotFound,

    /// Unexpected internal fault (500). Last line of defense, not a
    /// designed error path.
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<SchedulerError> for ApiError {
    fn from(e: SchedulerError) -> Self {
        match e {
            SchedulerError::Validation(reason) => ApiError::Validation(reason),
            SchedulerError::NotFound(_) => ApiError::NotFound,
            other => ApiError::Internal(other.to_string()),
        }
    }
}
