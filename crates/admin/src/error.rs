//! Unified error handling for the back office.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use roastline_core::OrderStatus;
use serde_json::json;
use thiserror::Error;

use crate::backend::BackendError;

/// Application-level error type for the admin service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend API operation failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// The requested status change is not in the order lifecycle.
    #[error("Illegal status transition: {from} -> {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Backend(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let (status, body) = match &self {
            Self::Backend(BackendError::NotFound(what)) | Self::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("not found: {what}") }),
            ),
            Self::Backend(_) => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": "backend request failed" }),
            ),
            Self::IllegalTransition { from, to } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": format!("cannot move order from {from} to {to}"),
                    "allowed": from.transitions(),
                }),
            ),
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "internal server error" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
