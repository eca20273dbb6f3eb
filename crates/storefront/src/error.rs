//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.
//! Client-visible messages stay generic and non-technical; the interesting
//! details go to tracing and Sentry.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::backend::BackendError;
use crate::services::checkout::CheckoutError;
use crate::services::SignError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend API operation failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Checkout orchestration failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Payment signing input was rejected.
    #[error("Sign error: {0}")]
    Sign(#[from] SignError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A conflicting operation is already in progress.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Backend(_)
                | Self::Session(_)
                | Self::Internal(_)
                | Self::Checkout(CheckoutError::Rejected(_) | CheckoutError::SignatureAfterOrder { .. })
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Backend(err) => backend_status(err),
            Self::Checkout(err) => match err {
                CheckoutError::Validation(_) => StatusCode::BAD_REQUEST,
                CheckoutError::Rejected(_) | CheckoutError::SignatureAfterOrder { .. } => {
                    StatusCode::BAD_GATEWAY
                }
            },
            Self::Sign(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
        };

        // Don't expose internal error details to clients. The signature-gap
        // case carries the order id so operators can reconcile the order
        // that exists without a payment redirect.
        let body = match &self {
            Self::Backend(_) | Self::Internal(_) | Self::Session(_) => {
                json!({ "error": "伺服器發生錯誤，請稍後再試。" })
            }
            Self::Checkout(CheckoutError::Validation(message)) => json!({ "error": message }),
            Self::Checkout(CheckoutError::Rejected(_)) => {
                json!({ "error": "結帳發生錯誤，請稍後再試。" })
            }
            Self::Checkout(CheckoutError::SignatureAfterOrder { order_id, .. }) => json!({
                "error": "訂單已成立，但導向付款失敗，請聯絡客服完成付款。",
                "code": "payment_redirect_failed",
                "orderId": order_id,
            }),
            Self::Sign(err) => json!({ "error": err.to_string() }),
            Self::NotFound(what) => json!({ "error": format!("找不到資源: {what}") }),
            Self::Unauthorized(_) => json!({ "error": "請先登入" }),
            Self::BadRequest(message) | Self::Conflict(message) => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

fn backend_status(err: &BackendError) -> StatusCode {
    match err {
        BackendError::NotFound(_) => StatusCode::NOT_FOUND,
        BackendError::RateLimited(_) => StatusCode::SERVICE_UNAVAILABLE,
        BackendError::Http(_) | BackendError::Api { .. } | BackendError::Parse(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_error_classes() {
        fn status_of(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            status_of(AppError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Unauthorized("x".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::BadRequest("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Conflict("x".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Checkout(CheckoutError::Validation("欄位"))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Backend(BackendError::Api {
                status: 409,
                message: "insufficient stock".to_string(),
            })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn rejection_message_is_generic() {
        let err = AppError::Checkout(CheckoutError::Rejected(BackendError::Api {
            status: 409,
            message: "stock table constraint".to_string(),
        }));
        let display = err.to_string();
        // The operator-facing Display keeps details; the client body does not
        // (verified in the integration tests against the HTTP surface).
        assert!(display.contains("stock table constraint"));
    }
}
