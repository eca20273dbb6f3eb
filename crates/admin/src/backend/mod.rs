//! Admin-scoped backend API client.
//!
//! Uses the service-role key, so every order is visible regardless of owner.
//! Status transitions go through here as well; the HTTP layer guards them
//! against the lifecycle before anything is written.

mod client;
pub mod types;

pub use client::AdminBackendClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when calling the managed backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the request.
    #[error("Backend rejected request ({status}): {message}")]
    Api {
        /// HTTP status returned by the backend.
        status: u16,
        /// Error message from the response body, if parseable.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}
