//! Managed backend API client.
//!
//! # Architecture
//!
//! All durable state (catalog, orders, profiles, auth, row-level security)
//! lives in a managed backend-as-a-service; this module is a thin typed client
//! over its REST dialect (`/rest/v1/<table>` reads with query filters,
//! `/rest/v1/rpc/<fn>` for the checkout procedure).
//!
//! - The backend is the source of truth - NO local sync, direct API calls
//! - In-memory caching via `moka` for catalog reads (5 minute TTL)
//! - The checkout procedure is atomic on the backend side: either the order
//!   and all line items exist with stock decremented, or nothing happened
//!
//! # Example
//!
//! ```rust,ignore
//! use roastline_storefront::backend::BackendClient;
//!
//! let client = BackendClient::new(&config.backend);
//!
//! let products = client.list_products().await?;
//! let created = client.checkout(&rpc_payload).await?;
//! let order = client.get_order(created.order_id).await?;
//! ```

mod client;
pub mod types;

pub use client::BackendClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when calling the managed backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the request (constraint violation, RLS denial,
    /// business-rule failure such as insufficient stock).
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

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_is_operator_readable() {
        let err = BackendError::NotFound("order 123".to_string());
        assert_eq!(err.to_string(), "Not found: order 123");

        let err = BackendError::Api {
            status: 409,
            message: "insufficient stock".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Backend rejected request (409): insufficient stock"
        );
    }
}
