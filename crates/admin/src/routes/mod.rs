//! HTTP route handlers for the back office.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health              - Liveness check
//! GET  /orders?status=      - All orders, enriched (owner email, items)
//! POST /orders/{id}/status  - Guarded status transition
//! ```
//!
//! Every route except `/health` requires the admin bearer token.

pub mod orders;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Create all routes for the back office.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::list))
        .route("/orders/{id}/status", post(orders::update_status))
}
