//! Back-office order management.
//!
//! Lists every order (with owner email and line items) and performs guarded
//! status transitions. The lifecycle guard runs before anything is written:
//! an illegal transition gets a 422 and the backend is never called, so
//! there is no optimistic state to roll back.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use roastline_core::{OrderId, OrderStatus};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::backend::types::{Order, OrderItem};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminToken;
use crate::state::AppState;

/// Email shown for orders without an owning profile.
const GUEST_EMAIL: &str = "Guest";

/// Status filter query (`?status=pending`).
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

/// An order enriched for the back-office table.
#[derive(Debug, Serialize)]
pub struct AdminOrderView {
    #[serde(flatten)]
    pub order: Order,
    /// Owner's contact email, or `Guest`.
    pub user_email: String,
    pub items: Vec<OrderItem>,
    /// Legal next statuses, so the UI offers exactly these.
    pub allowed_transitions: Vec<OrderStatus>,
}

/// Status transition request body.
#[derive(Debug, Deserialize)]
pub struct StatusInput {
    pub status: OrderStatus,
}

/// List all orders, newest first, optionally filtered by status.
///
/// Each order is enriched with the owner's email (a secondary lookup per
/// order; guests resolve to `Guest`) and its line items. Enrichment
/// failures degrade that order's row rather than failing the page.
#[instrument(skip(_admin, state))]
pub async fn list(
    _admin: RequireAdminToken,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<AdminOrderView>>> {
    let orders = state.backend().list_orders(params.status).await?;

    let mut views = Vec::with_capacity(orders.len());
    for order in orders {
        let items = match state.backend().list_order_items(order.id).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(order_id = %order.id, error = %e, "Failed to fetch order items");
                Vec::new()
            }
        };

        let user_email = match order.user_id {
            Some(user_id) => match state.backend().profile_email(user_id).await {
                Ok(Some(email)) => email,
                Ok(None) => GUEST_EMAIL.to_string(),
                Err(e) => {
                    tracing::warn!(order_id = %order.id, error = %e, "Failed to fetch profile email");
                    GUEST_EMAIL.to_string()
                }
            },
            None => GUEST_EMAIL.to_string(),
        };

        let allowed_transitions = order.status.transitions();
        views.push(AdminOrderView {
            order,
            user_email,
            items,
            allowed_transitions,
        });
    }

    Ok(Json(views))
}

/// Transition an order's status.
///
/// The current status is fetched first and the lifecycle consulted; an
/// illegal move is rejected with 422 before the backend sees a write. A
/// backend failure leaves the order as it was and reports 502.
#[instrument(skip(_admin, state))]
pub async fn update_status(
    _admin: RequireAdminToken,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(input): Json<StatusInput>,
) -> Result<Json<Order>> {
    let order = state.backend().get_order(id).await?;

    if !order.status.can_transition_to(input.status) {
        return Err(AppError::IllegalTransition {
            from: order.status,
            to: input.status,
        });
    }

    let updated = state.backend().update_order_status(id, input.status).await?;
    tracing::info!(order_id = %id, from = %order.status, to = %updated.status, "Order status updated");
    Ok(Json(updated))
}
