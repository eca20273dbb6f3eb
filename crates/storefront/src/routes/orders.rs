//! Order display routes (customer side).

use axum::{
    extract::{Path, State},
    Json,
};
use roastline_core::OrderId;
use serde::Serialize;
use tracing::instrument;

use crate::backend::types::{Order, OrderItem};
use crate::error::Result;
use crate::middleware::RequireUser;
use crate::state::AppState;

/// An order with its line items, ready for display.
#[derive(Debug, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// List the logged-in customer's orders, newest first.
///
/// Each order carries its line items joined with product name/image. A
/// partial item fetch failure downgrades that order to an empty item list
/// rather than failing the whole page.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<OrderView>>> {
    let orders = state.backend().list_orders_for_user(user.id).await?;

    let mut views = Vec::with_capacity(orders.len());
    for order in orders {
        let items = match state.backend().list_order_items(order.id).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(order_id = %order.id, error = %e, "Failed to fetch order items");
                Vec::new()
            }
        };
        views.push(OrderView { order, items });
    }

    Ok(Json(views))
}

/// Fetch one order with its items (used by the post-checkout success view).
///
/// Row-level security decides visibility; the storefront does not add its
/// own ownership check here.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderView>> {
    let order = state.backend().get_order(id).await?;
    let items = state.backend().list_order_items(order.id).await?;
    Ok(Json(OrderView { order, items }))
}
