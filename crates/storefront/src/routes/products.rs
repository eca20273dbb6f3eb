//! Catalog routes.
//!
//! The catalog is owned by the backend; these handlers fetch (with a short
//! cache) and project. A fetch failure surfaces as an error payload and an
//! empty grid on the client, never a crash.

use axum::{
    extract::{Path, State},
    Json,
};
use roastline_core::ProductId;
use tracing::instrument;

use crate::backend::types::Product;
use crate::error::Result;
use crate::state::AppState;

/// List the available catalog in display order.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.backend().list_products().await?;
    Ok(Json(products.as_ref().clone()))
}

/// Show a single product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = state.backend().get_product(id).await?;
    Ok(Json(product))
}
