//! Cart route handlers.
//!
//! The cart lives in the browser-scoped session; every handler loads it,
//! applies one pure [`Cart`] operation, and saves it back. Responses are
//! JSON views with the derived totals the cart panel renders.

use axum::{extract::State, response::IntoResponse, Json};
use roastline_core::{FreeShippingProgress, Money, ProductId};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::models::{session_keys, Cart, CartItem};
use crate::state::AppState;

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the session cart; an absent or unreadable cart is simply empty.
pub(crate) async fn load_cart(session: &Session) -> Cart {
    session
        .get::<Cart>(session_keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Persist the cart back into the session.
pub(crate) async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(session_keys::CART, cart).await?;
    Ok(())
}

// =============================================================================
// Views
// =============================================================================

/// One cart line, with derived prices.
#[derive(Debug, Serialize)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub name: String,
    pub price_display: Option<String>,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_price: Money,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name.clone(),
            price_display: item.price_display.clone(),
            image_url: item.image_url.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price(),
            line_price: item.line_price(),
        }
    }
}

/// The whole cart, plus the shipping-progress meter.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub is_open: bool,
    pub item_count: u32,
    pub subtotal: Money,
    pub subtotal_display: String,
    pub free_shipping: FreeShippingProgress,
}

impl CartView {
    fn build(cart: &Cart, state: &AppState) -> Self {
        let subtotal = cart.total_price();
        Self {
            items: cart.items.iter().map(CartItemView::from).collect(),
            is_open: cart.is_open,
            item_count: cart.item_count(),
            subtotal,
            subtotal_display: subtotal.to_string(),
            free_shipping: cart.free_shipping_progress(&state.config().checkout),
        }
    }
}

// =============================================================================
// Inputs
// =============================================================================

/// Add-to-cart input.
#[derive(Debug, Deserialize)]
pub struct AddToCartInput {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Quantity-update input. The quantity is signed so "minus below one" from a
/// stepper arrives intact; anything below 1 removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartInput {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Remove-from-cart input.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartInput {
    pub product_id: ProductId,
}

/// Cart count badge payload.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let cart = load_cart(&session).await;
    Json(CartView::build(&cart, &state))
}

/// Add an item to the cart.
///
/// Snapshots the product from the catalog at add time; stock is validated by
/// the checkout procedure later, not here.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(input): Json<AddToCartInput>,
) -> Result<Json<CartView>> {
    let product = state.backend().get_product(input.product_id).await?;
    if !product.is_available {
        return Err(AppError::BadRequest("此商品目前無法購買".to_string()));
    }

    let mut cart = load_cart(&session).await;
    cart.add_item(&product, input.quantity.unwrap_or(1));
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::build(&cart, &state)))
}

/// Overwrite a line's quantity; at or below zero the line is removed.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(input): Json<UpdateCartInput>,
) -> Result<Json<CartView>> {
    let quantity = u32::try_from(input.quantity.max(0)).unwrap_or(0);

    let mut cart = load_cart(&session).await;
    cart.update_quantity(input.product_id, quantity);
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::build(&cart, &state)))
}

/// Remove a line from the cart.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(input): Json<RemoveFromCartInput>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await;
    cart.remove_item(input.product_id);
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::build(&cart, &state)))
}

/// Flip the cart panel's visibility flag.
#[instrument(skip(state, session))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await;
    cart.toggle_open();
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::build(&cart, &state)))
}

/// Cart count badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let cart = load_cart(&session).await;
    Json(CartCount {
        count: cart.item_count(),
    })
}
