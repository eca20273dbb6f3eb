//! Checkout route handlers.
//!
//! `POST /checkout` drives the whole submission: validate, call the remote
//! checkout procedure, branch into bank-transfer or gateway-redirect. The
//! session cart is cleared only on the success paths; a rejected submission
//! leaves it untouched so the customer can retry.

use axum::{extract::State, Json};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::OptionalUser;
use crate::models::session_keys;
use crate::routes::cart::{load_cart, save_cart};
use crate::services::checkout::{CheckoutForm, CheckoutTotals};
use crate::services::CheckoutOutcome;
use crate::state::AppState;

/// Totals payload for the form view.
#[derive(Debug, Serialize)]
pub struct QuoteView {
    #[serde(flatten)]
    pub totals: CheckoutTotals,
    pub free_shipping: roastline_core::FreeShippingProgress,
}

/// Quote the current cart: subtotal, shipping fee, grand total.
///
/// Called when the checkout form opens so the customer sees the final
/// payable amount before submitting.
#[instrument(skip(state, session))]
pub async fn quote(State(state): State<AppState>, session: Session) -> Result<Json<QuoteView>> {
    let cart = load_cart(&session).await;
    Ok(Json(QuoteView {
        totals: state.checkout().totals(&cart),
        free_shipping: cart.free_shipping_progress(&state.config().checkout),
    }))
}

/// Submit the checkout form.
///
/// A second submission while one is in flight gets a 409; the double-submit
/// guard lives in the session, mirroring the disabled submit button on the
/// client.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Json(form): Json<CheckoutForm>,
) -> Result<Json<CheckoutOutcome>> {
    let in_flight: bool = session
        .get(session_keys::CHECKOUT_IN_FLIGHT)
        .await
        .ok()
        .flatten()
        .unwrap_or(false);
    if in_flight {
        return Err(AppError::Conflict("結帳處理中，請稍候".to_string()));
    }
    session
        .insert(session_keys::CHECKOUT_IN_FLIGHT, true)
        .await?;

    let mut cart = load_cart(&session).await;
    let user_id = user.map(|u| u.id);

    let result = state.checkout().submit(&cart, &form, user_id).await;

    // Always release the guard, success or not.
    let _ = session
        .remove::<bool>(session_keys::CHECKOUT_IN_FLIGHT)
        .await;

    match result {
        Ok(outcome) => {
            // Clear the cart on both success paths. For the gateway redirect
            // this happens before the browser navigates away - a deliberate
            // trade-off documented with the orchestrator.
            cart.clear();
            save_cart(&session, &cart).await?;
            Ok(Json(outcome))
        }
        Err(err) => Err(err.into()),
    }
}
