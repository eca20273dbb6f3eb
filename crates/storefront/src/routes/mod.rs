//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (backend reachability)
//!
//! # Catalog
//! GET  /products               - Product listing
//! GET  /products/{id}          - Product detail
//!
//! # Cart (JSON)
//! GET  /cart                   - Cart view with totals and shipping progress
//! POST /cart/add               - Add item (merges by product id)
//! POST /cart/update            - Overwrite quantity (below 1 removes)
//! POST /cart/remove            - Remove item
//! POST /cart/toggle            - Flip the cart panel flag
//! GET  /cart/count             - Cart count badge
//!
//! # Checkout
//! GET  /checkout/quote         - Subtotal / shipping fee / grand total
//! POST /checkout               - Submit the order
//!
//! # Payments
//! POST /api/payments/ecpay         - Sign a gateway payment request
//! POST /api/payments/ecpay/return  - Gateway server-to-server notification
//!
//! # Store picker
//! GET  /api/pickup/{provider}/start     - Open the provider map popup
//! POST /api/pickup/{provider}/callback  - Selection relay (GET -> 405)
//!
//! # Session identity
//! POST   /auth/session         - Remember the backend-verified identity
//! DELETE /auth/session         - Forget it
//!
//! # Account
//! GET  /account/orders         - Order history (requires identity)
//! GET  /orders/{id}            - Single order (RLS governs visibility)
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod payments;
pub mod pickup;
pub mod products;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/toggle", post(cart::toggle))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::submit))
        .route("/quote", get(checkout::quote))
}

/// Create the payment API router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/ecpay", post(payments::sign))
        .route("/ecpay/return", post(payments::gateway_return))
}

/// Create the store-picker bridge router.
pub fn pickup_routes() -> Router<AppState> {
    Router::new()
        .route("/{provider}/start", get(pickup::start))
        .route(
            "/{provider}/callback",
            post(pickup::callback).get(pickup::method_not_allowed),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/api/payments", payment_routes())
        .nest("/api/pickup", pickup_routes())
        .route(
            "/auth/session",
            post(auth::login).delete(auth::logout),
        )
        .route("/account/orders", get(orders::list))
        .route("/orders/{id}", get(orders::show))
}
