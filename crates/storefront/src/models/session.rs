//! Session-related types.
//!
//! Types stored in the session: the cart, the backend-authenticated identity,
//! and the checkout in-flight marker.

use roastline_core::{Email, UserId};
use serde::{Deserialize, Serialize};

/// Session-stored user identity.
///
/// The backend's auth service issues and verifies the identity; the
/// storefront only remembers who the session belongs to. Guests simply have
/// no entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Backend user id.
    pub id: UserId,
    /// Contact email, used on order views.
    pub email: Email,
}

/// Session keys.
pub mod keys {
    /// Key for the serialized cart.
    pub const CART: &str = "cart";

    /// Key for the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key marking a checkout submission in flight (double-submit guard).
    pub const CHECKOUT_IN_FLIGHT: &str = "checkout_in_flight";
}
