//! Domain models for the storefront.

pub mod cart;
pub mod session;

pub use cart::{Cart, CartItem};
pub use session::{keys as session_keys, CurrentUser};
