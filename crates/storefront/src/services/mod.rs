//! Business services for the storefront.

pub mod checkout;
pub mod ecpay;
pub mod pickup;

pub use checkout::{CheckoutError, CheckoutForm, CheckoutOutcome, CheckoutService};
pub use ecpay::{EcpaySigner, PaymentRequest, SignError};
pub use pickup::{PickupBridge, PickupProvider};
