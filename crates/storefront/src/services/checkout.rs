//! Checkout orchestration.
//!
//! Turns cart contents plus form input into a submitted order, then routes
//! the customer to the right post-purchase step: a bank-transfer summary, or
//! a signed redirect to the hosted payment gateway.
//!
//! The flow is strictly ordered: validate locally, compute totals, call the
//! atomic checkout procedure, then branch on the payment method. A rejected
//! submission leaves the cart untouched so the customer can retry without
//! re-entering anything; the HTTP layer clears the session cart only on the
//! success paths.

use chrono::{DateTime, Local, Utc};
use roastline_core::{
    Money, OrderId, OrderStatus, PaymentMethod, PickupStore, ShippingMethod, UserId,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::backend::types::CheckoutRpc;
use crate::backend::{BackendClient, BackendError};
use crate::config::CheckoutRules;
use crate::models::Cart;

use super::ecpay::{EcpaySigner, PaymentRequest, SignError};

/// Gateway field limit for the item description.
const ITEM_NAME_MAX_LEN: usize = 200;

/// What the customer typed into the checkout form.
///
/// The shipping method and pickup selection travel as structured fields; the
/// lossy address-string encoding happens once, at the wire boundary, in
/// [`compose_recipient_address`].
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutForm {
    pub name: String,
    pub phone: String,
    /// Freeform address; may be blank when a pickup store was chosen.
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub shipping_method: ShippingMethod,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Selection relayed from the store-picker bridge, if any.
    #[serde(default)]
    pub pickup_store: Option<PickupStore>,
}

/// Checkout failure classes, ordered by where in the flow they occur.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A required field was missing; nothing was sent anywhere.
    #[error("validation failed: {0}")]
    Validation(&'static str),

    /// The remote procedure rejected the order (stock, constraints, network).
    /// Nothing was created; the cart must stay as it was.
    #[error("checkout rejected: {0}")]
    Rejected(#[from] BackendError),

    /// The order exists but the payment redirect could not be produced.
    /// Operators must reconcile manually; this is deliberately distinct
    /// from [`CheckoutError::Rejected`].
    #[error("order {order_id} created but payment signing failed: {source}")]
    SignatureAfterOrder {
        order_id: OrderId,
        source: SignError,
    },
}

/// Totals shown while the form is being edited, and used for submission.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CheckoutTotals {
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub grand_total: Money,
}

/// Client-side projection of the created order for immediate display.
///
/// Best effort: assembled locally from what was submitted, not re-fetched,
/// so it may drift from the persisted record in minor fields.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub grand_total: Money,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub recipient_address: String,
}

/// Where the customer goes after a successful submission.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckoutOutcome {
    /// Manual bank transfer: show the summary and the remittance notice.
    BankTransfer { order: OrderSummary },
    /// Hosted gateway: auto-submit this signed form, navigating away.
    GatewayRedirect {
        order_id: OrderId,
        #[serde(flatten)]
        payment: PaymentRequest,
    },
}

/// The checkout orchestrator.
#[derive(Clone)]
pub struct CheckoutService {
    backend: BackendClient,
    signer: EcpaySigner,
    rules: CheckoutRules,
}

impl CheckoutService {
    /// Assemble the orchestrator from its collaborators.
    #[must_use]
    pub const fn new(backend: BackendClient, signer: EcpaySigner, rules: CheckoutRules) -> Self {
        Self {
            backend,
            signer,
            rules,
        }
    }

    /// Pricing totals for the current cart.
    #[must_use]
    pub fn totals(&self, cart: &Cart) -> CheckoutTotals {
        let subtotal = cart.total_price();
        let shipping_fee = if subtotal >= self.rules.free_shipping_threshold {
            Money::ZERO
        } else {
            self.rules.flat_shipping_fee
        };
        CheckoutTotals {
            subtotal,
            shipping_fee,
            grand_total: subtotal + shipping_fee,
        }
    }

    /// Submit the order and branch into the post-purchase flow.
    ///
    /// On success the caller is responsible for clearing the session cart;
    /// on [`CheckoutError::Rejected`] the cart must be left untouched.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Validation`] before anything is sent
    /// - [`CheckoutError::Rejected`] when the procedure fails; no order exists
    /// - [`CheckoutError::SignatureAfterOrder`] when the order exists but the
    ///   gateway redirect could not be built
    #[instrument(skip(self, cart, form), fields(payment = %form.payment_method))]
    pub async fn submit(
        &self,
        cart: &Cart,
        form: &CheckoutForm,
        user_id: Option<UserId>,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        validate(cart, form)?;

        let totals = self.totals(cart);
        let recipient_address = compose_recipient_address(form);

        let rpc = CheckoutRpc {
            p_user_id: user_id,
            p_total_amount: totals.grand_total.amount(),
            p_recipient_name: form.name.trim().to_string(),
            p_recipient_phone: form.phone.trim().to_string(),
            p_recipient_address: recipient_address.clone(),
            p_items: cart.line_items(),
            p_payment_method: form.payment_method,
        };

        let created = self.backend.checkout(&rpc).await?;
        tracing::info!(order_id = %created.order_id, total = totals.grand_total.amount(), "Order created");

        match form.payment_method {
            PaymentMethod::Atm => Ok(CheckoutOutcome::BankTransfer {
                order: OrderSummary {
                    id: created.order_id,
                    created_at: Utc::now(),
                    status: OrderStatus::Pending,
                    subtotal: totals.subtotal,
                    shipping_fee: totals.shipping_fee,
                    grand_total: totals.grand_total,
                    recipient_name: rpc.p_recipient_name,
                    recipient_phone: rpc.p_recipient_phone,
                    recipient_address,
                },
            }),
            PaymentMethod::Ecpay => {
                let payment = self
                    .signer
                    .sign(
                        &created.order_id.to_string(),
                        totals.grand_total.amount().into(),
                        &item_description(cart),
                        Local::now(),
                    )
                    .map_err(|source| CheckoutError::SignatureAfterOrder {
                        order_id: created.order_id,
                        source,
                    })?;
                Ok(CheckoutOutcome::GatewayRedirect {
                    order_id: created.order_id,
                    payment,
                })
            }
        }
    }
}

/// Client-side validation; blocks submission before any network call.
fn validate(cart: &Cart, form: &CheckoutForm) -> Result<(), CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::Validation("購物車是空的"));
    }
    if form.name.trim().is_empty() {
        return Err(CheckoutError::Validation("請填寫收件人姓名"));
    }
    if form.phone.trim().is_empty() {
        return Err(CheckoutError::Validation("請填寫聯絡電話"));
    }
    if form.address.trim().is_empty() && form.pickup_store.is_none() {
        return Err(CheckoutError::Validation("請填寫收件地址或選擇取貨門市"));
    }
    Ok(())
}

/// Compose the single recipient-address string the backend stores.
///
/// Pickup orders lead with the chain label so fulfillment can classify the
/// shipping method from the address alone; the optional note rides along as
/// a suffix.
fn compose_recipient_address(form: &CheckoutForm) -> String {
    let mut address = match (&form.pickup_store, form.shipping_method.chain_label()) {
        (Some(store), Some(label)) => store.address_line(label),
        (_, Some(label)) => {
            let typed = form.address.trim();
            if typed.starts_with(label) {
                typed.to_string()
            } else {
                format!("{label} {typed}")
            }
        }
        _ => form.address.trim().to_string(),
    };

    if let Some(note) = form.note.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        address.push_str(&format!(" (備註: {note})"));
    }

    address
}

/// Gateway item description: every line as `name x qty`, `#`-separated,
/// truncated to the gateway's field limit.
fn item_description(cart: &Cart) -> String {
    let joined = cart
        .items
        .iter()
        .map(|item| format!("{} x{}", item.name, item.quantity))
        .collect::<Vec<_>>()
        .join("#");
    joined.chars().take(ITEM_NAME_MAX_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::Product;
    use roastline_core::ProductId;
    use uuid::Uuid;

    fn product(id: u128, name: &str, price: &str) -> Product {
        Product {
            id: ProductId::new(Uuid::from_u128(id)),
            name: name.to_string(),
            origin: None,
            process: None,
            roast_level: None,
            flavor: None,
            features: None,
            price_display: Some(price.to_string()),
            image_url: None,
            is_available: true,
            sort_order: 0,
            stock: None,
            acid: None,
            aroma: None,
            bitter: None,
            body: None,
        }
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            name: "王小明".to_string(),
            phone: "0912345678".to_string(),
            address: "台北市大安區和平東路一段 1 號".to_string(),
            note: None,
            shipping_method: ShippingMethod::Home,
            payment_method: PaymentMethod::Atm,
            pickup_store: None,
        }
    }

    #[test]
    fn validation_requires_name_phone_and_address() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, "耶加雪菲", "NT$ 500"), 1);

        let mut missing_name = form();
        missing_name.name = "  ".to_string();
        assert!(matches!(
            validate(&cart, &missing_name),
            Err(CheckoutError::Validation(_))
        ));

        let mut missing_phone = form();
        missing_phone.phone = String::new();
        assert!(matches!(
            validate(&cart, &missing_phone),
            Err(CheckoutError::Validation(_))
        ));

        let mut missing_address = form();
        missing_address.address = String::new();
        assert!(matches!(
            validate(&cart, &missing_address),
            Err(CheckoutError::Validation(_))
        ));

        assert!(validate(&cart, &form()).is_ok());
    }

    #[test]
    fn pickup_store_satisfies_the_address_requirement() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, "耶加雪菲", "NT$ 500"), 1);

        let mut pickup = form();
        pickup.address = String::new();
        pickup.shipping_method = ShippingMethod::SevenEleven;
        pickup.pickup_store = Some(PickupStore {
            store_id: "131386".to_string(),
            store_name: "忠孝門市".to_string(),
            store_address: "台北市大安區".to_string(),
        });
        assert!(validate(&cart, &pickup).is_ok());
    }

    #[test]
    fn empty_cart_fails_validation() {
        assert!(matches!(
            validate(&Cart::new(), &form()),
            Err(CheckoutError::Validation(_))
        ));
    }

    #[test]
    fn address_composition_prefixes_the_chain_label() {
        let mut pickup = form();
        pickup.shipping_method = ShippingMethod::SevenEleven;
        pickup.address = "忠孝門市".to_string();
        assert_eq!(compose_recipient_address(&pickup), "7-11 忠孝門市");

        // Already-prefixed input is left alone.
        pickup.address = "7-11 忠孝門市".to_string();
        assert_eq!(compose_recipient_address(&pickup), "7-11 忠孝門市");
    }

    #[test]
    fn address_composition_prefers_the_structured_selection() {
        let mut pickup = form();
        pickup.shipping_method = ShippingMethod::FamilyMart;
        pickup.address = "whatever the user typed".to_string();
        pickup.pickup_store = Some(PickupStore {
            store_id: "F4538".to_string(),
            store_name: "林森店".to_string(),
            store_address: "高雄市新興區".to_string(),
        });
        assert_eq!(
            compose_recipient_address(&pickup),
            "全家 林森店 (F4538) 高雄市新興區"
        );
    }

    #[test]
    fn note_rides_along_as_a_suffix() {
        let mut with_note = form();
        with_note.note = Some("需研磨".to_string());
        assert_eq!(
            compose_recipient_address(&with_note),
            "台北市大安區和平東路一段 1 號 (備註: 需研磨)"
        );

        let mut blank_note = form();
        blank_note.note = Some("   ".to_string());
        assert_eq!(
            compose_recipient_address(&blank_note),
            "台北市大安區和平東路一段 1 號"
        );
    }

    #[test]
    fn totals_apply_the_flat_fee_below_threshold() {
        let service_rules = CheckoutRules::default();
        let mut cart = Cart::new();
        cart.add_item(&product(1, "耶加雪菲", "NT$ 500"), 1);

        let subtotal = cart.total_price();
        let shipping = if subtotal >= service_rules.free_shipping_threshold {
            Money::ZERO
        } else {
            service_rules.flat_shipping_fee
        };
        assert_eq!(subtotal + shipping, Money::new(560));
    }

    #[test]
    fn item_description_joins_and_caps() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, "耶加雪菲", "NT$ 450"), 2);
        cart.add_item(&product(2, "曼特寧", "NT$ 380"), 1);
        assert_eq!(item_description(&cart), "耶加雪菲 x2#曼特寧 x1");
    }
}
