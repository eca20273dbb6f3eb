//! Typed views of the backend's tables and RPC payloads.

use chrono::{DateTime, Utc};
use roastline_core::{Money, OrderId, OrderStatus, PaymentMethod, ProductId, UserId};
use serde::{Deserialize, Serialize};

/// A coffee in the catalog.
///
/// Columns mirror the backend's `coffees` table. `price_display` is the only
/// price field; it is parsed into [`Money`] exactly once via
/// [`Product::unit_price`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub process: Option<String>,
    #[serde(default)]
    pub roast_level: Option<String>,
    #[serde(default)]
    pub flavor: Option<String>,
    #[serde(default)]
    pub features: Option<String>,
    #[serde(default)]
    pub price_display: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub is_available: bool,
    pub sort_order: i32,
    #[serde(default)]
    pub stock: Option<i32>,
    // Flavor radar axes (0-5), rendered by the product page.
    #[serde(default)]
    pub acid: Option<i32>,
    #[serde(default)]
    pub aroma: Option<i32>,
    #[serde(default)]
    pub bitter: Option<i32>,
    #[serde(default)]
    pub body: Option<i32>,
}

impl Product {
    /// Unit price parsed from the display string; zero if undecipherable.
    #[must_use]
    pub fn unit_price(&self) -> Money {
        self.price_display
            .as_deref()
            .map_or(Money::ZERO, Money::parse_display)
    }
}

/// An order row as the backend returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub total_amount: i64,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub recipient_address: String,
}

/// A line item row, optionally joined with its product's display fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: uuid::Uuid,
    pub order_id: OrderId,
    pub coffee_id: ProductId,
    pub quantity: u32,
    /// Unit price captured at order time.
    pub price_at_time: i64,
    /// Joined product name/image, when the query selected them.
    #[serde(default)]
    pub coffee: Option<OrderItemProduct>,
}

/// The product fields joined onto a line item for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemProduct {
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Request payload for the `handle_checkout` remote procedure.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutRpc {
    pub p_user_id: Option<UserId>,
    pub p_total_amount: i64,
    pub p_recipient_name: String,
    pub p_recipient_phone: String,
    pub p_recipient_address: String,
    pub p_items: Vec<CheckoutRpcItem>,
    pub p_payment_method: PaymentMethod,
}

/// One line of the checkout payload.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutRpcItem {
    pub coffee_id: ProductId,
    pub quantity: u32,
    /// Unit price at submission time, in whole NT$.
    pub price: i64,
}

/// Response of the checkout procedure.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutCreated {
    pub order_id: OrderId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_unit_price_parses_display_once() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": "0a0cd4b4-5bb1-4717-a748-75e9e7a231b7",
            "name": "耶加雪菲 日曬",
            "price_display": "NT$ 450",
            "is_available": true,
            "sort_order": 1
        }))
        .expect("deserializes");
        assert_eq!(product.unit_price(), Money::new(450));
    }

    #[test]
    fn product_without_price_is_zero() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": "0a0cd4b4-5bb1-4717-a748-75e9e7a231b7",
            "name": "試烘批次",
            "is_available": false,
            "sort_order": 99
        }))
        .expect("deserializes");
        assert_eq!(product.unit_price(), Money::ZERO);
    }

    #[test]
    fn checkout_rpc_serializes_wire_names() {
        let rpc = CheckoutRpc {
            p_user_id: None,
            p_total_amount: 560,
            p_recipient_name: "王小明".to_string(),
            p_recipient_phone: "0912345678".to_string(),
            p_recipient_address: "台北市".to_string(),
            p_items: vec![],
            p_payment_method: PaymentMethod::Atm,
        };
        let json = serde_json::to_value(&rpc).expect("serializes");
        assert_eq!(json["p_total_amount"], 560);
        assert_eq!(json["p_payment_method"], "ATM");
        assert!(json["p_user_id"].is_null());
    }
}
