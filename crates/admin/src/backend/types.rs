//! Typed views of the backend rows the back office works with.

use chrono::{DateTime, Utc};
use roastline_core::{OrderId, OrderStatus, ProductId, UserId};
use serde::{Deserialize, Serialize};

/// An order row.
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

/// A line item row joined with its product's display fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: uuid::Uuid,
    pub order_id: OrderId,
    pub coffee_id: ProductId,
    pub quantity: u32,
    pub price_at_time: i64,
    #[serde(default)]
    pub coffee: Option<OrderItemProduct>,
}

/// The product fields joined onto a line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemProduct {
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// The slice of a profile row the back office needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileEmail {
    #[serde(default)]
    pub email: Option<String>,
}
