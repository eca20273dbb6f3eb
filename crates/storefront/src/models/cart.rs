//! Shopping cart domain model.
//!
//! The cart is pure state plus arithmetic; persistence is the caller's
//! concern. In production the serialized cart rides in the browser-scoped
//! session (durable across restarts via the session store); tests construct
//! carts directly. None of these operations can fail - malformed price
//! strings degrade to zero and missing ids are no-ops.

use roastline_core::{FreeShippingProgress, Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::backend::types::{CheckoutRpcItem, Product};
use crate::config::CheckoutRules;

/// A product snapshot plus the quantity the customer wants.
///
/// Snapshot fields are copied at add time so the cart keeps rendering even if
/// the catalog row changes underneath it. Identity is the product id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub price_display: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub flavor: Option<String>,
    /// Always >= 1; a quantity below 1 removes the item instead.
    pub quantity: u32,
}

impl CartItem {
    /// Snapshot a catalog product at a given quantity.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price_display: product.price_display.clone(),
            image_url: product.image_url.clone(),
            flavor: product.flavor.clone(),
            quantity: quantity.max(1),
        }
    }

    /// Unit price parsed from the snapshot's display string.
    #[must_use]
    pub fn unit_price(&self) -> Money {
        self.price_display
            .as_deref()
            .map_or(Money::ZERO, Money::parse_display)
    }

    /// Price of this line (unit price times quantity).
    #[must_use]
    pub fn line_price(&self) -> Money {
        self.unit_price().times(self.quantity)
    }
}

/// The cart: an insertion-ordered list of items plus a UI visibility flag.
///
/// Invariant: no two entries share a product id (adds merge into the existing
/// entry).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
    /// Whether the cart panel is open. UI state only, no business effect.
    #[serde(default)]
    pub is_open: bool,
}

impl Cart {
    /// An empty, closed cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` of a product, merging with an existing entry.
    ///
    /// Opens the cart panel as a side effect, matching the shop's
    /// add-to-cart UX. No upper bound is enforced here; stock is validated
    /// by the checkout procedure.
    pub fn add_item(&mut self, product: &Product, quantity: u32) {
        let quantity = quantity.max(1);
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product.id)
        {
            existing.quantity += quantity;
        } else {
            self.items.push(CartItem::from_product(product, quantity));
        }
        self.is_open = true;
    }

    /// Remove the entry with this product id; no-op if absent.
    pub fn remove_item(&mut self, product_id: ProductId) {
        self.items.retain(|item| item.product_id != product_id);
    }

    /// Overwrite an entry's quantity.
    ///
    /// A quantity below 1 removes the entry entirely. No-op if the product
    /// is not in the cart.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity < 1 {
            self.remove_item(product_id);
            return;
        }
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id)
        {
            item.quantity = quantity;
        }
    }

    /// Empty the cart (after a successful order submission).
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Flip the cart panel's visibility flag.
    pub fn toggle_open(&mut self) {
        self.is_open = !self.is_open;
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Sum of line prices.
    #[must_use]
    pub fn total_price(&self) -> Money {
        self.items.iter().map(CartItem::line_price).sum()
    }

    /// Progress toward the free-shipping threshold.
    #[must_use]
    pub fn free_shipping_progress(&self, rules: &CheckoutRules) -> FreeShippingProgress {
        FreeShippingProgress::compute(self.total_price(), rules.free_shipping_threshold)
    }

    /// Project cart lines into the checkout procedure's item shape.
    #[must_use]
    pub fn line_items(&self) -> Vec<CheckoutRpcItem> {
        self.items
            .iter()
            .map(|item| CheckoutRpcItem {
                coffee_id: item.product_id,
                quantity: item.quantity,
                price: item.unit_price().amount(),
            })
            .collect()
    }
}
