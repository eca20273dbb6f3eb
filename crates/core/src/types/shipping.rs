//! Shipping and payment method enumerations.

use serde::{Deserialize, Serialize};

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShippingMethod {
    /// Home delivery by courier.
    #[default]
    Home,
    /// Pickup at a 7-ELEVEN store.
    SevenEleven,
    /// Pickup at a FamilyMart store.
    FamilyMart,
}

impl ShippingMethod {
    /// Whether this method delivers to a convenience-store pickup point.
    #[must_use]
    pub const fn is_pickup(self) -> bool {
        matches!(self, Self::SevenEleven | Self::FamilyMart)
    }

    /// Chain label prepended to the recipient address for pickup orders.
    ///
    /// The fulfillment side classifies shipping from the address line, so the
    /// label must be stable.
    #[must_use]
    pub const fn chain_label(self) -> Option<&'static str> {
        match self {
            Self::Home => None,
            Self::SevenEleven => Some("7-11"),
            Self::FamilyMart => Some("全家"),
        }
    }

    /// Customer-facing name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Home => "宅配到府",
            Self::SevenEleven => "7-ELEVEN 超商取貨",
            Self::FamilyMart => "全家 Family 超商取貨",
        }
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    /// Manual bank transfer; the shop reconciles by hand.
    #[default]
    Atm,
    /// Hosted gateway checkout (credit card, ATM, CVS code).
    Ecpay,
}

impl PaymentMethod {
    /// Stable wire name, as the checkout procedure expects it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Atm => "ATM",
            Self::Ecpay => "ECPAY",
        }
    }

    /// Customer-facing name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Atm => "ATM / 匯款",
            Self::Ecpay => "綠界支付",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pickup_methods_carry_chain_labels() {
        assert_eq!(ShippingMethod::Home.chain_label(), None);
        assert_eq!(ShippingMethod::SevenEleven.chain_label(), Some("7-11"));
        assert_eq!(ShippingMethod::FamilyMart.chain_label(), Some("全家"));
        assert!(!ShippingMethod::Home.is_pickup());
        assert!(ShippingMethod::SevenEleven.is_pickup());
    }

    #[test]
    fn wire_names_match_checkout_contract() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Atm).expect("serializes"),
            "\"ATM\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Ecpay).expect("serializes"),
            "\"ECPAY\""
        );
        assert_eq!(
            serde_json::to_string(&ShippingMethod::SevenEleven).expect("serializes"),
            "\"SEVEN_ELEVEN\""
        );
    }
}
