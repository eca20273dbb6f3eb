//! Normalized convenience-store pickup point.

use serde::{Deserialize, Serialize};

/// A pickup point chosen from one of the external store-map widgets.
///
/// Both map providers converge on this shape before anything downstream sees
/// the selection; the provider-specific field names stay inside the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupStore {
    /// Provider-assigned store code.
    #[serde(rename = "storeId")]
    pub store_id: String,
    /// Store display name (e.g. `忠孝門市`).
    #[serde(rename = "storeName")]
    pub store_name: String,
    /// Full street address of the store.
    #[serde(rename = "storeAddress")]
    pub store_address: String,
}

impl PickupStore {
    /// Render the selection as a single address line.
    ///
    /// The chain label goes first so fulfillment can classify the shipping
    /// method from the address string alone.
    #[must_use]
    pub fn address_line(&self, chain_label: &str) -> String {
        format!(
            "{chain_label} {} ({}) {}",
            self.store_name, self.store_id, self.store_address
        )
    }
}
