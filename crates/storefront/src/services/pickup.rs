//! Store-picker bridge: external map widgets behind one normalized port.
//!
//! Two convenience-store networks provide their own map popup for choosing a
//! pickup point. Each ends its flow by form-POSTing the chosen store to a
//! callback URL we hand it; the field names and shapes differ per provider.
//! Everything provider-specific lives behind [`PickupProvider`], and both
//! providers converge on [`PickupStore`] before the selection reaches the
//! checkout form.
//!
//! The flow, per provider:
//! 1. `GET /api/pickup/{provider}/start` returns a self-submitting form that
//!    POSTs to the provider's map URL inside a named popup, carrying our
//!    callback URL.
//! 2. The provider POSTs the selection to
//!    `POST /api/pickup/{provider}/callback`.
//! 3. The callback page relays the normalized store to `window.opener` via a
//!    same-origin message and closes itself.

use std::collections::HashMap;

use roastline_core::PickupStore;

use crate::config::PickupConfig;

/// A launch form: where the popup posts, and with which fields.
#[derive(Debug, Clone)]
pub struct MapLaunch {
    /// The provider's map URL.
    pub action_url: String,
    /// Form fields to carry along.
    pub fields: Vec<(&'static str, String)>,
}

/// One external map provider.
pub trait PickupProvider: Send + Sync {
    /// URL path segment identifying the provider (`cvs`, `ezship`).
    fn slug(&self) -> &'static str;

    /// The chain label shown to customers.
    fn display_name(&self) -> &'static str;

    /// Build the form that opens this provider's map popup.
    fn launch(&self, callback_url: &str) -> MapLaunch;

    /// Pull the chosen store out of the provider's callback fields.
    ///
    /// Returns `None` when the POST carries no usable selection; the caller
    /// treats that as "user changed their mind", not an error.
    fn extract(&self, form: &HashMap<String, String>) -> Option<PickupStore>;
}

/// 7-ELEVEN store map (the logistics provider's CVS map service).
#[derive(Debug, Clone)]
pub struct CvsMapProvider {
    map_url: String,
    merchant_id: String,
}

impl PickupProvider for CvsMapProvider {
    fn slug(&self) -> &'static str {
        "cvs"
    }

    fn display_name(&self) -> &'static str {
        "7-ELEVEN"
    }

    fn launch(&self, callback_url: &str) -> MapLaunch {
        MapLaunch {
            action_url: self.map_url.clone(),
            fields: vec![
                ("MerchantID", self.merchant_id.clone()),
                ("LogisticsType", "CVS".to_string()),
                ("LogisticsSubType", "UNIMART".to_string()),
                ("IsCollection", "N".to_string()),
                ("ServerReplyURL", callback_url.to_string()),
            ],
        }
    }

    fn extract(&self, form: &HashMap<String, String>) -> Option<PickupStore> {
        // The map service has changed its field casing over the years; accept
        // every spelling that has been observed in callbacks.
        let store_id = first_present(form, &["CVSStoreID", "StoreId", "storeid"])?;
        let store_name = first_present(form, &["CVSStoreName", "StoreName", "storename"])
            .unwrap_or_default();
        let store_address = first_present(form, &["CVSAddress", "StoreAddress", "storeaddress"])
            .unwrap_or_default();
        Some(PickupStore {
            store_id,
            store_name,
            store_address,
        })
    }
}

/// ezship store map (FamilyMart network).
#[derive(Debug, Clone)]
pub struct EzshipProvider {
    map_url: String,
    account: Option<String>,
}

impl PickupProvider for EzshipProvider {
    fn slug(&self) -> &'static str {
        "ezship"
    }

    fn display_name(&self) -> &'static str {
        "全家"
    }

    fn launch(&self, callback_url: &str) -> MapLaunch {
        let mut fields = vec![
            ("processID", "roastline".to_string()),
            ("stCate", String::new()),
            ("stCode", String::new()),
            ("rtURL", callback_url.to_string()),
            ("webPara", String::new()),
        ];
        if let Some(account) = &self.account {
            fields.insert(0, ("suID", account.clone()));
        }
        MapLaunch {
            action_url: self.map_url.clone(),
            fields,
        }
    }

    fn extract(&self, form: &HashMap<String, String>) -> Option<PickupStore> {
        let store_id = first_present(form, &["stCode"])?;
        Some(PickupStore {
            store_id,
            store_name: first_present(form, &["stName"]).unwrap_or_default(),
            store_address: first_present(form, &["stAddr"]).unwrap_or_default(),
        })
    }
}

/// The configured set of providers.
#[derive(Clone)]
pub struct PickupBridge {
    cvs: CvsMapProvider,
    ezship: EzshipProvider,
}

impl PickupBridge {
    /// Build both providers from config. The CVS map authenticates launches
    /// with the gateway merchant id.
    #[must_use]
    pub fn new(config: &PickupConfig, merchant_id: &str) -> Self {
        Self {
            cvs: CvsMapProvider {
                map_url: config.cvs_map_url.clone(),
                merchant_id: merchant_id.to_string(),
            },
            ezship: EzshipProvider {
                map_url: config.ezship_map_url.clone(),
                account: config.ezship_account.clone(),
            },
        }
    }

    /// Look a provider up by its URL slug.
    #[must_use]
    pub fn provider(&self, slug: &str) -> Option<&dyn PickupProvider> {
        match slug {
            "cvs" => Some(&self.cvs),
            "ezship" => Some(&self.ezship),
            _ => None,
        }
    }
}

/// First non-empty value among the candidate keys.
fn first_present(form: &HashMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| form.get(*key))
        .find(|value| !value.is_empty())
        .cloned()
}
