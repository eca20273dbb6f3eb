//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::BackendClient;
use crate::config::StorefrontConfig;
use crate::services::{CheckoutService, EcpaySigner, PickupBridge};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Every collaborator is owned here and handed
/// to handlers through axum's `State` extractor - no ambient globals.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: BackendClient,
    signer: EcpaySigner,
    pickup: PickupBridge,
    checkout: CheckoutService,
}

impl AppState {
    /// Wire up the application state from configuration.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let backend = BackendClient::new(&config.backend);
        let signer = EcpaySigner::new(&config.ecpay, &config.base_url);
        let pickup = PickupBridge::new(&config.pickup, &config.ecpay.merchant_id);
        let checkout = CheckoutService::new(backend.clone(), signer.clone(), config.checkout);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                signer,
                pickup,
                checkout,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Get a reference to the payment request signer.
    #[must_use]
    pub fn signer(&self) -> &EcpaySigner {
        &self.inner.signer
    }

    /// Get a reference to the store-picker bridge.
    #[must_use]
    pub fn pickup(&self) -> &PickupBridge {
        &self.inner.pickup
    }

    /// Get a reference to the checkout orchestrator.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }
}
