//! HTTP client for the managed backend's REST/RPC API.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use roastline_core::{OrderId, ProductId, UserId};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::BackendConfig;

use super::types::{CheckoutCreated, CheckoutRpc, Order, OrderItem, Product};
use super::BackendError;

/// Catalog cache TTL.
const CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Shape of a backend error body.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Client for the managed backend API.
///
/// Cheaply cloneable via `Arc`; catalog reads are cached for 5 minutes.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    rest_url: String,
    api_key: String,
    products: Cache<String, Arc<Vec<Product>>>,
}

impl BackendClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        let products = Cache::builder()
            .max_capacity(16)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                rest_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
                api_key: config.anon_key.expose_secret().to_string(),
                products,
            }),
        }
    }

    /// GET a table read and deserialize the row list.
    async fn get<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T, BackendError> {
        let response = self
            .inner
            .client
            .get(format!("{}/{path_and_query}", self.inner.rest_url))
            .header("apikey", &self.inner.api_key)
            .header("Authorization", format!("Bearer {}", self.inner.api_key))
            .send()
            .await?;

        Self::read_body(response).await
    }

    /// POST an RPC call and deserialize its result.
    async fn rpc<T: DeserializeOwned>(
        &self,
        function: &str,
        body: &impl serde::Serialize,
    ) -> Result<T, BackendError> {
        let response = self
            .inner
            .client
            .post(format!("{}/rpc/{function}", self.inner.rest_url))
            .header("apikey", &self.inner.api_key)
            .header("Authorization", format!("Bearer {}", self.inner.api_key))
            .json(body)
            .send()
            .await?;

        Self::read_body(response).await
    }

    /// Map status and parse the response body.
    async fn read_body<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| text.chars().take(200).collect());
            tracing::warn!(status = %status, message = %message, "Backend returned error");
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List the available catalog, ordered for display.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or rejects the read.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Arc<Vec<Product>>, BackendError> {
        let cache_key = "products:available".to_string();

        if let Some(products) = self.inner.products.get(&cache_key).await {
            debug!("Cache hit for catalog");
            return Ok(products);
        }

        let products: Vec<Product> = self
            .get("coffees?select=*&is_available=eq.true&order=sort_order.asc")
            .await?;
        let products = Arc::new(products);

        self.inner
            .products
            .insert(cache_key, Arc::clone(&products))
            .await;

        Ok(products)
    }

    /// Fetch a single product by id.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if no such product exists.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, BackendError> {
        let rows: Vec<Product> = self.get(&format!("coffees?select=*&id=eq.{id}")).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("product {id}")))
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Invoke the atomic checkout procedure.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Api`] when the backend rejects the order
    /// (e.g., insufficient stock); nothing was created in that case.
    #[instrument(skip(self, rpc), fields(total = rpc.p_total_amount))]
    pub async fn checkout(&self, rpc: &CheckoutRpc) -> Result<CheckoutCreated, BackendError> {
        self.rpc("handle_checkout", rpc).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Fetch a single order by id.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if the order does not exist or
    /// row-level security hides it.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, BackendError> {
        let rows: Vec<Order> = self.get(&format!("orders?select=*&id=eq.{id}")).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("order {id}")))
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or rejects the read.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, BackendError> {
        self.get(&format!(
            "orders?select=*&user_id=eq.{user_id}&order=created_at.desc"
        ))
        .await
    }

    /// List an order's line items, joined with product name/image.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or rejects the read.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn list_order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, BackendError> {
        self.get(&format!(
            "order_items?select=*,coffee:coffees(name,image_url)&order_id=eq.{order_id}"
        ))
        .await
    }
}
