//! HTTP client for the backend's REST API, service-role scope.

use std::sync::Arc;

use roastline_core::{OrderId, OrderStatus, UserId};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::config::BackendConfig;

use super::types::{Order, OrderItem, ProfileEmail};
use super::BackendError;

/// Shape of a backend error body.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Admin client for the managed backend API.
#[derive(Clone)]
pub struct AdminBackendClient {
    inner: Arc<AdminBackendClientInner>,
}

struct AdminBackendClientInner {
    client: reqwest::Client,
    rest_url: String,
    service_key: String,
}

impl AdminBackendClient {
    /// Create a new admin backend client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            inner: Arc::new(AdminBackendClientInner {
                client: reqwest::Client::new(),
                rest_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
                service_key: config.service_key.expose_secret().to_string(),
            }),
        }
    }

    fn request(&self, method: reqwest::Method, path_and_query: &str) -> reqwest::RequestBuilder {
        self.inner
            .client
            .request(
                method,
                format!("{}/{path_and_query}", self.inner.rest_url),
            )
            .header("apikey", &self.inner.service_key)
            .header(
                "Authorization",
                format!("Bearer {}", self.inner.service_key),
            )
    }

    async fn read_body<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
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

        serde_json::from_str(&text).map_err(BackendError::Parse)
    }

    /// List every order, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or rejects the read.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, BackendError> {
        let mut query = "orders?select=*&order=created_at.desc".to_string();
        if let Some(status) = status {
            query.push_str(&format!("&status=eq.{status}"));
        }
        let response = self.request(reqwest::Method::GET, &query).send().await?;
        Self::read_body(response).await
    }

    /// Fetch one order.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if no such order exists.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, BackendError> {
        let response = self
            .request(reqwest::Method::GET, &format!("orders?select=*&id=eq.{id}"))
            .send()
            .await?;
        let rows: Vec<Order> = Self::read_body(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("order {id}")))
    }

    /// List an order's line items, joined with product name/image.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or rejects the read.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn list_order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, BackendError> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!(
                    "order_items?select=*,coffee:coffees(name,image_url)&order_id=eq.{order_id}"
                ),
            )
            .send()
            .await?;
        Self::read_body(response).await
    }

    /// Resolve an order owner's contact email; `None` for guests or missing
    /// profiles.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or rejects the read.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn profile_email(&self, user_id: UserId) -> Result<Option<String>, BackendError> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("profiles?select=email&id=eq.{user_id}"),
            )
            .send()
            .await?;
        let rows: Vec<ProfileEmail> = Self::read_body(response).await?;
        Ok(rows.into_iter().next().and_then(|row| row.email))
    }

    /// Write a new status onto an order.
    ///
    /// The lifecycle guard lives in the HTTP layer; this method just writes.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if the filter matched no row, or
    /// [`BackendError::Api`] if the backend refused the write.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, BackendError> {
        let response = self
            .request(reqwest::Method::PATCH, &format!("orders?id=eq.{id}"))
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await?;
        let rows: Vec<Order> = Self::read_body(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("order {id}")))
    }
}
