//! Integration test harness for Roastline.
//!
//! Builds the real routers against a `wiremock` stand-in for the managed
//! backend and drives them with `tower::ServiceExt::oneshot`. Sessions use
//! the in-memory store, and [`TestClient`] replays the session cookie so a
//! cart added in one request is still there for the checkout submit.
//!
//! # Example
//!
//! ```rust,ignore
//! let backend = MockServer::start().await;
//! let mut client = TestClient::new(storefront_app(backend.uri()));
//!
//! let response = client.post_json("/cart/add", &json!({ "product_id": id })).await;
//! assert_eq!(response.status, StatusCode::OK);
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use secrecy::SecretString;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use roastline_admin::config::AdminConfig;
use roastline_storefront::config::{
    BackendConfig, CheckoutRules, EcpayConfig, PickupConfig, StorefrontConfig,
};
use roastline_storefront::state::AppState;

/// Bearer token the admin test app accepts.
pub const ADMIN_TOKEN: &str = "q8Zk2mWv5Rt7Yp1Ln4Xc6Bd9Fg3Hj0Ks";

/// Public stage credentials from the gateway's integration docs.
pub const STAGE_MERCHANT_ID: &str = "2000132";
pub const STAGE_HASH_KEY: &str = "5294y06JbISpM5x9";
pub const STAGE_HASH_IV: &str = "v77hoKGq4kWxNNIS";

/// Storefront config pointing at a mock backend.
#[must_use]
pub fn storefront_config(backend_url: &str) -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://unused-in-tests"),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "https://shop.example.tw".to_string(),
        session_secret: SecretString::from("x".repeat(32)),
        backend: BackendConfig {
            url: backend_url.to_string(),
            anon_key: SecretString::from("anon-key-for-tests"),
        },
        ecpay: EcpayConfig {
            merchant_id: STAGE_MERCHANT_ID.to_string(),
            hash_key: SecretString::from(STAGE_HASH_KEY),
            hash_iv: SecretString::from(STAGE_HASH_IV),
            checkout_url: "https://payment-stage.ecpay.com.tw/Cashier/AioCheckOut/V5".to_string(),
        },
        pickup: PickupConfig {
            cvs_map_url: "https://logistics-stage.ecpay.com.tw/Express/map".to_string(),
            ezship_map_url: "https://map.ezship.com.tw/ezship_map_web_2014.jsp".to_string(),
            ezship_account: Some("shop@example.tw".to_string()),
        },
        checkout: CheckoutRules::default(),
        sentry_dsn: None,
    }
}

/// The storefront router with in-memory sessions, ready for `oneshot`.
#[must_use]
pub fn storefront_app(backend_url: &str) -> Router {
    let state = AppState::new(storefront_config(backend_url));
    let session_layer = SessionManagerLayer::new(MemoryStore::default());

    Router::new()
        .merge(roastline_storefront::routes::routes())
        .layer(session_layer)
        .with_state(state)
}

/// The admin router, ready for `oneshot`.
#[must_use]
pub fn admin_app(backend_url: &str) -> Router {
    let config = AdminConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        backend: roastline_admin::config::BackendConfig {
            url: backend_url.to_string(),
            service_key: SecretString::from("service-key-for-tests"),
        },
        admin_token: SecretString::from(ADMIN_TOKEN),
        sentry_dsn: None,
    };
    let state = roastline_admin::state::AppState::new(config);

    Router::new()
        .merge(roastline_admin::routes::routes())
        .with_state(state)
}

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Body as UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON.
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Oneshot driver that replays the session cookie across requests.
pub struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    /// Wrap a router.
    #[must_use]
    pub fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    /// Send a request, remembering any session cookie the response sets.
    pub async fn send(&mut self, mut request: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let raw = set_cookie.to_str().unwrap();
            // Keep only the name=value pair; attributes don't matter here.
            if let Some(pair) = raw.split(';').next() {
                self.cookie = Some(pair.to_string());
            }
        }

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        TestResponse { status, body }
    }

    /// GET a path.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method("GET")
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// POST a JSON body.
    pub async fn post_json(&mut self, path: &str, body: &serde_json::Value) -> TestResponse {
        self.send(
            Request::builder()
                .method("POST")
                .uri(path)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(body).unwrap()))
                .unwrap(),
        )
        .await
    }

    /// POST a form-encoded body (as the external map services do).
    pub async fn post_form(&mut self, path: &str, body: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method("POST")
                .uri(path)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}
