//! Back-office order listing and guarded status transitions.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use roastline_integration_tests::{admin_app, TestClient, ADMIN_TOKEN};

const ORDER_ID: &str = "c88de0c5-3b67-4b32-8b9f-02f30a9b3f31";
const USER_ID: &str = "4f2c8a31-9f14-4c2e-8d27-5b6f0e9a1c44";

fn order_row(status: &str) -> serde_json::Value {
    json!({
        "id": ORDER_ID,
        "user_id": USER_ID,
        "created_at": "2026-08-01T03:21:00Z",
        "status": status,
        "total_amount": 560,
        "recipient_name": "王小明",
        "recipient_phone": "0912345678",
        "recipient_address": "台北市大安區"
    })
}

/// Authorized request helper.
async fn authed(
    client: &mut TestClient,
    method_str: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> roastline_integration_tests::TestResponse {
    let mut builder = Request::builder()
        .method(method_str)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"));
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    client.send(builder.body(body).unwrap()).await
}

#[tokio::test]
async fn listing_requires_the_bearer_token() {
    let backend = MockServer::start().await;
    let mut client = TestClient::new(admin_app(&backend.uri()));

    let response = client.get("/orders").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn orders_are_enriched_with_email_items_and_transitions() {
    let backend = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([order_row("pending")])))
        .mount(&backend)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/order_items"))
        .and(query_param("order_id", format!("eq.{ORDER_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "7d3f5a21-1111-4222-8333-944445555666",
            "order_id": ORDER_ID,
            "coffee_id": "0a0cd4b4-5bb1-4717-a748-75e9e7a231b7",
            "quantity": 2,
            "price_at_time": 450,
            "coffee": { "name": "耶加雪菲 日曬", "image_url": null }
        }])))
        .mount(&backend)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", format!("eq.{USER_ID}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "email": "customer@example.tw" }])),
        )
        .mount(&backend)
        .await;

    let mut client = TestClient::new(admin_app(&backend.uri()));
    let response = authed(&mut client, "GET", "/orders", None).await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["user_email"], "customer@example.tw");
    assert_eq!(orders[0]["items"][0]["coffee"]["name"], "耶加雪菲 日曬");
    assert_eq!(
        orders[0]["allowed_transitions"],
        json!(["paid", "cancelled"])
    );
}

#[tokio::test]
async fn guest_orders_resolve_to_the_guest_label() {
    let backend = MockServer::start().await;

    let mut guest = order_row("pending");
    guest["user_id"] = json!(null);
    Mock::given(method("GET"))
        .and(path("/rest/v1/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([guest])))
        .mount(&backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/order_items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&backend)
        .await;

    let mut client = TestClient::new(admin_app(&backend.uri()));
    let response = authed(&mut client, "GET", "/orders", None).await;

    assert_eq!(response.json()[0]["user_email"], "Guest");
}

#[tokio::test]
async fn status_filter_reaches_the_backend_query() {
    let backend = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/orders"))
        .and(query_param("status", "eq.pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&backend)
        .await;

    let mut client = TestClient::new(admin_app(&backend.uri()));
    let response = authed(&mut client, "GET", "/orders?status=pending", None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn legal_transition_is_written_through() {
    let backend = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/orders"))
        .and(query_param("id", format!("eq.{ORDER_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([order_row("pending")])))
        .mount(&backend)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/orders"))
        .and(query_param("id", format!("eq.{ORDER_ID}")))
        .and(body_partial_json(json!({ "status": "paid" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([order_row("paid")])))
        .expect(1)
        .mount(&backend)
        .await;

    let mut client = TestClient::new(admin_app(&backend.uri()));
    let response = authed(
        &mut client,
        "POST",
        &format!("/orders/{ORDER_ID}/status"),
        Some(json!({ "status": "paid" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["status"], "paid");
}

#[tokio::test]
async fn illegal_transition_is_rejected_without_a_write() {
    let backend = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/orders"))
        .and(query_param("id", format!("eq.{ORDER_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([order_row("completed")])))
        .mount(&backend)
        .await;

    // The guard fires before the backend sees a write.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&backend)
        .await;

    let mut client = TestClient::new(admin_app(&backend.uri()));
    let response = authed(
        &mut client,
        "POST",
        &format!("/orders/{ORDER_ID}/status"),
        Some(json!({ "status": "paid" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json()["allowed"], json!([]));
}

#[tokio::test]
async fn cancel_is_offered_from_pending_and_paid_only() {
    let backend = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/orders"))
        .and(query_param("id", format!("eq.{ORDER_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([order_row("paid")])))
        .mount(&backend)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/orders"))
        .and(body_partial_json(json!({ "status": "cancelled" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([order_row("cancelled")])))
        .mount(&backend)
        .await;

    let mut client = TestClient::new(admin_app(&backend.uri()));
    let response = authed(
        &mut client,
        "POST",
        &format!("/orders/{ORDER_ID}/status"),
        Some(json!({ "status": "cancelled" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["status"], "cancelled");
}

#[tokio::test]
async fn backend_failure_during_update_reports_bad_gateway() {
    let backend = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/orders"))
        .and(query_param("id", format!("eq.{ORDER_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([order_row("pending")])))
        .mount(&backend)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/orders"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .mount(&backend)
        .await;

    let mut client = TestClient::new(admin_app(&backend.uri()));
    let response = authed(
        &mut client,
        "POST",
        &format!("/orders/{ORDER_ID}/status"),
        Some(json!({ "status": "paid" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
}
