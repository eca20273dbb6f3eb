//! End-to-end checkout flow against a mock backend.
//!
//! Drives the real storefront router: add to cart, submit the checkout form,
//! and assert what reached the remote checkout procedure and what came back.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use roastline_integration_tests::{storefront_app, TestClient};

const PRODUCT_ID: &str = "0a0cd4b4-5bb1-4717-a748-75e9e7a231b7";
const ORDER_ID: &str = "c88de0c5-3b67-4b32-8b9f-02f30a9b3f31";

/// Mock the catalog row the cart snapshots on add.
async fn mock_product(server: &MockServer, price_display: &str) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/coffees"))
        .and(query_param("id", format!("eq.{PRODUCT_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": PRODUCT_ID,
            "name": "耶加雪菲 日曬",
            "price_display": price_display,
            "is_available": true,
            "sort_order": 1
        }])))
        .mount(server)
        .await;
}

fn checkout_form(payment_method: &str) -> serde_json::Value {
    json!({
        "name": "王小明",
        "phone": "0912345678",
        "address": "台北市大安區和平東路一段 1 號",
        "shipping_method": "HOME",
        "payment_method": payment_method
    })
}

#[tokio::test]
async fn bank_transfer_checkout_submits_totals_and_clears_the_cart() {
    let backend = MockServer::start().await;
    mock_product(&backend, "NT$500").await;

    // 500 < 3000 threshold, so the flat NT$60 fee applies: total 560.
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/handle_checkout"))
        .and(body_partial_json(json!({
            "p_total_amount": 560,
            "p_payment_method": "ATM",
            "p_recipient_name": "王小明",
            "p_user_id": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "order_id": ORDER_ID })))
        .expect(1)
        .mount(&backend)
        .await;

    let mut client = TestClient::new(storefront_app(&backend.uri()));

    let response = client
        .post_json("/cart/add", &json!({ "product_id": PRODUCT_ID }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["subtotal"], 500);

    let response = client.post_json("/checkout", &checkout_form("ATM")).await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    assert_eq!(body["outcome"], "bank_transfer");
    assert_eq!(body["order"]["grand_total"], 560);
    assert_eq!(body["order"]["subtotal"], 500);
    assert_eq!(body["order"]["shipping_fee"], 60);
    assert_eq!(body["order"]["status"], "pending");
    assert_eq!(body["order"]["id"], ORDER_ID);

    // Success clears the cart.
    let cart = client.get("/cart").await.json();
    assert_eq!(cart["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn rejected_checkout_keeps_the_cart_and_reports_generically() {
    let backend = MockServer::start().await;
    mock_product(&backend, "NT$500").await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/handle_checkout"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(json!({ "message": "insufficient stock for coffee" })),
        )
        .mount(&backend)
        .await;

    let mut client = TestClient::new(storefront_app(&backend.uri()));
    client
        .post_json("/cart/add", &json!({ "product_id": PRODUCT_ID }))
        .await;

    let response = client.post_json("/checkout", &checkout_form("ATM")).await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);

    // The client sees a generic notice, never the backend's internals.
    let text = response.text();
    assert!(text.contains("結帳發生錯誤"));
    assert!(!text.contains("insufficient stock"));

    // The cart is untouched so the customer can retry.
    let cart = client.get("/cart").await.json();
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["items"][0]["quantity"], 1);
}

#[tokio::test]
async fn gateway_checkout_returns_a_signed_redirect() {
    let backend = MockServer::start().await;
    mock_product(&backend, "NT$500").await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/handle_checkout"))
        .and(body_partial_json(json!({ "p_payment_method": "ECPAY" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "order_id": ORDER_ID })))
        .mount(&backend)
        .await;

    let mut client = TestClient::new(storefront_app(&backend.uri()));
    client
        .post_json("/cart/add", &json!({ "product_id": PRODUCT_ID }))
        .await;

    let response = client.post_json("/checkout", &checkout_form("ECPAY")).await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    assert_eq!(body["outcome"], "gateway_redirect");
    assert_eq!(
        body["actionUrl"],
        "https://payment-stage.ecpay.com.tw/Cashier/AioCheckOut/V5"
    );

    let params = body["params"].as_object().unwrap();
    assert_eq!(params["TotalAmount"], "560");

    // Trade number: separators stripped, capped at 20.
    let trade_no = params["MerchantTradeNo"].as_str().unwrap();
    assert!(trade_no.len() <= 20);
    assert!(!trade_no.contains('-'));

    // 64 uppercase hex characters.
    let mac = params["CheckMacValue"].as_str().unwrap();
    assert_eq!(mac.len(), 64);
    assert!(mac.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));

    // The signing secrets stay on the server.
    let text = response.text();
    assert!(!text.contains(roastline_integration_tests::STAGE_HASH_KEY));
    assert!(!text.contains(roastline_integration_tests::STAGE_HASH_IV));

    // Cart cleared before the browser navigates to the gateway.
    let cart = client.get("/cart").await.json();
    assert_eq!(cart["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn missing_required_fields_block_before_any_network_call() {
    let backend = MockServer::start().await;
    mock_product(&backend, "NT$500").await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/handle_checkout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "order_id": ORDER_ID })))
        .expect(0)
        .mount(&backend)
        .await;

    let mut client = TestClient::new(storefront_app(&backend.uri()));
    client
        .post_json("/cart/add", &json!({ "product_id": PRODUCT_ID }))
        .await;

    let mut form = checkout_form("ATM");
    form["name"] = json!("   ");
    let response = client.post_json("/checkout", &form).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pickup_selection_composes_the_labelled_address() {
    let backend = MockServer::start().await;
    mock_product(&backend, "NT$500").await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/handle_checkout"))
        .and(body_partial_json(json!({
            "p_recipient_address": "7-11 忠孝門市 (131386) 台北市大安區 (備註: 需研磨)"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "order_id": ORDER_ID })))
        .expect(1)
        .mount(&backend)
        .await;

    let mut client = TestClient::new(storefront_app(&backend.uri()));
    client
        .post_json("/cart/add", &json!({ "product_id": PRODUCT_ID }))
        .await;

    let response = client
        .post_json(
            "/checkout",
            &json!({
                "name": "王小明",
                "phone": "0912345678",
                "address": "",
                "note": "需研磨",
                "shipping_method": "SEVEN_ELEVEN",
                "payment_method": "ATM",
                "pickup_store": {
                    "storeId": "131386",
                    "storeName": "忠孝門市",
                    "storeAddress": "台北市大安區"
                }
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn empty_cart_cannot_be_submitted() {
    let backend = MockServer::start().await;

    let mut client = TestClient::new(storefront_app(&backend.uri()));
    let response = client.post_json("/checkout", &checkout_form("ATM")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
