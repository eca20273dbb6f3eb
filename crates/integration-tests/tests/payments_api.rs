//! Payment signature endpoint.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;
use wiremock::MockServer;

use roastline_integration_tests::{
    storefront_app, TestClient, STAGE_HASH_IV, STAGE_HASH_KEY, STAGE_MERCHANT_ID,
};

#[tokio::test]
async fn signs_a_full_parameter_set() {
    let backend = MockServer::start().await;
    let mut client = TestClient::new(storefront_app(&backend.uri()));

    let response = client
        .post_json(
            "/api/payments/ecpay",
            &json!({
                "orderId": "c88de0c5-3b67-4b32-8b9f-02f30a9b3f31",
                "amount": 560,
                "itemDescription": "耶加雪菲 x2"
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    assert_eq!(
        body["actionUrl"],
        "https://payment-stage.ecpay.com.tw/Cashier/AioCheckOut/V5"
    );

    let params = body["params"].as_object().unwrap();
    assert_eq!(params["MerchantID"], STAGE_MERCHANT_ID);
    assert_eq!(params["TotalAmount"], "560");
    assert_eq!(params["ItemName"], "耶加雪菲 x2");
    assert_eq!(params["PaymentType"], "aio");
    assert_eq!(params["EncryptType"], "1");
    assert_eq!(
        params["ReturnURL"],
        "https://shop.example.tw/api/payments/ecpay/return"
    );

    // 36-character order id with dashes -> at most 20, no dashes.
    let trade_no = params["MerchantTradeNo"].as_str().unwrap();
    assert_eq!(trade_no, "c88de0c53b674b328b9f");

    let mac = params["CheckMacValue"].as_str().unwrap();
    assert_eq!(mac.len(), 64);
    assert!(mac.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
}

#[tokio::test]
async fn fractional_amounts_round_half_up() {
    let backend = MockServer::start().await;
    let mut client = TestClient::new(storefront_app(&backend.uri()));

    let response = client
        .post_json(
            "/api/payments/ecpay",
            &json!({ "orderId": "order-7", "amount": 560.5 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["params"]["TotalAmount"], "561");
}

#[tokio::test]
async fn missing_required_input_is_a_client_error() {
    let backend = MockServer::start().await;
    let mut client = TestClient::new(storefront_app(&backend.uri()));

    let response = client
        .post_json("/api/payments/ecpay", &json!({ "amount": 560 }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = client
        .post_json("/api/payments/ecpay", &json!({ "orderId": "order-7" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = client
        .post_json(
            "/api/payments/ecpay",
            &json!({ "orderId": "   ", "amount": 560 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signing_secrets_never_reach_the_client() {
    let backend = MockServer::start().await;
    let mut client = TestClient::new(storefront_app(&backend.uri()));

    let response = client
        .post_json(
            "/api/payments/ecpay",
            &json!({ "orderId": "order-7", "amount": 560 }),
        )
        .await;

    let text = response.text();
    assert!(!text.contains(STAGE_HASH_KEY));
    assert!(!text.contains(STAGE_HASH_IV));
}

#[tokio::test]
async fn gateway_return_rejects_unsigned_notifications() {
    let backend = MockServer::start().await;
    let mut client = TestClient::new(storefront_app(&backend.uri()));

    let response = client
        .post_form(
            "/api/payments/ecpay/return",
            "MerchantTradeNo=abc&RtnCode=1&CheckMacValue=BOGUS",
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().starts_with("0|"));
}
