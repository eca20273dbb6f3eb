//! Payment gateway request signing.
//!
//! The hosted gateway accepts a form POST whose parameters carry a
//! `CheckMacValue` integrity signature. The algorithm must be reproduced
//! byte-exact or the gateway rejects the trade:
//!
//! 1. Sort all parameters (except the signature itself) by key, ordinal order.
//! 2. Join as `key1=value1&key2=value2&...`.
//! 3. Wrap as `HashKey=<key>&<joined>&HashIV=<iv>`.
//! 4. Percent-encode the whole string, then lowercase the hex escapes.
//! 5. Restore `- _ . ! * ( )` to literals and `%20` to `+` (the gateway's
//!    legacy .NET UrlEncode dialect).
//! 6. SHA-256, hex, uppercase.
//!
//! The signing secrets never leave this module; callers only see the final
//! parameter set plus the gateway's submission URL.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use roastline_core::Money;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::EcpayConfig;

/// Gateway limit on `MerchantTradeNo` length.
const TRADE_NO_MAX_LEN: usize = 20;

/// The signature parameter's key.
const CHECK_MAC_KEY: &str = "CheckMacValue";

/// Rejected signing input.
///
/// No retry is meaningful for these; the caller sent a request that can
/// never produce a valid trade.
#[derive(Debug, Error)]
pub enum SignError {
    /// The order id was empty (or all separators).
    #[error("order id is required")]
    MissingOrderId,
    /// The amount rounded to zero or below.
    #[error("amount must be a positive number of dollars")]
    InvalidAmount,
}

/// A fully signed payment request, ready to become an auto-submitted form.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRequest {
    /// Hosted checkout URL the form posts to.
    #[serde(rename = "actionUrl")]
    pub action_url: String,
    /// All form fields, signature included. `BTreeMap` keeps them in the
    /// same ordinal order the signature was computed over.
    pub params: BTreeMap<String, String>,
}

/// Signs outbound payment requests with the merchant credentials.
#[derive(Clone)]
pub struct EcpaySigner {
    merchant_id: String,
    hash_key: SecretString,
    hash_iv: SecretString,
    checkout_url: String,
    base_url: String,
}

impl EcpaySigner {
    /// Create a signer from gateway config and the site base URL (used to
    /// build the callback URLs).
    #[must_use]
    pub fn new(config: &EcpayConfig, base_url: &str) -> Self {
        Self {
            merchant_id: config.merchant_id.clone(),
            hash_key: config.hash_key.clone(),
            hash_iv: config.hash_iv.clone(),
            checkout_url: config.checkout_url.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build and sign the full parameter set for one trade.
    ///
    /// `amount` is rounded half-up to whole dollars (the gateway only takes
    /// integers). Pure in its inputs: identical arguments produce an
    /// identical signature.
    ///
    /// # Errors
    ///
    /// Returns [`SignError`] when the order id is empty or the amount is not
    /// positive; nothing is signed in that case.
    pub fn sign(
        &self,
        order_id: &str,
        amount: Decimal,
        item_name: &str,
        now: DateTime<Local>,
    ) -> Result<PaymentRequest, SignError> {
        let trade_no = trade_number(order_id);
        if trade_no.is_empty() {
            return Err(SignError::MissingOrderId);
        }
        let total = Money::from_decimal_rounded(amount);
        if total.amount() <= 0 {
            return Err(SignError::InvalidAmount);
        }

        let mut params = BTreeMap::new();
        params.insert("MerchantID".to_string(), self.merchant_id.clone());
        params.insert("MerchantTradeNo".to_string(), trade_no);
        params.insert(
            "MerchantTradeDate".to_string(),
            now.format("%Y/%m/%d %H:%M:%S").to_string(),
        );
        params.insert("PaymentType".to_string(), "aio".to_string());
        params.insert("TotalAmount".to_string(), total.amount().to_string());
        params.insert("TradeDesc".to_string(), "Coffee Order".to_string());
        params.insert(
            "ItemName".to_string(),
            if item_name.is_empty() {
                "Coffee Products".to_string()
            } else {
                item_name.to_string()
            },
        );
        params.insert(
            "ReturnURL".to_string(),
            format!("{}/api/payments/ecpay/return", self.base_url),
        );
        params.insert("ChoosePayment".to_string(), "ALL".to_string());
        params.insert("EncryptType".to_string(), "1".to_string());
        params.insert(
            "OrderResultURL".to_string(),
            format!("{}/account/orders", self.base_url),
        );

        let mac = self.check_mac_value(&params);
        params.insert(CHECK_MAC_KEY.to_string(), mac);

        Ok(PaymentRequest {
            action_url: self.checkout_url.clone(),
            params,
        })
    }

    /// Recompute the signature over an inbound parameter set and compare.
    ///
    /// Used on the gateway's server-to-server payment notification.
    #[must_use]
    pub fn verify(&self, params: &BTreeMap<String, String>) -> bool {
        let Some(claimed) = params.get(CHECK_MAC_KEY) else {
            return false;
        };
        let expected = self.check_mac_value(params);
        expected == *claimed
    }

    /// Compute the signature over everything except the signature field.
    fn check_mac_value(&self, params: &BTreeMap<String, String>) -> String {
        let joined = params
            .iter()
            .filter(|(key, _)| key.as_str() != CHECK_MAC_KEY)
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");

        let raw = format!(
            "HashKey={}&{joined}&HashIV={}",
            self.hash_key.expose_secret(),
            self.hash_iv.expose_secret()
        );

        let encoded = encode_for_mac(&raw);

        let digest = Sha256::digest(encoded.as_bytes());
        hex::encode(digest).to_uppercase()
    }
}

/// Derive the gateway trade number from an order id.
///
/// Separators are stripped and the result capped at 20 characters to satisfy
/// the gateway's field limit.
fn trade_number(order_id: &str) -> String {
    order_id
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(TRADE_NO_MAX_LEN)
        .collect()
}

/// Apply the gateway's idiosyncratic encoding to the wrapped string.
///
/// Percent-encode every non-alphanumeric byte, lowercase the hex escapes,
/// then restore the characters the gateway's legacy encoder leaves literal.
fn encode_for_mac(raw: &str) -> String {
    let encoded = utf8_percent_encode(raw, NON_ALPHANUMERIC).to_string();
    lowercase_hex_escapes(&encoded)
        .replace("%2d", "-")
        .replace("%5f", "_")
        .replace("%2e", ".")
        .replace("%21", "!")
        .replace("%2a", "*")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%20", "+")
}

/// Lowercase the two hex digits of every `%XY` escape, leaving all other
/// characters untouched.
fn lowercase_hex_escapes(encoded: &str) -> String {
    let mut out = String::with_capacity(encoded.len());
    let mut chars = encoded.chars();
    while let Some(c) = chars.next() {
        out.push(c);
        if c == '%' {
            for _ in 0..2 {
                if let Some(hex) = chars.next() {
                    out.push(hex.to_ascii_lowercase());
                }
            }
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn test_signer() -> EcpaySigner {
        // Public stage credentials from the gateway's integration docs.
        EcpaySigner::new(
            &EcpayConfig {
                merchant_id: "2000132".to_string(),
                hash_key: SecretString::from("5294y06JbISpM5x9"),
                hash_iv: SecretString::from("v77hoKGq4kWxNNIS"),
                checkout_url: "https://payment-stage.ecpay.com.tw/Cashier/AioCheckOut/V5"
                    .to_string(),
            },
            "https://shop.example.tw",
        )
    }

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap()
    }

    #[test]
    fn signature_is_deterministic_and_well_formed() {
        let signer = test_signer();
        let order_id = Uuid::from_u128(0x1234_5678_9abc_def0).to_string();

        let first = signer
            .sign(&order_id, Decimal::new(560, 0), "耶加雪菲 x2", fixed_now())
            .unwrap();
        let second = signer
            .sign(&order_id, Decimal::new(560, 0), "耶加雪菲 x2", fixed_now())
            .unwrap();

        let mac = first.params.get(CHECK_MAC_KEY).expect("signed");
        assert_eq!(mac, second.params.get(CHECK_MAC_KEY).expect("signed"));
        assert_eq!(mac.len(), 64);
        assert!(mac
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn trade_number_strips_separators_and_truncates() {
        let trade_no = trade_number("c88de0c5-3b67-4b32-8b9f-02f30a9b3f31");
        assert!(trade_no.len() <= 20);
        assert!(!trade_no.contains('-'));
        assert_eq!(trade_no, "c88de0c53b674b328b9f");
    }

    #[test]
    fn amount_rounds_half_up_before_signing() {
        let signer = test_signer();
        let request = signer
            .sign("order7", Decimal::new(5605, 1), "x", fixed_now()) // 560.5
            .unwrap();
        assert_eq!(
            request.params.get("TotalAmount").map(String::as_str),
            Some("561")
        );
    }

    #[test]
    fn empty_or_worthless_input_is_rejected() {
        let signer = test_signer();
        assert!(matches!(
            signer.sign("", Decimal::new(560, 0), "x", fixed_now()),
            Err(SignError::MissingOrderId)
        ));
        assert!(matches!(
            signer.sign("---", Decimal::new(560, 0), "x", fixed_now()),
            Err(SignError::MissingOrderId)
        ));
        assert!(matches!(
            signer.sign("order7", Decimal::ZERO, "x", fixed_now()),
            Err(SignError::InvalidAmount)
        ));
    }

    #[test]
    fn signed_params_carry_callbacks_and_fixed_fields() {
        let signer = test_signer();
        let request = signer
            .sign("order7", Decimal::new(560, 0), "Coffee", fixed_now())
            .unwrap();
        assert_eq!(
            request.params.get("ReturnURL").map(String::as_str),
            Some("https://shop.example.tw/api/payments/ecpay/return")
        );
        assert_eq!(
            request.params.get("OrderResultURL").map(String::as_str),
            Some("https://shop.example.tw/account/orders")
        );
        assert_eq!(request.params.get("PaymentType").map(String::as_str), Some("aio"));
        assert_eq!(request.params.get("EncryptType").map(String::as_str), Some("1"));
        assert_eq!(
            request.params.get("MerchantTradeDate").map(String::as_str),
            Some("2026/03/14 15:09:26")
        );
        assert_eq!(request.action_url, signer.checkout_url);
    }

    #[test]
    fn verify_accepts_own_signature_and_rejects_tampering() {
        let signer = test_signer();
        let request = signer
            .sign("order7", Decimal::new(560, 0), "Coffee", fixed_now())
            .unwrap();

        assert!(signer.verify(&request.params));

        let mut tampered = request.params.clone();
        tampered.insert("TotalAmount".to_string(), "1".to_string());
        assert!(!signer.verify(&tampered));
    }

    #[test]
    fn encoding_matches_the_gateway_dialect() {
        // Space becomes +, the legacy-literal set survives, everything else
        // stays a lowercase escape.
        assert_eq!(encode_for_mac("a b-c_d.e!f*g(h)i"), "a+b-c_d.e!f*g(h)i");
        assert_eq!(encode_for_mac("k=v&x"), "k%3dv%26x");
    }

    #[test]
    fn secrets_never_appear_in_signed_params() {
        let signer = test_signer();
        let request = signer
            .sign("order7", Decimal::new(560, 0), "Coffee", fixed_now())
            .unwrap();
        for (key, value) in &request.params {
            assert!(!value.contains("5294y06JbISpM5x9"), "leak in {key}");
            assert!(!value.contains("v77hoKGq4kWxNNIS"), "leak in {key}");
        }
    }
}
