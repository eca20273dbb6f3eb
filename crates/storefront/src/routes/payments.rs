//! Payment signature endpoint and gateway return callback.
//!
//! `POST /api/payments/ecpay` exposes the signing service: order parameters
//! in, the full signed parameter set plus the gateway submission URL out.
//! The signing secrets never leave the server; clients only ever see the
//! finished parameter set.

use std::collections::BTreeMap;

use axum::{extract::State, Form, Json};
use chrono::Local;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::services::PaymentRequest;
use crate::state::AppState;

/// Signing request body.
///
/// Fields are optional so missing input yields a clean 400 instead of a
/// deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInput {
    pub order_id: Option<String>,
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub item_description: Option<String>,
    /// Accepted for forward compatibility with gateway e-invoice fields.
    #[serde(default)]
    pub recipient_email: Option<String>,
}

/// Produce a signed payment request for the hosted gateway.
#[instrument(skip(state, input))]
pub async fn sign(
    State(state): State<AppState>,
    Json(input): Json<SignInput>,
) -> Result<Json<PaymentRequest>> {
    let order_id = input
        .order_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("orderId is required".to_string()))?;
    let amount = input
        .amount
        .ok_or_else(|| AppError::BadRequest("amount is required".to_string()))?;

    let request = state.signer().sign(
        order_id,
        amount,
        input.item_description.as_deref().unwrap_or(""),
        Local::now(),
    )?;

    Ok(Json(request))
}

/// Server-to-server payment notification from the gateway.
///
/// Settlement handling is the backend's concern; this endpoint verifies the
/// signature, logs the outcome, and acknowledges in the gateway's expected
/// `1|OK` format so it stops retrying.
#[instrument(skip(state, params))]
pub async fn gateway_return(
    State(state): State<AppState>,
    Form(params): Form<BTreeMap<String, String>>,
) -> String {
    if state.signer().verify(&params) {
        let trade_no = params.get("MerchantTradeNo").map_or("?", String::as_str);
        let rtn_code = params.get("RtnCode").map_or("?", String::as_str);
        tracing::info!(trade_no, rtn_code, "Gateway payment notification verified");
        "1|OK".to_string()
    } else {
        tracing::warn!("Gateway payment notification failed signature check");
        "0|CheckMacValue Error".to_string()
    }
}
