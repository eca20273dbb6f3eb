//! Admin authentication.
//!
//! Every admin request must carry `Authorization: Bearer <ADMIN_API_TOKEN>`.
//! Tokens are compared in constant time over their SHA-256 digests so
//! length and prefix differences leak nothing.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::state::AppState;

/// Extractor that requires the admin bearer token.
pub struct RequireAdminToken;

/// Rejection for [`RequireAdminToken`]: a JSON 401.
pub struct AdminAuthRejection;

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "unauthorized" })),
        )
            .into_response()
    }
}

impl FromRequestParts<AppState> for RequireAdminToken {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AdminAuthRejection)?;

        let expected = state.config().admin_token.expose_secret();
        if tokens_match(presented, expected) {
            Ok(Self)
        } else {
            Err(AdminAuthRejection)
        }
    }
}

/// Constant-time token comparison via SHA-256 digests.
fn tokens_match(presented: &str, expected: &str) -> bool {
    let presented = Sha256::digest(presented.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    presented.as_slice().ct_eq(expected.as_slice()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_tokens_pass() {
        assert!(tokens_match("tok-abc", "tok-abc"));
    }

    #[test]
    fn mismatched_tokens_fail_regardless_of_length() {
        assert!(!tokens_match("tok-abc", "tok-abd"));
        assert!(!tokens_match("tok", "tok-abc"));
        assert!(!tokens_match("", "tok-abc"));
    }
}
