//! Session identity routes.
//!
//! Authentication itself (passwords, OAuth, magic links) is the backend's
//! concern. Once the client has a verified identity from the backend's auth
//! service, it registers that identity here so server-side handlers know who
//! the session belongs to. Guests simply never call this.

use axum::{http::StatusCode, Json};
use roastline_core::{Email, UserId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::models::{session_keys, CurrentUser};

/// Identity payload from the backend's auth flow.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInput {
    pub user_id: UserId,
    pub email: Email,
}

/// Remember the backend-verified identity in the session.
#[instrument(skip(session, input))]
pub async fn login(session: Session, Json(input): Json<SessionInput>) -> Result<StatusCode> {
    session
        .insert(
            session_keys::CURRENT_USER,
            CurrentUser {
                id: input.user_id,
                email: input.email,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Forget the session identity.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    let _ = session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await;
    Ok(StatusCode::NO_CONTENT)
}
