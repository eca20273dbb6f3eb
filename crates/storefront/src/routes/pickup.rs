//! Store-picker bridge routes.
//!
//! `GET  /api/pickup/{provider}/start`    - self-submitting form that opens
//!                                          the provider's map in the popup
//! `POST /api/pickup/{provider}/callback` - receives the provider's POST and
//!                                          relays the normalized selection
//!                                          to the opener window
//! `GET  /api/pickup/{provider}/callback` - 405, the map services only POST
//!
//! The relay page posts the selection with `window.location.origin` as the
//! target origin, so only the same-origin opener can receive it. When the
//! page was opened directly (no opener), it shows the selection for manual
//! copy instead.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use roastline_core::PickupStore;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Escape text for placement inside an HTML element.
fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Serialize a value for embedding inside a `<script>` block.
///
/// `<` is escaped so a crafted store name cannot break out of the script
/// element.
fn json_for_script<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace('<', "\\u003c")
}

/// Open the provider's map: a minimal page that immediately form-POSTs to
/// the external map URL, carrying our callback URL.
#[instrument(skip(state))]
pub async fn start(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Html<String>, AppError> {
    let provider = state
        .pickup()
        .provider(&provider)
        .ok_or_else(|| AppError::NotFound(format!("pickup provider {provider}")))?;

    let callback_url = format!(
        "{}/api/pickup/{}/callback",
        state.config().base_url.trim_end_matches('/'),
        provider.slug()
    );
    let launch = provider.launch(&callback_url);

    let inputs: String = launch
        .fields
        .iter()
        .map(|(name, value)| {
            format!(
                r#"<input type="hidden" name="{}" value="{}">"#,
                html_escape(name),
                html_escape(value)
            )
        })
        .collect();

    Ok(Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
</head>
<body>
    <form id="map-launch" method="post" action="{action}">{inputs}</form>
    <div style="text-align:center; padding: 20px;">
        <h3>正在開啟{title}門市地圖...</h3>
    </div>
    <script>document.getElementById('map-launch').submit();</script>
</body>
</html>"#,
        title = html_escape(provider.display_name()),
        action = html_escape(&launch.action_url),
    )))
}

/// Receive the provider's selection POST and relay it to the opener.
#[instrument(skip(state, form))]
pub async fn callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Html<String>, AppError> {
    let provider = state
        .pickup()
        .provider(&provider)
        .ok_or_else(|| AppError::NotFound(format!("pickup provider {provider}")))?;

    match provider.extract(&form) {
        Some(store) => {
            tracing::info!(store_id = %store.store_id, provider = provider.slug(), "Pickup store selected");
            Ok(Html(relay_page(&store, provider.slug())))
        }
        None => {
            // No usable selection: the customer backed out. Close quietly.
            Ok(Html(no_selection_page()))
        }
    }
}

/// The map services deliver selections by POST only.
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        "Method not allowed. Use POST from the map service.",
    )
        .into_response()
}

/// Page that hands the selection to the opener window and closes itself.
fn relay_page(store: &PickupStore, source: &str) -> String {
    let mut payload = serde_json::to_value(store).unwrap_or_default();
    if let Some(object) = payload.as_object_mut() {
        object.insert(
            "source".to_string(),
            serde_json::Value::String(source.to_string()),
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>門市選擇</title>
</head>
<body>
    <div style="text-align:center; padding: 20px;">
        <h3>處理門市選擇中...</h3>
        <p>即將返回結帳頁。</p>
    </div>
    <div id="fallback" style="display:none; text-align:center; padding: 20px;">
        <h3>已完成門市選擇</h3>
        <p>門市: {name} ({id})</p>
        <p>請關閉此視窗，回到結帳頁填入門市資訊。</p>
    </div>
    <script>
        const data = {json};
        if (window.opener) {{
            window.opener.postMessage(data, window.location.origin);
            window.close();
        }} else {{
            document.getElementById('fallback').style.display = 'block';
        }}
    </script>
</body>
</html>"#,
        name = html_escape(&store.store_name),
        id = html_escape(&store.store_id),
        json = json_for_script(&payload),
    )
}

/// Page shown when the provider posted back without a selection.
fn no_selection_page() -> String {
    r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>門市選擇</title>
</head>
<body>
    <div style="text-align:center; padding: 20px;">
        <h3>未完成門市選擇</h3>
        <p>請關閉此視窗並重新選擇門市。</p>
    </div>
    <script>window.close();</script>
</body>
</html>"#
        .to_string()
}
