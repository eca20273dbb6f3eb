//! Configuration and backend diagnostics.
//!
//! Confirms the backend is reachable with the configured key and reports
//! how many catalog rows are visible. Useful after rotating keys or moving
//! environments.

use tracing::{info, warn};

/// Run the diagnostics.
///
/// # Errors
///
/// Returns an error if required environment variables are missing or the
/// backend is unreachable.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let backend_url =
        std::env::var("BACKEND_URL").map_err(|_| "BACKEND_URL not set")?;
    let api_key = std::env::var("BACKEND_SERVICE_KEY")
        .or_else(|_| std::env::var("BACKEND_ANON_KEY"))
        .map_err(|_| "BACKEND_SERVICE_KEY or BACKEND_ANON_KEY not set")?;

    info!(url = %backend_url, "Checking backend reachability");

    let client = reqwest::Client::new();
    let response = client
        .get(format!(
            "{}/rest/v1/coffees?select=id",
            backend_url.trim_end_matches('/')
        ))
        .header("apikey", &api_key)
        .header("Authorization", format!("Bearer {api_key}"))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("backend check failed ({status}): {body}").into());
    }

    let rows: Vec<serde_json::Value> = response.json().await?;
    info!(visible_products = rows.len(), "Backend reachable");

    if rows.is_empty() {
        warn!("Catalog is empty - run `roastline-cli seed` to load it");
    }

    Ok(())
}
