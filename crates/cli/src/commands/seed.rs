//! Catalog seeding.
//!
//! Reads a JSON array of catalog rows and upserts them into the backend's
//! `coffees` table with the service-role key. Row ids drive the merge, so
//! re-running the command is safe.
//!
//! # Environment Variables
//!
//! - `BACKEND_URL` - managed backend base URL
//! - `BACKEND_SERVICE_KEY` - service-role API key

use std::path::Path;

use tracing::info;

/// Upsert catalog rows from a JSON file.
///
/// # Errors
///
/// Returns an error if environment variables are missing, the file cannot
/// be read or parsed, or the backend rejects the upsert.
pub async fn catalog(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let backend_url =
        std::env::var("BACKEND_URL").map_err(|_| "BACKEND_URL not set")?;
    let service_key =
        std::env::var("BACKEND_SERVICE_KEY").map_err(|_| "BACKEND_SERVICE_KEY not set")?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog rows");
    let content = tokio::fs::read_to_string(path).await?;
    let rows: Vec<serde_json::Value> = serde_json::from_str(&content)?;

    if rows.is_empty() {
        return Err("catalog file contains no rows".into());
    }
    info!(rows = rows.len(), "Parsed catalog file");

    let client = reqwest::Client::new();
    let response = client
        .post(format!(
            "{}/rest/v1/coffees",
            backend_url.trim_end_matches('/')
        ))
        .header("apikey", &service_key)
        .header("Authorization", format!("Bearer {service_key}"))
        .header("Prefer", "resolution=merge-duplicates")
        .json(&rows)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("backend rejected seed ({status}): {body}").into());
    }

    info!(rows = rows.len(), "Catalog seeded");
    Ok(())
}
