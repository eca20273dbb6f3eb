//! Session-store management.
//!
//! The storefront keeps carts in `PostgreSQL`-backed sessions; this creates
//! the table the session store expects.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - connection string

use sqlx::postgres::PgPoolOptions;
use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;

/// Create the session-store table.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the migration fails.
pub async fn migrate() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| "STOREFRONT_DATABASE_URL not set")?;

    info!("Connecting to session store database");
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;

    info!("Running session store migration");
    PostgresStore::new(pool).migrate().await?;

    info!("Session store migration complete");
    Ok(())
}
