//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (session store)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `BACKEND_URL` - Managed backend base URL (e.g., https://xyz.supabase.co)
//! - `BACKEND_ANON_KEY` - Backend anonymous API key (row-level security applies)
//! - `ECPAY_MERCHANT_ID` - Payment gateway merchant identifier
//! - `ECPAY_HASH_KEY` - Gateway signing key (never leaves the server)
//! - `ECPAY_HASH_IV` - Gateway signing IV (never leaves the server)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `ECPAY_CHECKOUT_URL` - Hosted checkout URL (default: stage environment)
//! - `CVS_MAP_URL` - 7-ELEVEN store map URL (default: stage environment)
//! - `EZSHIP_MAP_URL` - ezship store map URL
//! - `EZSHIP_ACCOUNT` - ezship merchant account for map sessions
//! - `FREE_SHIPPING_THRESHOLD` - NT$ threshold for free shipping (default: 3000)
//! - `FLAT_SHIPPING_FEE` - NT$ fee below the threshold (default: 60)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use roastline_core::Money;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` connection URL for the session store (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront (callback URLs are built from this)
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Managed backend API configuration
    pub backend: BackendConfig,
    /// Payment gateway configuration
    pub ecpay: EcpayConfig,
    /// Store-map provider configuration
    pub pickup: PickupConfig,
    /// Checkout pricing rules
    pub checkout: CheckoutRules,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Managed backend (tables + RPC) API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct BackendConfig {
    /// Backend base URL (REST and RPC live under `/rest/v1`)
    pub url: String,
    /// Anonymous API key; row-level security governs what it can see
    pub anon_key: SecretString,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

/// Payment gateway credentials and endpoints.
///
/// `hash_key`/`hash_iv` sign outbound payment requests and MUST stay on the
/// server; nothing in this struct is ever serialized to a client.
#[derive(Clone)]
pub struct EcpayConfig {
    /// Merchant identifier issued by the gateway
    pub merchant_id: String,
    /// Signing key
    pub hash_key: SecretString,
    /// Signing IV
    pub hash_iv: SecretString,
    /// Hosted checkout URL the signed form posts to
    pub checkout_url: String,
}

impl std::fmt::Debug for EcpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcpayConfig")
            .field("merchant_id", &self.merchant_id)
            .field("hash_key", &"[REDACTED]")
            .field("hash_iv", &"[REDACTED]")
            .field("checkout_url", &self.checkout_url)
            .finish()
    }
}

/// External store-map provider endpoints.
#[derive(Debug, Clone)]
pub struct PickupConfig {
    /// 7-ELEVEN (CVS) map URL
    pub cvs_map_url: String,
    /// ezship map URL
    pub ezship_map_url: String,
    /// ezship merchant account carried in the map launch form
    pub ezship_account: Option<String>,
}

/// Checkout pricing rules.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutRules {
    /// Subtotal at or above which shipping is free
    pub free_shipping_threshold: Money,
    /// Flat fee charged below the threshold
    pub flat_shipping_fee: Money,
}

impl Default for CheckoutRules {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Money::new(3000),
            flat_shipping_fee: Money::new(60),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        let session_secret = get_validated_secret("STOREFRONT_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "STOREFRONT_SESSION_SECRET")?;

        let backend = BackendConfig::from_env()?;
        let ecpay = EcpayConfig::from_env()?;
        let pickup = PickupConfig::from_env();
        let checkout = CheckoutRules::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            backend,
            ecpay,
            pickup,
            checkout,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: get_required_env("BACKEND_URL")?,
            anon_key: get_required_secret("BACKEND_ANON_KEY")?,
        })
    }
}

impl EcpayConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            merchant_id: get_required_env("ECPAY_MERCHANT_ID")?,
            hash_key: get_validated_secret("ECPAY_HASH_KEY")?,
            hash_iv: get_validated_secret("ECPAY_HASH_IV")?,
            checkout_url: get_env_or_default(
                "ECPAY_CHECKOUT_URL",
                "https://payment-stage.ecpay.com.tw/Cashier/AioCheckOut/V5",
            ),
        })
    }
}

impl PickupConfig {
    fn from_env() -> Self {
        Self {
            cvs_map_url: get_env_or_default(
                "CVS_MAP_URL",
                "https://logistics-stage.ecpay.com.tw/Express/map",
            ),
            ezship_map_url: get_env_or_default(
                "EZSHIP_MAP_URL",
                "https://map.ezship.com.tw/ezship_map_web_2014.jsp",
            ),
            ezship_account: get_optional_env("EZSHIP_ACCOUNT"),
        }
    }
}

impl CheckoutRules {
    fn from_env() -> Result<Self, ConfigError> {
        let threshold = get_env_or_default("FREE_SHIPPING_THRESHOLD", "3000")
            .parse::<i64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("FREE_SHIPPING_THRESHOLD".to_string(), e.to_string())
            })?;
        let fee = get_env_or_default("FLAT_SHIPPING_FEE", "60")
            .parse::<i64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("FLAT_SHIPPING_FEE".to_string(), e.to_string())
            })?;
        Ok(Self {
            free_shipping_threshold: Money::new(threshold),
            flat_shipping_fee: Money::new(fee),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    // Try primary key first (e.g., STOREFRONT_DATABASE_URL)
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    // Fallback to generic DATABASE_URL (set by Fly.io postgres attach)
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
