//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `ROCKETSHOES_API_URL` - Catalog/stock API base URL (default: `http://localhost:3333`)
//! - `ROCKETSHOES_API_TOKEN` - Bearer token sent to the catalog API
//! - `ROCKETSHOES_STORAGE_DIR` - Directory holding the persisted cart (default: `.rocketshoes`)
//! - `ROCKETSHOES_HTTP_TIMEOUT_SECS` - Catalog request timeout (default: 10)
//! - `ROCKETSHOES_CATALOG_CACHE_TTL_SECS` - Product details cache TTL (default: 300)
//! - `ROCKETSHOES_CURRENCY` - ISO 4217 code used to format prices (default: BRL)

use std::path::PathBuf;
use std::time::Duration;

use rocketshoes_core::CurrencyCode;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:3333";
const DEFAULT_STORAGE_DIR: &str = ".rocketshoes";
const DEFAULT_TIMEOUT_SECS: &str = "10";
const DEFAULT_CACHE_TTL_SECS: &str = "300";
const DEFAULT_CURRENCY: &str = "BRL";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Catalog/stock API configuration
    pub catalog: CatalogConfig,
    /// Directory where the key-value store keeps the cart
    pub storage_dir: PathBuf,
    /// Currency used when formatting cart totals
    pub currency: CurrencyCode,
}

/// Catalog API configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct CatalogConfig {
    /// Base URL; `products/{id}` and `stock/{id}` are resolved against it
    pub base_url: Url,
    /// Optional bearer token
    pub api_token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long product details stay cached (stock is never cached)
    pub cache_ttl: Duration,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl CatalogConfig {
    /// Catalog configuration pointing at `base_url` with default timeouts.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_token: None,
            timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(300),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = get_env_or_default(&lookup, "ROCKETSHOES_API_URL", DEFAULT_API_URL);
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("ROCKETSHOES_API_URL".to_string(), e.to_string())
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "ROCKETSHOES_API_URL".to_string(),
                "must be an absolute http(s) URL".to_string(),
            ));
        }

        let catalog = CatalogConfig {
            base_url,
            api_token: get_optional_env(&lookup, "ROCKETSHOES_API_TOKEN").map(SecretString::from),
            timeout: get_secs(&lookup, "ROCKETSHOES_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            cache_ttl: get_secs(
                &lookup,
                "ROCKETSHOES_CATALOG_CACHE_TTL_SECS",
                DEFAULT_CACHE_TTL_SECS,
            )?,
        };

        let storage_dir = PathBuf::from(get_env_or_default(
            &lookup,
            "ROCKETSHOES_STORAGE_DIR",
            DEFAULT_STORAGE_DIR,
        ));

        let currency = get_env_or_default(&lookup, "ROCKETSHOES_CURRENCY", DEFAULT_CURRENCY)
            .parse::<CurrencyCode>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ROCKETSHOES_CURRENCY".to_string(), e.to_string())
            })?;

        Ok(Self {
            catalog,
            storage_dir,
            currency,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional variable, treating empty values as absent.
fn get_optional_env<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

/// Get a variable with a default value.
fn get_env_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    get_optional_env(lookup, key).unwrap_or_else(|| default.to_string())
}

/// Get a duration expressed in whole seconds.
fn get_secs<F>(lookup: &F, key: &str, default: &str) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    get_env_or_default(lookup, key, default)
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
