//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `ROCKETSHOES_API_URL` - Catalog/stock API base URL (default: <http://localhost:3333>)
//! - `ROCKETSHOES_API_TOKEN` - Bearer token sent to the catalog API
//! - `ROCKETSHOES_STORAGE_PATH` - Durable cart storage file (default: .rocketshoes/storage.json)
//! - `ROCKETSHOES_REQUEST_TIMEOUT_SECS` - HTTP request timeout (default: 10)
//! - `ROCKETSHOES_PRODUCT_CACHE_TTL_SECS` - Product cache lifetime (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:3333";
const DEFAULT_STORAGE_PATH: &str = ".rocketshoes/storage.json";
const DEFAULT_REQUEST_TIMEOUT_SECS: &str = "10";
const DEFAULT_PRODUCT_CACHE_TTL_SECS: &str = "300";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart application configuration.
#[derive(Clone)]
pub struct CartConfig {
    /// Catalog/stock API base URL
    pub api_url: Url,
    /// Optional bearer token for the catalog API
    pub api_token: Option<SecretString>,
    /// File backing the durable key-value storage
    pub storage_path: PathBuf,
    /// Timeout applied to every catalog request
    pub request_timeout: Duration,
    /// How long fetched products stay cached
    pub product_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for CartConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("storage_path", &self.storage_path)
            .field("request_timeout", &self.request_timeout)
            .field("product_cache_ttl", &self.product_cache_ttl)
            .field("sentry_dsn", &self.sentry_dsn)
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup_or_default(&lookup, "ROCKETSHOES_API_URL", DEFAULT_API_URL);
        let api_url = Url::parse(&api_url).map_err(|e| {
            ConfigError::InvalidEnvVar("ROCKETSHOES_API_URL".to_string(), e.to_string())
        })?;
        if api_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "ROCKETSHOES_API_URL".to_string(),
                "must be an absolute http(s) URL".to_string(),
            ));
        }

        let api_token = lookup("ROCKETSHOES_API_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .map(SecretString::from);

        let storage_path = PathBuf::from(lookup_or_default(
            &lookup,
            "ROCKETSHOES_STORAGE_PATH",
            DEFAULT_STORAGE_PATH,
        ));

        let request_timeout = parse_secs(
            &lookup,
            "ROCKETSHOES_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        let product_cache_ttl = parse_secs(
            &lookup,
            "ROCKETSHOES_PRODUCT_CACHE_TTL_SECS",
            DEFAULT_PRODUCT_CACHE_TTL_SECS,
        )?;

        Ok(Self {
            api_url,
            api_token,
            storage_path,
            request_timeout,
            product_cache_ttl,
            sentry_dsn: lookup("SENTRY_DSN"),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn lookup_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| default.to_string())
}

/// Parse a whole number of seconds.
fn parse_secs<F>(lookup: &F, key: &str, default: &str) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup_or_default(lookup, key, default)
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
