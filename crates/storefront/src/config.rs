//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CUE_SHOP_API_URL` - Base URL of the shop REST API (default: `http://localhost:8080/api`)
//! - `CUE_SHOP_DATA_DIR` - Directory holding the persisted token, cart and wishlist (default: `.cue-shop`)
//! - `CUE_SHOP_REQUEST_TIMEOUT_SECS` - Per-request timeout; unset means requests never time out
//! - `CUE_SHOP_CATALOG_CACHE_TTL_SECS` - Product list cache lifetime (default: 300, `0` disables)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_DATA_DIR: &str = ".cue-shop";
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL every API path is resolved against
    pub api_base_url: Url,
    /// Directory for durable local storage
    pub data_dir: PathBuf,
    /// Optional per-request timeout
    pub request_timeout: Option<Duration>,
    /// Lifetime of cached product lists; `None` disables the cache
    pub catalog_cache_ttl: Option<Duration>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
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

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("CUE_SHOP_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_base_url = parse_api_url(&raw_url)?;

        let data_dir = lookup("CUE_SHOP_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);

        let request_timeout = lookup("CUE_SHOP_REQUEST_TIMEOUT_SECS")
            .map(|raw| parse_secs("CUE_SHOP_REQUEST_TIMEOUT_SECS", &raw))
            .transpose()?
            .filter(|d| !d.is_zero());

        let catalog_cache_ttl = match lookup("CUE_SHOP_CATALOG_CACHE_TTL_SECS") {
            Some(raw) => Some(parse_secs("CUE_SHOP_CATALOG_CACHE_TTL_SECS", &raw)?),
            None => Some(Duration::from_secs(DEFAULT_CATALOG_CACHE_TTL_SECS)),
        }
        .filter(|d| !d.is_zero());

        Ok(Self {
            api_base_url,
            data_dir,
            request_timeout,
            catalog_cache_ttl,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration pointing at `api_base_url` with everything else defaulted.
    #[must_use]
    pub fn for_api(api_base_url: Url, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            api_base_url,
            data_dir: data_dir.into(),
            request_timeout: None,
            catalog_cache_ttl: Some(Duration::from_secs(DEFAULT_CATALOG_CACHE_TTL_SECS)),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the API base URL; only absolute http(s) URLs are accepted.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar("CUE_SHOP_API_URL".to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "CUE_SHOP_API_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(url)
}

/// Parse a whole number of seconds.
fn parse_secs(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://localhost:8080/api");
        assert_eq!(config.data_dir, PathBuf::from(".cue-shop"));
        assert!(config.request_timeout.is_none());
        assert_eq!(config.catalog_cache_ttl, Some(Duration::from_secs(300)));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_custom_values() {
        let config = config_from(&[
            ("CUE_SHOP_API_URL", "https://api.cueshop.vn/api"),
            ("CUE_SHOP_DATA_DIR", "/tmp/cue"),
            ("CUE_SHOP_REQUEST_TIMEOUT_SECS", "15"),
            ("CUE_SHOP_CATALOG_CACHE_TTL_SECS", "0"),
        ])
        .unwrap();
        assert_eq!(config.api_base_url.host_str(), Some("api.cueshop.vn"));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/cue"));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));
        assert!(config.catalog_cache_ttl.is_none());
    }

    #[test]
    fn test_rejects_non_http_url() {
        let err = config_from(&[("CUE_SHOP_API_URL", "ftp://files.example/api")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "CUE_SHOP_API_URL"));
    }

    #[test]
    fn test_rejects_relative_url() {
        assert!(config_from(&[("CUE_SHOP_API_URL", "/api")]).is_err());
    }

    #[test]
    fn test_rejects_bad_timeout() {
        let err = config_from(&[("CUE_SHOP_REQUEST_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_empty_sentry_dsn_is_ignored() {
        let config = config_from(&[("SENTRY_DSN", "")]).unwrap();
        assert!(config.sentry_dsn.is_none());
    }
}
