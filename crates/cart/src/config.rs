//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `CART_API_URL` - Base URL of the catalog API (default: `http://localhost:3333`)
//! - `CART_NAMESPACE` - Storage key prefix (default: `@RocketShoes`)
//! - `CART_DATA_DIR` - Directory for the file storage backend (default: `.storecart`)
//! - `CART_REQUEST_TIMEOUT_SECS` - Catalog request timeout in seconds (default: 10)
//! - `LOG_FORMAT` - `pretty` or `json` (default: `pretty`)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:3333";
const DEFAULT_NAMESPACE: &str = "@RocketShoes";
const DEFAULT_DATA_DIR: &str = ".storecart";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Catalog API configuration
    pub catalog: CatalogConfig,
    /// Prefix of the storage key (`<namespace>:cart`)
    pub namespace: String,
    /// Directory holding persisted snapshots
    pub data_dir: PathBuf,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Catalog API configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL serving `/products/{id}` and `/stock/{id}`
    pub api_url: Url,
    /// Per-request timeout
    pub request_timeout: Duration,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'pretty' or 'json', got '{other}'")),
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
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);

        let api_url = env
            .or_default("CART_API_URL", DEFAULT_API_URL)
            .parse::<Url>()
            .map_err(|e| ConfigError::InvalidEnvVar("CART_API_URL".to_string(), e.to_string()))?;
        let request_timeout = env
            .optional("CART_REQUEST_TIMEOUT_SECS")
            .map(|raw| parse_timeout("CART_REQUEST_TIMEOUT_SECS", &raw))
            .transpose()?
            .unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
        let log_format = env
            .optional("LOG_FORMAT")
            .map(|raw| {
                raw.parse::<LogFormat>()
                    .map_err(|e| ConfigError::InvalidEnvVar("LOG_FORMAT".to_string(), e))
            })
            .transpose()?
            .unwrap_or_default();

        let namespace = env.or_default("CART_NAMESPACE", DEFAULT_NAMESPACE);
        if namespace.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CART_NAMESPACE".to_string(),
                "must not be empty".to_string(),
            ));
        }

        Ok(Self {
            catalog: CatalogConfig {
                api_url,
                request_timeout,
            },
            namespace,
            data_dir: PathBuf::from(env.or_default("CART_DATA_DIR", DEFAULT_DATA_DIR)),
            log_format,
            sentry_dsn: env.optional("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

fn parse_timeout(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<CartConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CartConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.catalog.api_url.as_str(), "http://localhost:3333/");
        assert_eq!(config.catalog.request_timeout, Duration::from_secs(10));
        assert_eq!(config.namespace, "@RocketShoes");
        assert_eq!(config.data_dir, PathBuf::from(".storecart"));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("CART_API_URL", "https://api.example.com/v1/"),
            ("CART_NAMESPACE", "@Shop"),
            ("CART_DATA_DIR", "/tmp/carts"),
            ("CART_REQUEST_TIMEOUT_SECS", "3"),
            ("LOG_FORMAT", "JSON"),
            ("SENTRY_DSN", "https://key@sentry.example.com/1"),
        ])
        .unwrap();
        assert_eq!(config.catalog.api_url.as_str(), "https://api.example.com/v1/");
        assert_eq!(config.catalog.request_timeout, Duration::from_secs(3));
        assert_eq!(config.namespace, "@Shop");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/carts"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.sentry_dsn.is_some());
    }

    #[test]
    fn test_invalid_url() {
        let err = load(&[("CART_API_URL", "not a url")]).unwrap_err();
        assert!(err.to_string().contains("CART_API_URL"));
    }

    #[test]
    fn test_invalid_timeout() {
        assert!(load(&[("CART_REQUEST_TIMEOUT_SECS", "soon")]).is_err());
        assert!(load(&[("CART_REQUEST_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn test_invalid_log_format() {
        let err = load(&[("LOG_FORMAT", "xml")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "LOG_FORMAT"));
    }

    #[test]
    fn test_empty_namespace_rejected() {
        assert!(load(&[("CART_NAMESPACE", "  ")]).is_err());
    }

    #[test]
    fn test_empty_sentry_dsn_is_none() {
        let config = load(&[("SENTRY_DSN", "")]).unwrap();
        assert!(config.sentry_dsn.is_none());
    }
}
