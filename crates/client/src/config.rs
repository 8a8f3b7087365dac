//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `HABERDASH_API_URL` - Base URL of the backend API (e.g. `https://shop.example.com/api`)
//!
//! ## Optional
//! - `HABERDASH_TOKEN_FILE` - Path for the persisted auth token (default: `.haberdash_token`)
//! - `HABERDASH_TIMEOUT_SECS` - Per-request timeout in seconds (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_TOKEN_FILE: &str = ".haberdash_token";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client application configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend API, without a trailing slash.
    pub api_url: String,
    /// Path for the persisted auth token (the single durable side channel).
    pub token_path: PathBuf,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Sentry DSN for error tracking.
    pub sentry_dsn: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = validate_api_url("HABERDASH_API_URL", &get_required_env("HABERDASH_API_URL")?)?;
        let token_path =
            PathBuf::from(get_env_or_default("HABERDASH_TOKEN_FILE", DEFAULT_TOKEN_FILE));
        let request_timeout = parse_timeout(&get_env_or_default(
            "HABERDASH_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        ))?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            api_url,
            token_path,
            request_timeout,
            sentry_dsn,
        })
    }

    /// Build a config directly, for tests and embedding.
    #[must_use]
    pub fn new(api_url: impl Into<String>, token_path: impl Into<PathBuf>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_owned(),
            token_path: token_path.into(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            sentry_dsn: None,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse the request timeout. Zero is rejected: a zero timeout fails every
/// request, which is never what the operator meant.
fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    let secs = value.parse::<u64>().map_err(|e| {
        ConfigError::InvalidEnvVar("HABERDASH_TIMEOUT_SECS".to_owned(), e.to_string())
    })?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            "HABERDASH_TIMEOUT_SECS".to_owned(),
            "timeout must be positive".to_owned(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Validate and normalize the API base URL.
///
/// Must parse as an absolute http(s) URL; the stored form has no trailing
/// slash so paths can be appended verbatim.
fn validate_api_url(var_name: &str, value: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_owned(), e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_owned(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(value.trim_end_matches('/').to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_api_url_strips_trailing_slash() {
        let url = validate_api_url("TEST_VAR", "https://shop.example.com/api/").unwrap();
        assert_eq!(url, "https://shop.example.com/api");
    }

    #[test]
    fn test_validate_api_url_rejects_garbage() {
        let result = validate_api_url("TEST_VAR", "not a url");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_validate_api_url_rejects_non_http_scheme() {
        let result = validate_api_url("TEST_VAR", "ftp://shop.example.com");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("45").unwrap(), Duration::from_secs(45));
        assert!(matches!(parse_timeout("abc"), Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_parse_timeout_rejects_zero() {
        assert!(matches!(parse_timeout("0"), Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_config_new_normalizes() {
        let config = ClientConfig::new("http://localhost:8000/api/", "/tmp/token");
        assert_eq!(config.api_url, "http://localhost:8000/api");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
