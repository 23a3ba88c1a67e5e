//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults suit local development against a
//! Catalog API on port 8000.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: <http://localhost:3000>)
//! - `CATALOG_API_BASE` - Catalog API base URL (default: <http://localhost:8000>)
//! - `CATALOG_API_TOKEN` - Catalog API token, sent as `Authorization: Token ...`
//! - `CATALOG_CACHE_TTL_SECS` - Catalog response cache TTL (default: 300)
//! - `CATALOG_TIMEOUT_SECS` - Catalog request timeout (default: 10)
//! - `CATALOG_FALLBACK` - Serve built-in products when the catalog is down (default: true)
//! - `CART_STORAGE_KEY` - Session key holding the serialized cart (default: `byteMtaani_cart`)
//! - `LOG_FORMAT` - `text` or `json` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default session key for the serialized cart.
pub const DEFAULT_CART_STORAGE_KEY: &str = "byteMtaani_cart";

/// Default cap on live sessions held in memory.
pub const DEFAULT_MAX_SESSIONS: u64 = 100_000;

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
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Catalog API configuration
    pub catalog: CatalogConfig,
    /// Cart persistence configuration
    pub cart: CartConfig,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions sent to Sentry
    pub sentry_traces_sample_rate: f32,
}

/// Catalog API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct CatalogConfig {
    /// Base URL of the Catalog API (e.g., <http://localhost:8000>)
    pub base_url: Url,
    /// Optional API token
    pub api_token: Option<SecretString>,
    /// How long catalog responses stay cached
    pub cache_ttl: Duration,
    /// Per-request timeout
    pub timeout: Duration,
    /// Serve built-in products when the catalog is unreachable
    pub fallback: bool,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("cache_ttl", &self.cache_ttl)
            .field("timeout", &self.timeout)
            .field("fallback", &self.fallback)
            .finish()
    }
}

/// Cart persistence configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Session key under which the serialized cart is stored
    pub storage_key: String,
    /// Most sessions (and so carts) kept before the oldest are evicted
    pub max_sessions: u64,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_CART_STORAGE_KEY.to_string(),
            max_sessions: DEFAULT_MAX_SESSIONS,
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
    /// Returns `ConfigError` if a variable is malformed or if the catalog
    /// token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env("STOREFRONT_PORT", "3000")?;
        let base_url = get_url("STOREFRONT_BASE_URL", "http://localhost:3000")?.to_string();
        let catalog = CatalogConfig::from_env()?;
        let cart = CartConfig {
            storage_key: get_env_or_default("CART_STORAGE_KEY", DEFAULT_CART_STORAGE_KEY),
            max_sessions: parse_env("SESSION_MAX_CAPACITY", "100000")?,
        };
        let log_format = match get_env_or_default("LOG_FORMAT", "text").as_str() {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "LOG_FORMAT".to_string(),
                    format!("expected 'text' or 'json', got '{other}'"),
                ));
            }
        };

        Ok(Self {
            host,
            port,
            base_url,
            catalog,
            cart,
            log_format,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Configuration for local development and tests: defaults everywhere,
    /// pointing at the given catalog.
    #[must_use]
    pub fn local(catalog_base_url: Url) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            catalog: CatalogConfig {
                base_url: catalog_base_url,
                api_token: None,
                cache_ttl: Duration::from_secs(300),
                timeout: Duration::from_secs(10),
                fallback: true,
            },
            cart: CartConfig::default(),
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl CatalogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_token = get_optional_env("CATALOG_API_TOKEN")
            .map(|token| {
                validate_secret_strength(&token, "CATALOG_API_TOKEN")?;
                Ok::<_, ConfigError>(SecretString::from(token))
            })
            .transpose()?;

        Ok(Self {
            base_url: get_url("CATALOG_API_BASE", "http://localhost:8000")?,
            api_token,
            cache_ttl: Duration::from_secs(parse_env("CATALOG_CACHE_TTL_SECS", "300")?),
            timeout: Duration::from_secs(parse_env("CATALOG_TIMEOUT_SECS", "10")?),
            fallback: parse_env("CATALOG_FALLBACK", "true")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable (or its default) with `FromStr`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse an environment variable as an absolute http(s) URL.
fn get_url(key: &str, default: &str) -> Result<Url, ConfigError> {
    let url: Url = parse_env(key, default)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{other}'"),
        )),
    }
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

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Real API tokens have high entropy
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated token."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-token-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_local_config() {
        let config = StorefrontConfig::local(Url::parse("http://127.0.0.1:8000").unwrap());

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.cart.storage_key, "byteMtaani_cart");
        assert_eq!(config.cart.max_sessions, DEFAULT_MAX_SESSIONS);
        assert_eq!(config.base_url, "http://localhost:3000");
        assert!(!config.is_secure());
        assert!(config.catalog.fallback);
    }

    #[test]
    fn test_catalog_config_debug_redacts_token() {
        let mut config = StorefrontConfig::local(Url::parse("http://127.0.0.1:8000").unwrap());
        config.catalog.api_token = Some(SecretString::from("super_secret_catalog_token"));

        let debug_output = format!("{:?}", config.catalog);

        assert!(debug_output.contains("127.0.0.1:8000"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_catalog_token"));
    }
}
