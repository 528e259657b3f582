//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (canonical links, sitemap)
//! - `SHOPIFY_STORE_DOMAIN` - Shopify store domain (e.g., acme.myshopify.com)
//! - `SHOPIFY_STOREFRONT_ACCESS_TOKEN` - Storefront API access token
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_TRUSTED_PROXY` - Set to `true` when a reverse proxy sets the
//!   client IP headers used for rate limiting (default: false)
//! - `SHOPIFY_API_VERSION` - API version (default: 2024-04)
//! - `SHOPIFY_REVALIDATION_SECRET` - Shared secret for the revalidation webhook
//! - `SHOPIFY_REQUEST_TIMEOUT_SECS` - Upstream request timeout (default: 30)
//! - `SHOPIFY_CACHE_TTL_SECS` - Product/collection cache TTL (default: 300)
//! - `SHOPIFY_BLOG_HANDLE` - Blog shown under /blog (default: news)
//! - `SITE_NAME` - Store name used in titles (default: Acme Store)
//! - `COMPANY_NAME` - Legal name shown in the footer (default: `SITE_NAME`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Default Storefront API version.
pub const DEFAULT_API_VERSION: &str = "2024-04";

/// Default upstream request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

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
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Whether client IP headers come from a trusted reverse proxy
    pub trusted_proxy: bool,
    /// Public base URL for the storefront, without trailing slash
    pub base_url: String,
    /// Store name used in page titles
    pub site_name: String,
    /// Legal name shown in the footer
    pub company_name: String,
    /// Shopify Storefront API configuration
    pub shopify: ShopifyStorefrontConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Shopify Storefront API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ShopifyStorefrontConfig {
    /// Store domain including scheme (e.g., <https://acme.myshopify.com>)
    pub store_domain: String,
    /// Shopify API version (e.g., 2024-04)
    pub api_version: String,
    /// Storefront API access token
    pub storefront_access_token: SecretString,
    /// Shared secret expected on the revalidation webhook
    pub revalidation_secret: Option<SecretString>,
    /// Timeout applied to every upstream request
    pub request_timeout: Duration,
    /// Time-to-live for cached products and collections
    pub cache_ttl: Duration,
    /// Handle of the blog listed under /blog
    pub blog_handle: String,
}

impl std::fmt::Debug for ShopifyStorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyStorefrontConfig")
            .field("store_domain", &self.store_domain)
            .field("api_version", &self.api_version)
            .field("storefront_access_token", &"[REDACTED]")
            .field(
                "revalidation_secret",
                &self.revalidation_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("request_timeout", &self.request_timeout)
            .field("cache_ttl", &self.cache_ttl)
            .field("blog_handle", &self.blog_handle)
            .finish()
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

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = parse_env_or_default("STOREFRONT_PORT", 3000_u16)?;
        let trusted_proxy = parse_env_or_default("STOREFRONT_TRUSTED_PROXY", false)?;
        let base_url = normalize_base_url(&get_required_env("STOREFRONT_BASE_URL")?)?;
        let site_name = get_env_or_default("SITE_NAME", "Acme Store");
        let company_name =
            get_optional_env("COMPANY_NAME").unwrap_or_else(|| site_name.clone());

        let shopify = ShopifyStorefrontConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            host,
            port,
            trusted_proxy,
            base_url,
            site_name,
            company_name,
            shopify,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl ShopifyStorefrontConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let revalidation_secret = match get_optional_env("SHOPIFY_REVALIDATION_SECRET") {
            Some(_) => Some(get_validated_secret("SHOPIFY_REVALIDATION_SECRET")?),
            None => None,
        };

        Ok(Self {
            store_domain: ensure_starts_with_scheme(&get_required_env("SHOPIFY_STORE_DOMAIN")?),
            api_version: get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
            storefront_access_token: get_required_secret("SHOPIFY_STOREFRONT_ACCESS_TOKEN")?,
            revalidation_secret,
            request_timeout: Duration::from_secs(parse_env_or_default(
                "SHOPIFY_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            cache_ttl: Duration::from_secs(parse_env_or_default("SHOPIFY_CACHE_TTL_SECS", 300)?),
            blog_handle: get_env_or_default("SHOPIFY_BLOG_HANDLE", "news"),
        })
    }

    /// The Storefront API GraphQL endpoint.
    #[must_use]
    pub fn graphql_endpoint(&self) -> String {
        format!(
            "{}/api/{}/graphql.json",
            self.store_domain.trim_end_matches('/'),
            self.api_version
        )
    }

    /// Check a webhook-supplied secret against the configured one.
    ///
    /// Always `false` when no secret is configured.
    #[must_use]
    pub fn revalidation_secret_matches(&self, candidate: &str) -> bool {
        self.revalidation_secret
            .as_ref()
            .is_some_and(|secret| constant_time_eq(secret.expose_secret(), candidate))
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

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to a default when unset.
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Prefix `https://` unless the value already names a scheme.
pub(crate) fn ensure_starts_with_scheme(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    if domain.starts_with("https://") || domain.starts_with("http://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    }
}

/// Validate the public base URL and strip any trailing slash.
fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
    })?;
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            "STOREFRONT_BASE_URL".to_string(),
            "must have a host".to_string(),
        ));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Compare two strings without short-circuiting on the first difference.
fn constant_time_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .bytes()
            .zip(b.bytes())
            .fold(0_u8, |acc, (x, y)| acc | (x ^ y))
            == 0
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
    let len = s.chars().count() as f64;
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

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

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
