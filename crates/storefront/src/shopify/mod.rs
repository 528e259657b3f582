//! Shopify Storefront API gateway.
//!
//! # Architecture
//!
//! - Every request is a `POST` of a GraphQL document to the store's
//!   `/api/{version}/graphql.json` endpoint
//! - Shopify is the source of truth: no local sync, direct API calls
//! - Products, collections and menus are cached in-process via `moka` and
//!   dropped when Shopify calls the revalidation webhook
//! - Read failures never surface to the shopper: they are logged at `warn`
//!   and the caller receives an empty shape (`None`, `[]`, default cart)
//!
//! # Example
//!
//! ```rust,ignore
//! use acme_store_storefront::shopify::{Market, StorefrontClient};
//!
//! let client = StorefrontClient::new(&config.shopify)?;
//!
//! let product = client.get_product(Market::default(), "acme-mug").await;
//! let cart = client.get_cart(&cart_id).await;
//! ```

mod storefront;
pub mod types;

pub use storefront::{CacheTag, Market, StorefrontClient};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the Storefront API.
///
/// These never reach a rendered page; the client downgrades them to a log
/// line and an empty result.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl ShopifyError {
    /// Build a single-message GraphQL error.
    pub(crate) fn message(message: impl Into<String>) -> Self {
        Self::GraphQL(vec![GraphQLError {
            message: message.into(),
            locations: vec![],
            path: vec![],
        }])
    }
}

/// A GraphQL error returned by the Shopify API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}
