//! Session middleware configuration and the shopper extractor.
//!
//! Sessions live in memory: they only hold a cart ID, a customer access token
//! and a currency preference, all of which Shopify can recreate.

use acme_store_core::{CartGid, CurrencyCode};
use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::config::StorefrontConfig;
use crate::shopify::Market;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "acme_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Session keys.
pub mod keys {
    /// Shopify cart ID.
    pub const CART_ID: &str = "cart_id";

    /// Shopify customer access token.
    pub const CUSTOMER_ACCESS_TOKEN: &str = "customer_access_token";

    /// Presentment currency chosen by the shopper.
    pub const CURRENCY: &str = "currency";
}

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart ID from the session. Anything that is not a cart GID is ignored.
pub async fn cart_id(session: &Session) -> Option<String> {
    session
        .get::<String>(keys::CART_ID)
        .await
        .ok()
        .flatten()
        .filter(|id| CartGid::parse(id).is_ok())
}

/// Set the cart ID in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_cart_id(
    session: &Session,
    cart_id: &str,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CART_ID, cart_id).await
}

/// Forget the cart, e.g. after Shopify stopped recognising it.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_cart_id(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<String>(keys::CART_ID).await?;
    Ok(())
}

/// The shopper's chosen currency, if any.
pub async fn currency(session: &Session) -> Option<CurrencyCode> {
    session
        .get::<CurrencyCode>(keys::CURRENCY)
        .await
        .ok()
        .flatten()
}

/// Remember the shopper's currency.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_currency(
    session: &Session,
    currency: CurrencyCode,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CURRENCY, currency).await
}

// =============================================================================
// Shopper Extractor
// =============================================================================

/// Per-request view of the shopper's session.
///
/// Never rejects: without a session layer every field is empty.
#[derive(Debug, Clone, Default)]
pub struct Shopper {
    /// Market derived from the chosen currency.
    pub market: Market,
    /// Cart ID, once a cart was created.
    pub cart_id: Option<String>,
    /// Whether a customer access token is stored.
    pub signed_in: bool,
}

impl Shopper {
    /// Currency used for display, falling back to the store default.
    #[must_use]
    pub fn currency(&self) -> CurrencyCode {
        self.market.currency().unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Shopper
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>() else {
            return Ok(Self::default());
        };

        let signed_in = session
            .get::<crate::shopify::CustomerAccessToken>(keys::CUSTOMER_ACCESS_TOKEN)
            .await
            .ok()
            .flatten()
            .is_some();

        Ok(Self {
            market: Market::from(currency(session).await),
            cart_id: cart_id(session).await,
            signed_in,
        })
    }
}
