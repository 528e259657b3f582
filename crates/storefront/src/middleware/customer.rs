//! Customer authentication extractor and session helpers.
//!
//! Log-in stores the Storefront API customer access token in the session;
//! account pages require it.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use tower_sessions::Session;

use super::session::keys;
use crate::shopify::CustomerAccessToken;

/// Path of the log-in page.
pub const LOGIN_PATH: &str = "/account/login";

/// Extractor that requires a signed-in customer.
///
/// Missing or expired tokens redirect to the log-in page.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireCustomer(token): RequireCustomer) -> impl IntoResponse {
///     state.storefront().get_customer(&token.access_token).await
/// }
/// ```
pub struct RequireCustomer(pub CustomerAccessToken);

/// Rejection returned when no customer is signed in.
pub enum CustomerRejection {
    /// Redirect to the log-in page.
    RedirectToLogin,
    /// No session layer is installed.
    MissingSession,
}

impl IntoResponse for CustomerRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::MissingSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireCustomer
where
    S: Send + Sync,
{
    type Rejection = CustomerRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(CustomerRejection::MissingSession)?;

        let token = customer_token(session)
            .await
            .ok_or(CustomerRejection::RedirectToLogin)?;

        if is_expired(&token, Utc::now()) {
            tracing::debug!(expires_at = %token.expires_at, "Customer access token expired");
            return Err(CustomerRejection::RedirectToLogin);
        }

        Ok(Self(token))
    }
}

/// Whether `token` expired before `now`.
///
/// Unparseable expiry timestamps are treated as still valid; Shopify rejects
/// the token itself if it is not.
fn is_expired(token: &CustomerAccessToken, now: DateTime<Utc>) -> bool {
    DateTime::parse_from_rfc3339(&token.expires_at).is_ok_and(|expires_at| expires_at <= now)
}

/// Get the customer access token from the session.
pub async fn customer_token(session: &Session) -> Option<CustomerAccessToken> {
    session
        .get::<CustomerAccessToken>(keys::CUSTOMER_ACCESS_TOKEN)
        .await
        .ok()
        .flatten()
}

/// Helper to set the customer access token in the session.
///
/// Cycles the session ID first so a pre-login session cannot be fixated.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_customer_token(
    session: &Session,
    token: &CustomerAccessToken,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::CUSTOMER_ACCESS_TOKEN, token).await
}

/// Helper to clear the customer access token from the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_customer_token(
    session: &Session,
) -> Result<Option<CustomerAccessToken>, tower_sessions::session::Error> {
    session
        .remove::<CustomerAccessToken>(keys::CUSTOMER_ACCESS_TOKEN)
        .await
}
