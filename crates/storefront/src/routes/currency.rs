//! Presentment currency selection.

use acme_store_core::CurrencyCode;
use axum::{Form, response::Redirect};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::session::set_currency;

/// Currency form data.
#[derive(Debug, Deserialize)]
pub struct CurrencyForm {
    pub currency: String,
    /// Page to return to.
    pub redirect_to: Option<String>,
}

/// Store the shopper's currency and return to the page they were on.
///
/// Prices are requested in the new currency from the next page on. Carts
/// keep the currency they were created with.
///
/// # Errors
///
/// Returns 400 for unsupported currencies, or an error if the session cannot
/// be updated.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<CurrencyForm>) -> Result<Redirect> {
    let currency: CurrencyCode = form
        .currency
        .parse()
        .map_err(|e: acme_store_core::PriceError| AppError::BadRequest(e.to_string()))?;

    set_currency(&session, currency).await?;
    tracing::debug!(%currency, "Currency changed");

    Ok(Redirect::to(&safe_redirect(form.redirect_to.as_deref())))
}

/// Local path to redirect to; anything else falls back to `/`.
fn safe_redirect(target: Option<&str>) -> String {
    match target {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}
