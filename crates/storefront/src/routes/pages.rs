//! CMS page handler for `/{page}`.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CspNonce, Shopper};
use crate::routes::layout::{PageContext, PageMeta};
use crate::shopify::Page;
use crate::state::AppState;

/// Content page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/show.html")]
pub struct ContentPageTemplate {
    pub page: PageContext,
    pub content: Page,
}

/// Display a Shopify page by handle.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip(state, shopper, nonce))]
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    shopper: Shopper,
    CspNonce(nonce): CspNonce,
) -> Result<ContentPageTemplate> {
    let content = state
        .storefront()
        .get_page(&handle)
        .await
        .ok_or_else(|| AppError::NotFound(format!("page {handle}")))?;

    let meta = PageMeta::new(format!("/{}", content.handle)).seo(
        &content.seo,
        &content.title,
        &content.body_summary,
    );

    Ok(ContentPageTemplate {
        page: PageContext::load(&state, &shopper, nonce, meta).await,
        content,
    })
}
