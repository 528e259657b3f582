//! Data shared by every HTML page: SEO meta, menus and shopper chrome.

use acme_store_core::CurrencyCode;

use crate::middleware::Shopper;
use crate::shopify::{MenuItem, Seo};
use crate::state::AppState;

/// Shopify menu rendered in the header.
pub const HEADER_MENU: &str = "next-js-frontend-header-menu";

/// Shopify menu rendered in the footer.
pub const FOOTER_MENU: &str = "next-js-frontend-footer-menu";

/// Interval of the cart badge poll, in seconds.
pub const CART_POLL_SECONDS: u32 = 10;

/// Title, description and path of one page.
#[derive(Debug, Clone, Default)]
pub struct PageMeta {
    /// Page title without the site suffix; `None` on the home page.
    pub title: Option<String>,
    /// Meta description.
    pub description: Option<String>,
    /// Path used for the canonical URL.
    pub path: String,
}

impl PageMeta {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description, ignoring blank values.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        if !description.trim().is_empty() {
            self.description = Some(description);
        }
        self
    }

    /// Title and description from Shopify SEO fields, with fallbacks.
    #[must_use]
    pub fn seo(self, seo: &Seo, title: &str, description: &str) -> Self {
        self.title(seo.title.clone().unwrap_or_else(|| title.to_string()))
            .description(
                seo.description
                    .clone()
                    .unwrap_or_else(|| description.to_string()),
            )
    }
}

/// Layout context embedded in every page template as `page`.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub site_name: String,
    pub company_name: String,
    /// Full document title, `{page} | {site}`.
    pub title: String,
    pub description: String,
    pub canonical_url: String,
    pub nonce: String,
    pub header_menu: Vec<MenuItem>,
    pub footer_menu: Vec<MenuItem>,
    pub currency: CurrencyCode,
    pub currencies: [CurrencyCode; 6],
    pub signed_in: bool,
    pub path: String,
    pub cart_poll_seconds: u32,
}

impl PageContext {
    /// Load the menus and assemble the layout for `meta`.
    pub async fn load(state: &AppState, shopper: &Shopper, nonce: String, meta: PageMeta) -> Self {
        let storefront = state.storefront();
        let (header_menu, footer_menu) = tokio::join!(
            storefront.get_menu(HEADER_MENU),
            storefront.get_menu(FOOTER_MENU)
        );

        let config = state.config();
        let title = document_title(meta.title.as_deref(), &config.site_name);
        let description = meta
            .description
            .unwrap_or_else(|| format!("{} online store.", config.site_name));

        Self {
            site_name: config.site_name.clone(),
            company_name: config.company_name.clone(),
            title,
            description,
            canonical_url: format!("{}{}", config.base_url, meta.path),
            nonce,
            header_menu,
            footer_menu,
            currency: shopper.currency(),
            currencies: CurrencyCode::ALL,
            signed_in: shopper.signed_in,
            path: meta.path,
            cart_poll_seconds: CART_POLL_SECONDS,
        }
    }
}

/// `{page} | {site}`, or the bare site name when there is no page title.
#[must_use]
pub fn document_title(page_title: Option<&str>, site_name: &str) -> String {
    match page_title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => format!("{title} | {site_name}"),
        None => site_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_title() {
        assert_eq!(document_title(Some("Cart"), "Acme Store"), "Cart | Acme Store");
        assert_eq!(document_title(None, "Acme Store"), "Acme Store");
        assert_eq!(document_title(Some("  "), "Acme Store"), "Acme Store");
    }

    #[test]
    fn test_meta_prefers_seo_fields() {
        let seo = Seo {
            title: Some("Acme Tee, organic cotton".to_string()),
            description: None,
        };
        let meta = PageMeta::new("/product/acme-tee").seo(&seo, "Acme Tee", "A soft tee.");
        assert_eq!(meta.title.as_deref(), Some("Acme Tee, organic cotton"));
        assert_eq!(meta.description.as_deref(), Some("A soft tee."));

        let meta = PageMeta::new("/").description("   ");
        assert_eq!(meta.description, None);
    }
}
