//! `sitemap.xml` and `robots.txt`.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::shopify::{Market, ProductSortKey};
use crate::state::AppState;

/// One `<url>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SitemapEntry {
    path: String,
    last_modified: String,
}

/// Serve the sitemap: home, collections, products and pages.
#[instrument(skip_all)]
pub async fn sitemap(State(state): State<AppState>) -> Response {
    let storefront = state.storefront();
    let (collections, products, pages) = tokio::join!(
        storefront.get_collections(),
        storefront.get_products(Market::default(), None, ProductSortKey::Relevance, false),
        storefront.get_pages(),
    );

    let now = chrono::Utc::now().to_rfc3339();
    let home = std::iter::once(SitemapEntry {
        path: String::new(),
        last_modified: now.clone(),
    });
    let collections = collections.into_iter().map(|collection| SitemapEntry {
        path: collection.path,
        last_modified: non_empty_or(collection.updated_at, &now),
    });
    let products = products.into_iter().map(|product| SitemapEntry {
        path: format!("/product/{}", product.handle),
        last_modified: non_empty_or(product.updated_at, &now),
    });
    let pages = pages.into_iter().map(|page| SitemapEntry {
        path: format!("/{}", page.handle),
        last_modified: non_empty_or(page.updated_at, &now),
    });

    let entries: Vec<_> = home.chain(collections).chain(products).chain(pages).collect();
    let body = render_sitemap(&state.config().base_url, &entries);

    (
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        body,
    )
        .into_response()
}

/// Serve `robots.txt` pointing at the sitemap.
pub async fn robots(State(state): State<AppState>) -> Response {
    let base_url = &state.config().base_url;
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("User-agent: *\nAllow: /\n\nSitemap: {base_url}/sitemap.xml\nHost: {base_url}\n"),
    )
        .into_response()
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

fn render_sitemap(base_url: &str, entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        xml.push_str("  <url>\n    <loc>");
        xml.push_str(&escape_xml(&format!("{base_url}{}", entry.path)));
        xml.push_str("</loc>\n    <lastmod>");
        xml.push_str(&escape_xml(&entry.last_modified));
        xml.push_str("</lastmod>\n  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
