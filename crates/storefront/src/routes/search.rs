//! Search and collection listing handlers.
//!
//! `/search` runs a Shopify product search; `/search/{collection}` lists a
//! collection. Both share the collection sidebar and the sort menu.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::instrument;

use crate::filters;
use crate::middleware::{CspNonce, Shopper};
use crate::routes::layout::{PageContext, PageMeta};
use crate::routes::products::{ProductCard, product_cards};
use crate::shopify::Collection;
use crate::sorting::{SORTING, SortFilterItem, sort_for_slug};
use crate::state::AppState;

/// Shown when a listing has no products.
pub const EMPTY_COLLECTION_MESSAGE: &str = "No products found in this collection.";

/// Search query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub sort: Option<String>,
}

impl SearchQuery {
    /// Trimmed, non-empty search terms.
    fn terms(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

/// Sidebar link to a collection.
#[derive(Debug, Clone)]
pub struct CollectionLink {
    pub title: String,
    pub url: String,
    pub active: bool,
}

/// Sort menu entry.
#[derive(Debug, Clone)]
pub struct SortLink {
    pub title: &'static str,
    pub url: String,
    pub active: bool,
}

/// Search and collection page template.
#[derive(Template, WebTemplate)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub page: PageContext,
    pub heading: Option<String>,
    pub summary: Option<String>,
    pub products: Vec<ProductCard>,
    pub collections: Vec<CollectionLink>,
    pub sorts: Vec<SortLink>,
}

/// Product search.
#[instrument(skip(state, shopper, nonce))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    shopper: Shopper,
    CspNonce(nonce): CspNonce,
) -> SearchTemplate {
    let sort = sort_for_slug(query.sort.as_deref());
    let storefront = state.storefront();
    let (products, collections) = tokio::join!(
        storefront.get_products(shopper.market, query.terms(), sort.sort_key, sort.reverse),
        storefront.get_collections(),
    );

    let meta = PageMeta::new("/search")
        .title("Search")
        .description("Search for products in the store.");
    let page = PageContext::load(&state, &shopper, nonce, meta).await;

    SearchTemplate {
        page,
        heading: None,
        summary: search_summary(query.terms(), products.len()),
        products: product_cards(&products),
        collections: collection_links(&collections, "/search"),
        sorts: sort_links("/search", query.terms(), sort),
    }
}

/// Products of one collection. Unknown collections list nothing.
#[instrument(skip(state, shopper, nonce))]
pub async fn collection(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Query(query): Query<SearchQuery>,
    shopper: Shopper,
    CspNonce(nonce): CspNonce,
) -> SearchTemplate {
    let sort = sort_for_slug(query.sort.as_deref());
    let storefront = state.storefront();
    let (collection, products, collections) = tokio::join!(
        storefront.get_collection(&handle),
        storefront.get_collection_products(shopper.market, &handle, sort.sort_key, sort.reverse),
        storefront.get_collections(),
    );

    let path = format!("/search/{handle}");
    let meta = match &collection {
        Some(collection) => PageMeta::new(path.clone()).seo(
            &collection.seo,
            &collection.title,
            &collection.description,
        ),
        None => PageMeta::new(path.clone()).title(handle.clone()),
    };
    let page = PageContext::load(&state, &shopper, nonce, meta).await;

    SearchTemplate {
        page,
        heading: collection.map(|collection| collection.title),
        summary: products.is_empty().then(|| EMPTY_COLLECTION_MESSAGE.to_string()),
        products: product_cards(&products),
        collections: collection_links(&collections, &path),
        sorts: sort_links(&path, None, sort),
    }
}

/// Result line above the product grid.
#[must_use]
pub fn search_summary(terms: Option<&str>, count: usize) -> Option<String> {
    match terms {
        Some(terms) if count == 0 => {
            Some(format!("There are no products that match \"{terms}\""))
        }
        Some(terms) => {
            let noun = if count == 1 { "result" } else { "results" };
            Some(format!("Showing {count} {noun} for \"{terms}\""))
        }
        None if count == 0 => Some(EMPTY_COLLECTION_MESSAGE.to_string()),
        None => None,
    }
}

fn collection_links(collections: &[Collection], current_path: &str) -> Vec<CollectionLink> {
    collections
        .iter()
        .map(|collection| CollectionLink {
            title: collection.title.clone(),
            url: collection.path.clone(),
            active: collection.path == current_path,
        })
        .collect()
}

/// Sort menu links for `base`, keeping the search terms.
fn sort_links(base: &str, terms: Option<&str>, current: SortFilterItem) -> Vec<SortLink> {
    SORTING
        .iter()
        .map(|item| {
            let mut params = Vec::new();
            if let Some(terms) = terms {
                params.push(format!("q={}", urlencoding::encode(terms)));
            }
            if let Some(slug) = item.slug {
                params.push(format!("sort={slug}"));
            }
            let url = if params.is_empty() {
                base.to_string()
            } else {
                format!("{base}?{}", params.join("&"))
            };
            SortLink {
                title: item.title,
                url,
                active: item.slug == current.slug,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sorting::DEFAULT_SORT;

    #[test]
    fn test_search_summary() {
        assert_eq!(
            search_summary(Some("tee"), 3).as_deref(),
            Some("Showing 3 results for \"tee\"")
        );
        assert_eq!(
            search_summary(Some("tee"), 1).as_deref(),
            Some("Showing 1 result for \"tee\"")
        );
        assert_eq!(
            search_summary(Some("kettle"), 0).as_deref(),
            Some("There are no products that match \"kettle\"")
        );
        assert_eq!(
            search_summary(None, 0).as_deref(),
            Some(EMPTY_COLLECTION_MESSAGE)
        );
        assert_eq!(search_summary(None, 4), None);
    }

    #[test]
    fn test_blank_query_is_no_query() {
        let query = SearchQuery {
            q: Some("   ".to_string()),
            sort: None,
        };
        assert_eq!(query.terms(), None);
    }

    #[test]
    fn test_sort_links_keep_terms() {
        let links = sort_links("/search", Some("blue tee"), sort_for_slug(Some("price-asc")));
        assert_eq!(links[0].url, "/search?q=blue%20tee");
        assert!(!links[0].active);
        assert_eq!(links[3].url, "/search?q=blue%20tee&sort=price-asc");
        assert!(links[3].active);

        let links = sort_links("/search/shirts", None, DEFAULT_SORT);
        assert_eq!(links[0].url, "/search/shirts");
        assert!(links[0].active);
        assert_eq!(links[1].url, "/search/shirts?sort=trending-desc");
    }
}
