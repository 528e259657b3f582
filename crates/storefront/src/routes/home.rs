//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::filters;
use crate::middleware::{CspNonce, Shopper};
use crate::routes::layout::{PageContext, PageMeta};
use crate::routes::products::{ProductCard, product_cards};
use crate::shopify::ProductSortKey;
use crate::state::AppState;

/// Collection feeding the three-item grid.
pub const FEATURED_COLLECTION: &str = "hidden-homepage-featured-items";

/// Collection feeding the carousel.
pub const CAROUSEL_COLLECTION: &str = "hidden-homepage-carousel";

/// Items shown in the featured grid.
const FEATURED_ITEMS: usize = 3;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    /// Exactly three items, or empty when the collection has fewer.
    pub featured: Vec<ProductCard>,
    pub carousel: Vec<ProductCard>,
}

/// Display the home page.
#[instrument(skip(state, shopper, nonce))]
pub async fn home(
    State(state): State<AppState>,
    shopper: Shopper,
    CspNonce(nonce): CspNonce,
) -> HomeTemplate {
    let storefront = state.storefront();
    let (featured, carousel) = tokio::join!(
        storefront.get_collection_products(
            shopper.market,
            FEATURED_COLLECTION,
            ProductSortKey::Relevance,
            false
        ),
        storefront.get_collection_products(
            shopper.market,
            CAROUSEL_COLLECTION,
            ProductSortKey::Relevance,
            false
        ),
    );

    let description = format!(
        "High-performance ecommerce store built with Rust, powered by Shopify. Welcome to {}.",
        state.config().site_name
    );
    let page = PageContext::load(
        &state,
        &shopper,
        nonce,
        PageMeta::new("/").description(description),
    )
    .await;

    HomeTemplate {
        page,
        featured: featured_grid(&product_cards(&featured)),
        carousel: product_cards(&carousel),
    }
}

/// The first three cards, or none when fewer are available.
fn featured_grid(cards: &[ProductCard]) -> Vec<ProductCard> {
    cards
        .get(..FEATURED_ITEMS)
        .map(<[ProductCard]>::to_vec)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(title: &str) -> ProductCard {
        ProductCard {
            title: title.to_string(),
            url: format!("/product/{title}"),
            image: None,
            price: "$1.00 USD".to_string(),
        }
    }

    #[test]
    fn test_featured_grid_needs_three() {
        let cards: Vec<_> = ["a", "b", "c", "d"].into_iter().map(card).collect();
        assert_eq!(featured_grid(&cards).len(), 3);
        assert!(featured_grid(&cards[..2]).is_empty());
        assert!(featured_grid(&[]).is_empty());
    }
}
