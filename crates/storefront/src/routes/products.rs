//! Product route handlers.

use acme_store_core::ProductGid;
use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use serde_json::json;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CspNonce, Shopper};
use crate::routes::layout::{PageContext, PageMeta};
use crate::shopify::{Image, Product};
use crate::state::AppState;
use crate::variant::{
    OptionSelector, SelectionParams, option_value_states, product_url, selected_variant,
};

/// Query parameter holding the gallery position.
const IMAGE_PARAM: &str = "image";

/// Product tile used by every product grid.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub title: String,
    pub url: String,
    pub image: Option<Image>,
    pub price: String,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            url: format!("/product/{}", product.handle),
            image: product.featured_image.clone(),
            price: product.price_range.max_variant_price.display(),
        }
    }
}

/// Build cards for a product list.
#[must_use]
pub fn product_cards(products: &[Product]) -> Vec<ProductCard> {
    products.iter().map(ProductCard::from).collect()
}

// =============================================================================
// Gallery
// =============================================================================

/// Thumbnail in the product gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryImage {
    pub image: Image,
    pub url: String,
    pub active: bool,
}

/// Gallery state selected by the `image` query parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gallery {
    pub active: Option<Image>,
    pub thumbnails: Vec<GalleryImage>,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
}

/// Resolve the gallery for `params`.
///
/// Out-of-range or unparseable positions show the first image. Previous and
/// next wrap around; a single image has neither.
#[must_use]
pub fn gallery(product: &Product, params: &SelectionParams) -> Gallery {
    let images: Vec<Image> = if product.images.is_empty() {
        product.featured_image.iter().cloned().collect()
    } else {
        product.images.clone()
    };
    if images.is_empty() {
        return Gallery::default();
    }

    let count = images.len();
    let index = params
        .get(IMAGE_PARAM)
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|index| *index < count)
        .unwrap_or(0);

    let url_for = |position: usize| {
        let mut with_image = params.clone();
        with_image.insert(IMAGE_PARAM.to_string(), position.to_string());
        product_url(&product.handle, &with_image)
    };

    let (previous_url, next_url) = if count > 1 {
        (
            Some(url_for((index + count - 1) % count)),
            Some(url_for((index + 1) % count)),
        )
    } else {
        (None, None)
    };

    Gallery {
        active: images.get(index).cloned(),
        thumbnails: images
            .into_iter()
            .enumerate()
            .map(|(position, image)| GalleryImage {
                image,
                url: url_for(position),
                active: position == index,
            })
            .collect(),
        previous_url,
        next_url,
    }
}

// =============================================================================
// Structured Data
// =============================================================================

/// schema.org `Product` JSON-LD, safe to embed in a `<script>` element.
#[must_use]
pub fn product_json_ld(product: &Product) -> String {
    let availability = if product.available_for_sale {
        "https://schema.org/InStock"
    } else {
        "https://schema.org/OutOfStock"
    };

    let data = json!({
        "@context": "https://schema.org",
        "@type": "Product",
        "name": product.title,
        "description": product.description,
        "image": product.featured_image.as_ref().map(|image| image.url.as_str()),
        "offers": {
            "@type": "AggregateOffer",
            "availability": availability,
            "priceCurrency": product.price_range.min_variant_price.currency_code,
            "highPrice": product.price_range.max_variant_price.amount,
            "lowPrice": product.price_range.min_variant_price.amount,
        },
    });

    escape_script(&data.to_string())
}

/// Keep serialized JSON from closing the surrounding `<script>` element.
pub(crate) fn escape_script(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

// =============================================================================
// Product Page
// =============================================================================

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub page: PageContext,
    pub product: Product,
    pub gallery: Gallery,
    pub selectors: Vec<OptionSelector>,
    /// Variant added by the cart form, once every option is chosen.
    pub selected_variant_id: Option<String>,
    pub price: String,
    pub can_add_to_cart: bool,
    pub button_label: &'static str,
    pub related_products: Vec<ProductCard>,
    pub json_ld: String,
}

/// Display a product page.
///
/// # Errors
///
/// Returns 404 if the product doesn't exist or is hidden.
#[instrument(skip(state, shopper, nonce, params))]
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Query(params): Query<SelectionParams>,
    shopper: Shopper,
    CspNonce(nonce): CspNonce,
) -> Result<ProductShowTemplate> {
    let storefront = state.storefront();
    let product = storefront
        .get_product(shopper.market, &handle)
        .await
        .ok_or_else(|| AppError::NotFound(format!("product {handle}")))?;

    let related = match ProductGid::parse(&product.id) {
        Ok(product_id) => {
            storefront
                .get_product_recommendations(shopper.market, &product_id)
                .await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Product has no usable ID, skipping recommendations");
            Vec::new()
        }
    };

    let variant = selected_variant(&product, &params);
    let (can_add_to_cart, button_label) = match variant {
        _ if !product.available_for_sale => (false, "Out of stock"),
        Some(variant) if variant.available_for_sale => (true, "Add to cart"),
        Some(_) => (false, "Out of stock"),
        None => (false, "Select options"),
    };
    let price = variant.map_or_else(
        || product.price_range.max_variant_price.display(),
        |variant| variant.price.display(),
    );
    let selected_variant_id = variant.map(|variant| variant.id.clone());

    let meta = PageMeta::new(format!("/product/{}", product.handle)).seo(
        &product.seo,
        &product.title,
        &product.description,
    );
    let page = PageContext::load(&state, &shopper, nonce, meta).await;

    Ok(ProductShowTemplate {
        page,
        gallery: gallery(&product, &params),
        selectors: option_value_states(&product, &params),
        selected_variant_id,
        price,
        can_add_to_cart,
        button_label,
        related_products: product_cards(&related),
        json_ld: product_json_ld(&product),
        product,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shopify::{Money, PriceRange, Seo};

    fn image(name: &str) -> Image {
        Image {
            url: format!("https://cdn.shopify.com/{name}.jpg"),
            alt_text: name.to_string(),
            width: None,
            height: None,
        }
    }

    fn product(images: Vec<Image>) -> Product {
        Product {
            id: "gid://shopify/Product/1".to_string(),
            handle: "acme-tee".to_string(),
            available_for_sale: true,
            title: "Acme </script> Tee".to_string(),
            description: "Soft".to_string(),
            description_html: "<p>Soft</p>".to_string(),
            options: vec![],
            price_range: PriceRange {
                min_variant_price: Money {
                    amount: "10.0".to_string(),
                    currency_code: "USD".to_string(),
                },
                max_variant_price: Money {
                    amount: "25.0".to_string(),
                    currency_code: "USD".to_string(),
                },
            },
            variants: vec![],
            featured_image: images.first().cloned(),
            images,
            seo: Seo::default(),
            tags: vec![],
            updated_at: String::new(),
        }
    }

    fn params(pairs: &[(&str, &str)]) -> SelectionParams {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_gallery_selects_and_wraps() {
        let tee = product(vec![image("front"), image("back"), image("side")]);

        let gallery = gallery(&tee, &params(&[("image", "2"), ("size", "M")]));
        assert_eq!(gallery.active, Some(image("side")));
        assert!(gallery.thumbnails[2].active);
        assert_eq!(
            gallery.next_url.as_deref(),
            Some("/product/acme-tee?image=0&size=M")
        );
        assert_eq!(
            gallery.previous_url.as_deref(),
            Some("/product/acme-tee?image=1&size=M")
        );
    }

    #[test]
    fn test_gallery_out_of_range_shows_first() {
        let tee = product(vec![image("front"), image("back")]);
        assert_eq!(
            gallery(&tee, &params(&[("image", "9")])).active,
            Some(image("front"))
        );
        assert_eq!(
            gallery(&tee, &params(&[("image", "x")])).active,
            Some(image("front"))
        );
    }

    #[test]
    fn test_single_image_has_no_arrows() {
        let tee = product(vec![image("front")]);
        let gallery = gallery(&tee, &SelectionParams::new());
        assert!(gallery.previous_url.is_none());
        assert!(gallery.next_url.is_none());

        assert_eq!(super::gallery(&product(vec![]), &SelectionParams::new()), Gallery::default());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_json_ld_is_escaped() {
        let ld = product_json_ld(&product(vec![image("front")]));
        assert!(!ld.contains("</script>"));

        let parsed: serde_json::Value = serde_json::from_str(&ld).unwrap();
        assert_eq!(parsed["name"], "Acme </script> Tee");
        assert_eq!(parsed["offers"]["lowPrice"], "10.0");
        assert_eq!(parsed["offers"]["availability"], "https://schema.org/InStock");
    }

    #[test]
    fn test_card_uses_highest_price() {
        let card = ProductCard::from(&product(vec![]));
        assert_eq!(card.url, "/product/acme-tee");
        assert_eq!(card.price, "$25.00 USD");
    }
}
