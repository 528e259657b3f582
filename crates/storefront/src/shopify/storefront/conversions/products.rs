//! Product reshaping.

use crate::shopify::types::{
    Image, Money, PriceRange, Product, ProductOption, ProductVariant, SelectedOption, Seo,
};

use super::super::schema::{
    Connection, RawImage, RawMoney, RawPriceRange, RawProduct, RawProductOption,
    RawSelectedOption, RawSeo, RawVariant,
};
use super::connection::remove_edges_and_nodes;

/// Products tagged with this are never listed or shown on the storefront.
pub const HIDDEN_PRODUCT_TAG: &str = "nextjs-frontend-hidden";

/// Reshape a raw product.
///
/// Returns `None` when `filter_hidden` is set and the product carries
/// [`HIDDEN_PRODUCT_TAG`].
pub fn reshape_product(product: RawProduct, filter_hidden: bool) -> Option<Product> {
    if filter_hidden && product.tags.iter().any(|tag| tag == HIDDEN_PRODUCT_TAG) {
        return None;
    }

    let title = product.title;
    Some(Product {
        featured_image: product
            .featured_image
            .map(|image| reshape_image(image, &title)),
        images: reshape_images(product.images, &title),
        variants: remove_edges_and_nodes(product.variants)
            .into_iter()
            .map(reshape_variant)
            .collect(),
        options: product.options.into_iter().map(reshape_option).collect(),
        price_range: reshape_price_range(product.price_range),
        seo: reshape_seo(product.seo),
        id: product.id,
        handle: product.handle,
        available_for_sale: product.available_for_sale,
        description: product.description,
        description_html: product.description_html,
        tags: product.tags,
        updated_at: product.updated_at,
        title,
    })
}

/// Reshape a list of products, dropping hidden ones.
pub fn reshape_products(products: impl IntoIterator<Item = RawProduct>) -> Vec<Product> {
    products
        .into_iter()
        .filter_map(|product| reshape_product(product, true))
        .collect()
}

/// Flatten an image connection, defaulting alt text from the owner's title.
pub fn reshape_images(images: Connection<RawImage>, title: &str) -> Vec<Image> {
    remove_edges_and_nodes(images)
        .into_iter()
        .map(|image| reshape_image(image, title))
        .collect()
}

/// Reshape one image. Missing or blank alt text becomes `"{title} - {filename}"`.
pub fn reshape_image(image: RawImage, title: &str) -> Image {
    let alt_text = match image.alt_text {
        Some(alt) if !alt.trim().is_empty() => alt,
        _ => format!("{title} - {}", image_filename(&image.url)),
    };
    Image {
        url: image.url,
        alt_text,
        width: image.width,
        height: image.height,
    }
}

/// Last path segment of an image URL without query string or extension.
fn image_filename(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    segment
        .rsplit_once('.')
        .map_or(segment, |(name, _extension)| name)
}

pub(super) fn reshape_money(money: RawMoney) -> Money {
    Money {
        amount: money.amount,
        currency_code: money.currency_code,
    }
}

pub(super) fn reshape_seo(seo: Option<RawSeo>) -> Seo {
    seo.map(|seo| Seo {
        title: seo.title.filter(|t| !t.is_empty()),
        description: seo.description.filter(|d| !d.is_empty()),
    })
    .unwrap_or_default()
}

pub(super) fn reshape_selected_option(option: RawSelectedOption) -> SelectedOption {
    SelectedOption {
        name: option.name,
        value: option.value,
    }
}

fn reshape_price_range(range: RawPriceRange) -> PriceRange {
    PriceRange {
        min_variant_price: reshape_money(range.min_variant_price),
        max_variant_price: reshape_money(range.max_variant_price),
    }
}

fn reshape_option(option: RawProductOption) -> ProductOption {
    ProductOption {
        id: option.id,
        name: option.name,
        values: option.values,
    }
}

fn reshape_variant(variant: RawVariant) -> ProductVariant {
    ProductVariant {
        id: variant.id,
        title: variant.title,
        available_for_sale: variant.available_for_sale,
        selected_options: variant
            .selected_options
            .into_iter()
            .map(reshape_selected_option)
            .collect(),
        price: reshape_money(variant.price),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn raw_product(json: serde_json::Value) -> RawProduct {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_hidden_product_is_filtered() {
        let product = raw_product(serde_json::json!({
            "handle": "secret-mug",
            "title": "Secret Mug",
            "tags": ["kitchen", "nextjs-frontend-hidden"]
        }));
        assert!(reshape_product(product.clone(), true).is_none());
        assert_eq!(
            reshape_product(product, false).unwrap().handle,
            "secret-mug"
        );
    }

    #[test]
    fn test_reshape_products_drops_hidden_and_keeps_order() {
        let products = vec![
            raw_product(serde_json::json!({ "handle": "a", "tags": [] })),
            raw_product(serde_json::json!({ "handle": "b", "tags": [HIDDEN_PRODUCT_TAG] })),
            raw_product(serde_json::json!({ "handle": "c" })),
        ];
        let handles: Vec<_> = reshape_products(products)
            .into_iter()
            .map(|p| p.handle)
            .collect();
        assert_eq!(handles, ["a", "c"]);
    }

    #[test]
    fn test_variants_and_images_are_flattened() {
        let product = raw_product(serde_json::json!({
            "handle": "acme-mug",
            "title": "Acme Mug",
            "variants": { "edges": [
                { "node": {
                    "id": "gid://shopify/ProductVariant/1",
                    "title": "Blue",
                    "availableForSale": true,
                    "selectedOptions": [{ "name": "Color", "value": "Blue" }],
                    "price": { "amount": "12.0", "currencyCode": "USD" }
                } },
                { "node": null }
            ] },
            "images": { "edges": [
                { "node": { "url": "https://cdn.shopify.com/s/files/1/mug-blue.v2.jpg?v=17", "altText": null } },
                { "node": { "url": "https://cdn.shopify.com/s/files/1/mug.png", "altText": "Mug on a desk" } }
            ] }
        }));
        let product = reshape_product(product, true).unwrap();

        assert_eq!(product.variants.len(), 1);
        assert_eq!(product.variants[0].price.display(), "$12.00 USD");
        assert_eq!(product.images.len(), 2);
        assert_eq!(product.images[0].alt_text, "Acme Mug - mug-blue.v2");
        assert_eq!(product.images[1].alt_text, "Mug on a desk");
    }

    #[test]
    fn test_image_filename() {
        assert_eq!(image_filename("https://cdn.shopify.com/a/b/tee.jpg"), "tee");
        assert_eq!(image_filename("https://cdn.shopify.com/a/b/tee"), "tee");
        assert_eq!(image_filename("https://cdn.shopify.com/a/tee.webp?width=200"), "tee");
    }

    #[test]
    fn test_blank_seo_fields_become_none() {
        let seo = reshape_seo(Some(RawSeo {
            title: Some(String::new()),
            description: Some("Enamel mug".to_string()),
        }));
        assert_eq!(seo.title, None);
        assert_eq!(seo.description.as_deref(), Some("Enamel mug"));
        assert_eq!(reshape_seo(None), Seo::default());
    }
}
