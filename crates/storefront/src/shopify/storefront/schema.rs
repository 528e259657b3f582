//! Raw response shapes of the Storefront API documents in `graphql/`.
//!
//! Field names follow the GraphQL selection sets (camelCase on the wire).
//! Every container defaults missing fields so that a partial response still
//! deserializes, and every top-level `ResponseData` is `Default` so that a
//! failed request can be replaced with an empty shape.

use serde::Deserialize;

// =============================================================================
// Connections
// =============================================================================

/// A paginated GraphQL connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Connection<T> {
    #[serde(default)]
    pub edges: Vec<Edge<T>>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { edges: Vec::new() }
    }
}

/// One edge of a connection. Shopify may return `null` nodes.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Edge<T> {
    #[serde(default)]
    pub node: Option<T>,
}

// =============================================================================
// Shared fragments
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawMoney {
    pub amount: String,
    pub currency_code: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawImage {
    pub url: String,
    pub alt_text: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSeo {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSelectedOption {
    pub name: String,
    pub value: String,
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawProductOption {
    pub id: String,
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawPriceRange {
    pub max_variant_price: RawMoney,
    pub min_variant_price: RawMoney,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawVariant {
    pub id: String,
    pub title: String,
    pub available_for_sale: bool,
    pub selected_options: Vec<RawSelectedOption>,
    pub price: RawMoney,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawProduct {
    pub id: String,
    pub handle: String,
    pub available_for_sale: bool,
    pub title: String,
    pub description: String,
    pub description_html: String,
    pub options: Vec<RawProductOption>,
    pub price_range: RawPriceRange,
    pub variants: Connection<RawVariant>,
    pub featured_image: Option<RawImage>,
    pub images: Connection<RawImage>,
    pub seo: Option<RawSeo>,
    pub tags: Vec<String>,
    pub updated_at: String,
}

// =============================================================================
// Collections & menus
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawCollection {
    pub handle: String,
    pub title: String,
    pub description: String,
    pub seo: Option<RawSeo>,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCollectionProducts {
    pub products: Connection<RawProduct>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMenu {
    pub items: Vec<RawMenuItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMenuItem {
    pub title: String,
    pub url: Option<String>,
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawCartCost {
    pub subtotal_amount: RawMoney,
    pub total_amount: RawMoney,
    pub total_tax_amount: Option<RawMoney>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawCartLineCost {
    pub total_amount: RawMoney,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawMerchandise {
    pub id: String,
    pub title: String,
    pub selected_options: Vec<RawSelectedOption>,
    pub product: RawProduct,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCartLine {
    pub id: String,
    pub quantity: i64,
    pub cost: RawCartLineCost,
    pub merchandise: RawMerchandise,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawCart {
    pub id: String,
    pub checkout_url: String,
    pub cost: RawCartCost,
    pub lines: Connection<RawCartLine>,
    pub total_quantity: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawUserError {
    pub field: Option<Vec<String>>,
    pub message: String,
}

/// Payload shared by every cart mutation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CartPayload {
    pub cart: Option<RawCart>,
    pub user_errors: Vec<RawUserError>,
}

// =============================================================================
// Pages & blog
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawPage {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub body: String,
    pub body_summary: String,
    pub seo: Option<RawSeo>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawAuthor {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawArticle {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub content_html: String,
    pub published_at: String,
    pub tags: Vec<String>,
    pub author_v2: Option<RawAuthor>,
    pub image: Option<RawImage>,
    pub seo: Option<RawSeo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawBlogArticles {
    pub articles: Connection<RawArticle>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawBlogArticle {
    pub article_by_handle: Option<RawArticle>,
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawOrder {
    pub id: String,
    pub name: String,
    pub order_number: i64,
    pub processed_at: String,
    pub financial_status: Option<String>,
    pub fulfillment_status: String,
    pub current_total_price: RawMoney,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawCustomer {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub orders: Connection<RawOrder>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCustomerId {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCustomerUserError {
    pub code: Option<String>,
    pub field: Option<Vec<String>>,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawCustomerAccessToken {
    pub access_token: String,
    pub expires_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerCreatePayload {
    pub customer: Option<RawCustomerId>,
    pub customer_user_errors: Vec<RawCustomerUserError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerAccessTokenCreatePayload {
    pub customer_access_token: Option<RawCustomerAccessToken>,
    pub customer_user_errors: Vec<RawCustomerUserError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerAccessTokenDeletePayload {
    pub deleted_access_token: Option<String>,
    pub user_errors: Vec<RawUserError>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_keeps_null_nodes_for_reshaping() {
        let json = r#"{"edges":[{"node":{"title":"Mug"}},{"node":null},{}]}"#;
        let connection: Connection<RawProduct> = serde_json::from_str(json).unwrap();
        assert_eq!(connection.edges.len(), 3);
        assert!(connection.edges[1].node.is_none());
        assert!(connection.edges[2].node.is_none());
    }

    #[test]
    fn test_partial_product_deserializes() {
        let json = r#"{"handle":"acme-mug","tags":["kitchen"]}"#;
        let product: RawProduct = serde_json::from_str(json).unwrap();
        assert_eq!(product.handle, "acme-mug");
        assert!(product.variants.edges.is_empty());
        assert!(product.featured_image.is_none());
    }

    #[test]
    fn test_missing_tax_is_none() {
        let json = r#"{"subtotalAmount":{"amount":"10.0","currencyCode":"USD"},
                       "totalAmount":{"amount":"10.0","currencyCode":"USD"},
                       "totalTaxAmount":null}"#;
        let cost: RawCartCost = serde_json::from_str(json).unwrap();
        assert_eq!(cost.total_amount.currency_code, "USD");
        assert!(cost.total_tax_amount.is_none());
    }
}
