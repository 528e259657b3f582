//! Domain types for the Shopify Storefront API.
//!
//! These are the reshaped forms handed to route handlers: connections are
//! flattened into `Vec`s, optional upstream fields are defaulted, and
//! collections carry their storefront path.

use serde::{Deserialize, Serialize};

use acme_store_core::format_money;

// =============================================================================
// Money Types
// =============================================================================

/// Monetary amount with currency code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Decimal amount as string (preserves precision).
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

impl Money {
    /// Zero in the given currency.
    #[must_use]
    pub fn zero(currency_code: &str) -> Self {
        Self {
            amount: "0.0".to_string(),
            currency_code: currency_code.to_string(),
        }
    }

    /// Format for display (e.g., `$19.99 USD`).
    #[must_use]
    pub fn display(&self) -> String {
        format_money(&self.amount, &self.currency_code)
    }
}

/// Price range for a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Minimum price among all variants.
    pub min_variant_price: Money,
    /// Maximum price among all variants.
    pub max_variant_price: Money,
}

// =============================================================================
// Image & SEO Types
// =============================================================================

/// Product, article or collection image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alt text, defaulted from the owner's title and the file name.
    pub alt_text: String,
    /// Image width in pixels.
    pub width: Option<i64>,
    /// Image height in pixels.
    pub height: Option<i64>,
}

/// SEO metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seo {
    /// Page title for search engines.
    pub title: Option<String>,
    /// Meta description.
    pub description: Option<String>,
}

// =============================================================================
// Product Types
// =============================================================================

/// Selected option on a product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option name (e.g., "Size", "Color").
    pub name: String,
    /// Selected value (e.g., "Large", "Blue").
    pub value: String,
}

/// Product option definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    /// Option ID.
    pub id: String,
    /// Option name (e.g., "Size").
    pub name: String,
    /// Available values (e.g., `["Small", "Medium", "Large"]`).
    pub values: Vec<String>,
}

/// A product variant (specific combination of options).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant ID.
    pub id: String,
    /// Variant title (combination of option values).
    pub title: String,
    /// Whether this variant is available for sale.
    pub available_for_sale: bool,
    /// Selected options for this variant.
    pub selected_options: Vec<SelectedOption>,
    /// Current price.
    pub price: Money,
}

/// A product in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: String,
    /// URL handle.
    pub handle: String,
    /// Whether any variant is available.
    pub available_for_sale: bool,
    /// Product title.
    pub title: String,
    /// Plain text description.
    pub description: String,
    /// HTML description.
    pub description_html: String,
    /// Product options.
    pub options: Vec<ProductOption>,
    /// Price range across variants.
    pub price_range: PriceRange,
    /// Product variants.
    pub variants: Vec<ProductVariant>,
    /// Featured image.
    pub featured_image: Option<Image>,
    /// All product images.
    pub images: Vec<Image>,
    /// SEO metadata.
    pub seo: Seo,
    /// Product tags.
    pub tags: Vec<String>,
    /// Last update timestamp.
    pub updated_at: String,
}

// =============================================================================
// Collection Types
// =============================================================================

/// A collection of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// URL handle (empty for the synthetic "All" collection).
    pub handle: String,
    /// Collection title.
    pub title: String,
    /// Plain text description.
    pub description: String,
    /// SEO metadata.
    pub seo: Seo,
    /// Last update timestamp.
    pub updated_at: String,
    /// Storefront path (`/search/{handle}`).
    pub path: String,
}

// =============================================================================
// Cart Types
// =============================================================================

/// Parent product of a cart line's variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    /// Product ID.
    pub id: String,
    /// Product handle.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Featured image.
    pub featured_image: Option<Image>,
}

/// The variant a cart line holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartMerchandise {
    /// Variant ID.
    pub id: String,
    /// Variant title.
    pub title: String,
    /// Selected options.
    pub selected_options: Vec<SelectedOption>,
    /// Parent product info.
    pub product: CartProduct,
}

/// A line item in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Cart line ID.
    pub id: String,
    /// Quantity.
    pub quantity: i64,
    /// Line total as computed by Shopify.
    pub total_amount: Money,
    /// Product variant.
    pub merchandise: CartMerchandise,
}

/// Cart cost summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCost {
    /// Subtotal before tax/shipping.
    pub subtotal_amount: Money,
    /// Total amount.
    pub total_amount: Money,
    /// Total tax amount, zero when Shopify omits it.
    pub total_tax_amount: Money,
}

/// A shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart ID.
    pub id: String,
    /// Checkout URL.
    pub checkout_url: String,
    /// Cart cost summary.
    pub cost: CartCost,
    /// Cart lines.
    pub lines: Vec<CartLine>,
    /// Total item quantity.
    pub total_quantity: i64,
}

impl Cart {
    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Input for adding a line to cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    /// Product variant ID.
    pub merchandise_id: String,
    /// Quantity to add.
    pub quantity: i64,
}

/// Input for updating a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineUpdateInput {
    /// Cart line ID.
    pub id: String,
    /// Variant the line holds.
    pub merchandise_id: String,
    /// New quantity.
    pub quantity: i64,
}

// =============================================================================
// Menu & Content Types
// =============================================================================

/// A navigation menu entry with a storefront-relative path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Link text.
    pub title: String,
    /// Path on this storefront.
    pub path: String,
}

/// A CMS page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Page ID.
    pub id: String,
    /// Page title.
    pub title: String,
    /// URL handle.
    pub handle: String,
    /// HTML body.
    pub body: String,
    /// Plain text summary.
    pub body_summary: String,
    /// SEO metadata.
    pub seo: Seo,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// A blog article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Article ID.
    pub id: String,
    /// URL handle.
    pub handle: String,
    /// Article title.
    pub title: String,
    /// Plain text excerpt.
    pub excerpt: Option<String>,
    /// HTML content.
    pub content_html: String,
    /// Publication timestamp.
    pub published_at: String,
    /// Article tags.
    pub tags: Vec<String>,
    /// Author display name.
    pub author: Option<String>,
    /// Hero image.
    pub image: Option<Image>,
    /// SEO metadata.
    pub seo: Seo,
}

// =============================================================================
// Customer Types
// =============================================================================

/// A logged-in customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer ID.
    pub id: String,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Most recent orders, newest first.
    pub orders: Vec<Order>,
}

impl Customer {
    /// Full name, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.email.clone().unwrap_or_default()
        } else {
            name
        }
    }
}

/// A customer's order summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order ID.
    pub id: String,
    /// Display name (e.g., `#1001`).
    pub name: String,
    /// Order number.
    pub order_number: i64,
    /// When the order was placed.
    pub processed_at: String,
    /// Payment status.
    pub financial_status: Option<String>,
    /// Fulfillment status.
    pub fulfillment_status: String,
    /// Order total.
    pub total: Money,
}

/// Session token for customer-scoped queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerAccessToken {
    /// Opaque token.
    pub access_token: String,
    /// Expiry timestamp.
    pub expires_at: String,
}

/// Validation error returned by customer mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerUserError {
    /// Error code (e.g., `TAKEN`, `UNIDENTIFIED_CUSTOMER`).
    pub code: Option<String>,
    /// Field path that caused the error.
    pub field: Vec<String>,
    /// Human-readable error message.
    pub message: String,
}

impl CustomerUserError {
    /// An error not tied to a field.
    #[must_use]
    pub fn general(message: impl Into<String>) -> Self {
        Self {
            code: None,
            field: vec![],
            message: message.into(),
        }
    }
}

/// Input for registering a customer.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCreateInput {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
    /// First name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Marketing opt-in.
    pub accepts_marketing: bool,
}

impl std::fmt::Debug for CustomerCreateInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerCreateInput")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("accepts_marketing", &self.accepts_marketing)
            .finish()
    }
}

// =============================================================================
// Sort Keys
// =============================================================================

/// Sort keys for product queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductSortKey {
    /// Sort by relevance (for search).
    Relevance,
    /// Sort by best selling.
    BestSelling,
    /// Sort by creation date.
    CreatedAt,
    /// Sort by price.
    Price,
    /// Sort by title.
    Title,
}

impl ProductSortKey {
    /// GraphQL enum value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "RELEVANCE",
            Self::BestSelling => "BEST_SELLING",
            Self::CreatedAt => "CREATED_AT",
            Self::Price => "PRICE",
            Self::Title => "TITLE",
        }
    }
}

/// Sort keys for collection product queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductCollectionSortKey {
    /// Sort by relevance.
    Relevance,
    /// Sort by best selling.
    BestSelling,
    /// Sort by creation date.
    Created,
    /// Sort by price.
    Price,
    /// Sort by title.
    Title,
}

impl ProductCollectionSortKey {
    /// GraphQL enum value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "RELEVANCE",
            Self::BestSelling => "BEST_SELLING",
            Self::Created => "CREATED",
            Self::Price => "PRICE",
            Self::Title => "TITLE",
        }
    }
}

impl From<ProductSortKey> for ProductCollectionSortKey {
    /// Collections name the creation-date key `CREATED` instead of `CREATED_AT`.
    fn from(key: ProductSortKey) -> Self {
        match key {
            ProductSortKey::Relevance => Self::Relevance,
            ProductSortKey::BestSelling => Self::BestSelling,
            ProductSortKey::CreatedAt => Self::Created,
            ProductSortKey::Price => Self::Price,
            ProductSortKey::Title => Self::Title,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_money_display() {
        let money = Money {
            amount: "24.5".to_string(),
            currency_code: "USD".to_string(),
        };
        assert_eq!(money.display(), "$24.50 USD");
        assert_eq!(Money::zero("EUR").display(), "€0.00 EUR");
    }

    #[test]
    fn test_collection_sort_key_maps_created_at() {
        assert_eq!(
            ProductCollectionSortKey::from(ProductSortKey::CreatedAt),
            ProductCollectionSortKey::Created
        );
        assert_eq!(
            serde_json::to_string(&ProductCollectionSortKey::Created).unwrap(),
            "\"CREATED\""
        );
        assert_eq!(
            serde_json::to_string(&ProductSortKey::BestSelling).unwrap(),
            "\"BEST_SELLING\""
        );
    }

    #[test]
    fn test_customer_display_name() {
        let mut customer = Customer {
            id: "gid://shopify/Customer/1".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            email: Some("ada@acme.test".to_string()),
            phone: None,
            orders: vec![],
        };
        assert_eq!(customer.display_name(), "Ada Lovelace");

        customer.first_name = None;
        customer.last_name = Some(String::new());
        assert_eq!(customer.display_name(), "ada@acme.test");
    }

    #[test]
    fn test_line_inputs_serialize_camel_case() {
        let input = CartLineUpdateInput {
            id: "gid://shopify/CartLine/1".to_string(),
            merchandise_id: "gid://shopify/ProductVariant/2".to_string(),
            quantity: 3,
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["merchandiseId"], "gid://shopify/ProductVariant/2");
        assert_eq!(json["quantity"], 3);
    }
}
