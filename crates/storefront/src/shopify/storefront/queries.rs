//! GraphQL operation definitions for the Shopify Storefront API.
//!
//! Each operation is a zero-sized type implementing [`GraphQLQuery`] whose
//! document is assembled at compile time from `graphql/queries/*.graphql`
//! plus the fragments it spreads. Response types live in [`super::schema`].

use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

use super::schema::{
    CartPayload, Connection, CustomerAccessTokenCreatePayload, CustomerAccessTokenDeletePayload,
    CustomerCreatePayload, RawBlogArticle, RawBlogArticles, RawCart, RawCollection,
    RawCollectionProducts, RawCustomer, RawMenu, RawPage, RawProduct,
};
use crate::shopify::types::{
    CartLineInput, CartLineUpdateInput, CustomerCreateInput, ProductCollectionSortKey,
    ProductSortKey,
};

macro_rules! graphql_file {
    ($path:literal) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/graphql/", $path))
    };
}

macro_rules! document {
    ($query:literal $(, $fragment:literal)* $(,)?) => {
        concat!(
            graphql_file!($query)
            $(, "\n", graphql_file!($fragment))*
        )
    };
}

macro_rules! operation {
    (
        $(#[$meta:meta])*
        $name:ident, $operation:literal, $document:expr,
        $variables:ty => $data:ty
    ) => {
        $(#[$meta])*
        pub struct $name;

        impl GraphQLQuery for $name {
            type Variables = $variables;
            type ResponseData = $data;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $document,
                    operation_name: $operation,
                }
            }
        }
    };
}

const PRODUCT: &str = document!(
    "queries/get_product.graphql",
    "fragments/product.graphql",
    "fragments/image.graphql",
    "fragments/seo.graphql",
);

const PRODUCTS: &str = document!(
    "queries/get_products.graphql",
    "fragments/product.graphql",
    "fragments/image.graphql",
    "fragments/seo.graphql",
);

const PRODUCT_RECOMMENDATIONS: &str = document!(
    "queries/get_product_recommendations.graphql",
    "fragments/product.graphql",
    "fragments/image.graphql",
    "fragments/seo.graphql",
);

const COLLECTION: &str = document!(
    "queries/get_collection.graphql",
    "fragments/collection.graphql",
    "fragments/seo.graphql",
);

const COLLECTIONS: &str = document!(
    "queries/get_collections.graphql",
    "fragments/collection.graphql",
    "fragments/seo.graphql",
);

const COLLECTION_PRODUCTS: &str = document!(
    "queries/get_collection_products.graphql",
    "fragments/product.graphql",
    "fragments/image.graphql",
    "fragments/seo.graphql",
);

const MENU: &str = document!("queries/get_menu.graphql");

const PAGE: &str = document!(
    "queries/get_page.graphql",
    "fragments/page.graphql",
    "fragments/seo.graphql",
);

const PAGES: &str = document!(
    "queries/get_pages.graphql",
    "fragments/page.graphql",
    "fragments/seo.graphql",
);

const CART: &str = document!(
    "queries/get_cart.graphql",
    "fragments/cart.graphql",
    "fragments/product.graphql",
    "fragments/image.graphql",
    "fragments/seo.graphql",
);

const CREATE_CART: &str = document!(
    "queries/create_cart.graphql",
    "fragments/cart.graphql",
    "fragments/product.graphql",
    "fragments/image.graphql",
    "fragments/seo.graphql",
);

const ADD_TO_CART: &str = document!(
    "queries/add_to_cart.graphql",
    "fragments/cart.graphql",
    "fragments/product.graphql",
    "fragments/image.graphql",
    "fragments/seo.graphql",
);

const REMOVE_FROM_CART: &str = document!(
    "queries/remove_from_cart.graphql",
    "fragments/cart.graphql",
    "fragments/product.graphql",
    "fragments/image.graphql",
    "fragments/seo.graphql",
);

const EDIT_CART_ITEMS: &str = document!(
    "queries/edit_cart_items.graphql",
    "fragments/cart.graphql",
    "fragments/product.graphql",
    "fragments/image.graphql",
    "fragments/seo.graphql",
);

const CUSTOMER_CREATE: &str = document!("queries/customer_create.graphql");
const CUSTOMER_ACCESS_TOKEN_CREATE: &str = document!("queries/customer_access_token_create.graphql");
const CUSTOMER_ACCESS_TOKEN_DELETE: &str = document!("queries/customer_access_token_delete.graphql");
const CUSTOMER: &str = document!("queries/get_customer.graphql");

const BLOG_ARTICLES: &str = document!(
    "queries/get_blog_articles.graphql",
    "fragments/article.graphql",
    "fragments/image.graphql",
    "fragments/seo.graphql",
);

const ARTICLE: &str = document!(
    "queries/get_article.graphql",
    "fragments/article.graphql",
    "fragments/image.graphql",
    "fragments/seo.graphql",
);

// =============================================================================
// Variables
// =============================================================================

/// Variables for queries that take only a handle.
#[derive(Debug, Clone, Serialize)]
pub struct HandleVariables {
    pub handle: String,
}

/// Variables for queries without arguments.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NoVariables {}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProductVariables {
    pub handle: String,
    pub country: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProductsVariables {
    pub query: Option<String>,
    pub sort_key: ProductSortKey,
    pub reverse: bool,
    pub country: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProductRecommendationsVariables {
    pub product_id: String,
    pub country: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCollectionProductsVariables {
    pub handle: String,
    pub sort_key: ProductCollectionSortKey,
    pub reverse: bool,
    pub country: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartIdVariables {
    pub cart_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerIdentity {
    pub country_code: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCartVariables {
    pub line_items: Vec<CartLineInput>,
    pub buyer_identity: Option<BuyerIdentity>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartVariables {
    pub cart_id: String,
    pub lines: Vec<CartLineInput>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartVariables {
    pub cart_id: String,
    pub line_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditCartItemsVariables {
    pub cart_id: String,
    pub lines: Vec<CartLineUpdateInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerCreateVariables {
    pub input: CustomerCreateInput,
}

/// Log-in credentials. Not `Debug`, so the password never reaches a log line.
#[derive(Clone, Serialize)]
pub struct CustomerCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Serialize)]
pub struct CustomerAccessTokenCreateVariables {
    pub input: CustomerCredentials,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerTokenVariables {
    pub customer_access_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetBlogArticlesVariables {
    pub handle: String,
    pub first: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetArticleVariables {
    pub blog_handle: String,
    pub article_handle: String,
}

// =============================================================================
// Response data
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductData {
    pub product: Option<RawProduct>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductsData {
    pub products: Connection<RawProduct>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductRecommendationsData {
    pub product_recommendations: Option<Vec<RawProduct>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CollectionData {
    pub collection: Option<RawCollection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CollectionsData {
    pub collections: Connection<RawCollection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CollectionProductsData {
    pub collection: Option<RawCollectionProducts>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MenuData {
    pub menu: Option<RawMenu>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageData {
    pub page_by_handle: Option<RawPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PagesData {
    pub pages: Connection<RawPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CartData {
    pub cart: Option<RawCart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateCartData {
    pub cart_create: Option<CartPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddToCartData {
    pub cart_lines_add: Option<CartPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoveFromCartData {
    pub cart_lines_remove: Option<CartPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditCartItemsData {
    pub cart_lines_update: Option<CartPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerCreateData {
    pub customer_create: Option<CustomerCreatePayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerAccessTokenCreateData {
    pub customer_access_token_create: Option<CustomerAccessTokenCreatePayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerAccessTokenDeleteData {
    pub customer_access_token_delete: Option<CustomerAccessTokenDeletePayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CustomerData {
    pub customer: Option<RawCustomer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BlogArticlesData {
    pub blog: Option<RawBlogArticles>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArticleData {
    pub blog: Option<RawBlogArticle>,
}

// =============================================================================
// Operations
// =============================================================================

operation!(
    /// A single product by handle.
    GetProduct, "getProduct", PRODUCT,
    GetProductVariables => ProductData
);

operation!(
    /// Up to 100 products matching a search query.
    GetProducts, "getProducts", PRODUCTS,
    GetProductsVariables => ProductsData
);

operation!(
    /// Products Shopify recommends alongside another product.
    GetProductRecommendations, "getProductRecommendations", PRODUCT_RECOMMENDATIONS,
    GetProductRecommendationsVariables => ProductRecommendationsData
);

operation!(
    /// Collection metadata by handle.
    GetCollection, "getCollection", COLLECTION,
    HandleVariables => CollectionData
);

operation!(
    /// Every collection, sorted by title.
    GetCollections, "getCollections", COLLECTIONS,
    NoVariables => CollectionsData
);

operation!(
    /// Up to 100 products in a collection.
    GetCollectionProducts, "getCollectionProducts", COLLECTION_PRODUCTS,
    GetCollectionProductsVariables => CollectionProductsData
);

operation!(
    /// A navigation menu by handle.
    GetMenu, "getMenu", MENU,
    HandleVariables => MenuData
);

operation!(
    /// A CMS page by handle.
    GetPage, "getPage", PAGE,
    HandleVariables => PageData
);

operation!(
    /// Every CMS page.
    GetPages, "getPages", PAGES,
    NoVariables => PagesData
);

operation!(
    /// A cart by ID.
    GetCart, "getCart", CART,
    CartIdVariables => CartData
);

operation!(
    /// Create a cart, optionally with initial lines.
    CreateCart, "createCart", CREATE_CART,
    CreateCartVariables => CreateCartData
);

operation!(
    /// Add lines to a cart.
    AddToCart, "addToCart", ADD_TO_CART,
    AddToCartVariables => AddToCartData
);

operation!(
    /// Remove lines from a cart.
    RemoveFromCart, "removeFromCart", REMOVE_FROM_CART,
    RemoveFromCartVariables => RemoveFromCartData
);

operation!(
    /// Change line quantities.
    EditCartItems, "editCartItems", EDIT_CART_ITEMS,
    EditCartItemsVariables => EditCartItemsData
);

operation!(
    /// Register a customer.
    CustomerCreate, "customerCreate", CUSTOMER_CREATE,
    CustomerCreateVariables => CustomerCreateData
);

operation!(
    /// Exchange credentials for a customer access token.
    CustomerAccessTokenCreate, "customerAccessTokenCreate", CUSTOMER_ACCESS_TOKEN_CREATE,
    CustomerAccessTokenCreateVariables => CustomerAccessTokenCreateData
);

operation!(
    /// Revoke a customer access token.
    CustomerAccessTokenDelete, "customerAccessTokenDelete", CUSTOMER_ACCESS_TOKEN_DELETE,
    CustomerTokenVariables => CustomerAccessTokenDeleteData
);

operation!(
    /// The customer owning an access token, with recent orders.
    GetCustomer, "getCustomer", CUSTOMER,
    CustomerTokenVariables => CustomerData
);

operation!(
    /// Newest articles of a blog.
    GetBlogArticles, "getBlogArticles", BLOG_ARTICLES,
    GetBlogArticlesVariables => BlogArticlesData
);

operation!(
    /// One article of a blog.
    GetArticle, "getArticle", ARTICLE,
    GetArticleVariables => ArticleData
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_include_spread_fragments() {
        let body = GetCart::build_query(CartIdVariables {
            cart_id: "gid://shopify/Cart/1".to_string(),
        });
        assert_eq!(body.operation_name, "getCart");
        for fragment in [
            "fragment cart on Cart",
            "fragment product on Product",
            "fragment image on Image",
            "fragment seo on SEO",
        ] {
            assert!(body.query.contains(fragment), "missing {fragment}");
        }
    }

    #[test]
    fn test_menu_document_has_no_fragments() {
        assert!(MENU.starts_with("query getMenu"));
        assert!(!MENU.contains("fragment"));
    }

    #[test]
    fn test_products_variables_serialize() {
        let body = GetProducts::build_query(GetProductsVariables {
            query: Some("mug".to_string()),
            sort_key: ProductSortKey::Price,
            reverse: true,
            country: Some("CA"),
        });
        let json = serde_json::to_value(&body).unwrap_or_default();
        assert_eq!(json["operationName"], "getProducts");
        assert_eq!(json["variables"]["sortKey"], "PRICE");
        assert_eq!(json["variables"]["reverse"], true);
        assert_eq!(json["variables"]["country"], "CA");
    }

    #[test]
    fn test_no_variables_serializes_as_empty_object() {
        let body = GetCollections::build_query(NoVariables::default());
        let json = serde_json::to_value(&body).unwrap_or_default();
        assert_eq!(json["variables"], serde_json::json!({}));
    }
}
