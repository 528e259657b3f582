//! Shopify Storefront API client implementation.
//!
//! Uses `graphql_client` query bodies with `reqwest` 0.13 for HTTP. Products,
//! collections and menus are cached using `moka`; carts, customers and CMS
//! content are always fetched fresh.

mod cache;
mod conversions;
mod market;
mod queries;
mod schema;

use std::sync::Arc;
use std::time::Duration;

use acme_store_core::ProductGid;
use graphql_client::{GraphQLQuery, QueryBody, Response};
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};

use crate::config::ShopifyStorefrontConfig;
use crate::shopify::types::{
    Article, Cart, CartLineInput, CartLineUpdateInput, Collection, Customer, CustomerAccessToken,
    CustomerCreateInput, CustomerUserError, MenuItem, Page, Product, ProductCollectionSortKey,
    ProductSortKey,
};
use crate::shopify::{GraphQLError, GraphQLErrorLocation, ShopifyError};

pub use cache::CacheTag;
pub use market::Market;

use cache::{CacheEntry, CacheValue};
use conversions::{
    remove_edges_and_nodes, reshape_article, reshape_cart, reshape_collection,
    reshape_collections, reshape_customer, reshape_customer_user_errors, reshape_menu,
    reshape_page, reshape_product, reshape_products, storefront_collections,
};
use queries::{
    AddToCart, AddToCartVariables, BuyerIdentity, CartIdVariables, CreateCart,
    CreateCartVariables, CustomerAccessTokenCreate, CustomerAccessTokenCreateVariables,
    CustomerAccessTokenDelete, CustomerCreate, CustomerCreateVariables, CustomerCredentials,
    CustomerTokenVariables, EditCartItems, EditCartItemsVariables, GetArticle,
    GetArticleVariables, GetBlogArticles, GetBlogArticlesVariables, GetCart, GetCollection,
    GetCollectionProducts, GetCollectionProductsVariables, GetCollections, GetCustomer, GetMenu,
    GetPage, GetPages, GetProduct, GetProductRecommendations, GetProductRecommendationsVariables,
    GetProductVariables, GetProducts, GetProductsVariables, HandleVariables, NoVariables,
    RemoveFromCart, RemoveFromCartVariables,
};
use schema::CartPayload;

/// Header carrying the public Storefront API access token.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Storefront-Access-Token";

/// Upper bound on cached responses.
const CACHE_CAPACITY: u64 = 1000;

/// Message shown on customer forms when Shopify cannot be reached.
const CUSTOMER_UNAVAILABLE: &str = "We couldn't reach the store right now. Please try again.";

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Every operation degrades instead of failing: an upstream error is logged
/// at `warn` and the caller receives an empty shape.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    store_domain: String,
    access_token: SecretString,
    timeout: Duration,
    cache: Cache<String, CacheEntry>,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (e.g. TLS backend
    /// initialization fails).
    pub fn new(config: &ShopifyStorefrontConfig) -> Result<Self, ShopifyError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(config.cache_ttl)
            .support_invalidation_closures()
            .build();

        Ok(Self {
            inner: Arc::new(StorefrontClientInner {
                client,
                endpoint: config.graphql_endpoint(),
                store_domain: config.store_domain.clone(),
                access_token: config.storefront_access_token.clone(),
                timeout: config.request_timeout,
                cache,
            }),
        })
    }

    /// Execute a GraphQL operation.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout, transport failure, a non-2xx status, a
    /// GraphQL `errors` array, an unparseable body or a response without data.
    pub async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError> {
        self.post::<Q>(&Q::build_query(variables)).await
    }

    async fn post<Q: GraphQLQuery>(
        &self,
        request_body: &QueryBody<Q::Variables>,
    ) -> Result<Q::ResponseData, ShopifyError> {
        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header(ACCESS_TOKEN_HEADER, self.inner.access_token.expose_secret())
            .header("Content-Type", "application/json")
            .json(request_body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Body as text first for better error diagnostics
        let response_text = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            debug!(
                status = %status,
                body = %truncate(&response_text, 500),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::message(format!(
                "HTTP {status}: {}",
                truncate(&response_text, 200)
            )));
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                debug!(
                    error = %e,
                    body = %truncate(&response_text, 500),
                    "Failed to parse Shopify GraphQL response"
                );
                return Err(ShopifyError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, "GraphQL errors in response");
            return Err(ShopifyError::GraphQL(
                errors.into_iter().map(convert_graphql_error).collect(),
            ));
        }

        response
            .data
            .ok_or_else(|| ShopifyError::message("No data in response"))
    }

    fn transport_error(&self, error: reqwest::Error) -> ShopifyError {
        if error.is_timeout() {
            ShopifyError::Timeout(self.inner.timeout.as_secs())
        } else {
            ShopifyError::Http(error)
        }
    }

    /// Execute an operation, logging and swallowing any error.
    async fn fetch<Q: GraphQLQuery>(&self, variables: Q::Variables) -> Option<Q::ResponseData> {
        let request_body = Q::build_query(variables);
        match self.post::<Q>(&request_body).await {
            Ok(data) => Some(data),
            Err(error) => {
                warn!(
                    operation = request_body.operation_name,
                    error = %error,
                    "Storefront API request failed, using empty result"
                );
                None
            }
        }
    }

    /// Execute an operation, substituting the empty response on failure.
    async fn fetch_or_default<Q>(&self, variables: Q::Variables) -> Q::ResponseData
    where
        Q: GraphQLQuery,
        Q::ResponseData: Default,
    {
        self.fetch::<Q>(variables).await.unwrap_or_default()
    }

    // =========================================================================
    // Cache
    // =========================================================================

    async fn cached(&self, key: &str) -> Option<CacheValue> {
        let entry = self.inner.cache.get(key).await?;
        debug!(key, "Cache hit");
        Some(entry.value)
    }

    async fn store(&self, key: String, tags: &'static [CacheTag], value: CacheValue) {
        self.inner
            .cache
            .insert(key, CacheEntry::new(tags, value))
            .await;
    }

    /// Drop every cached response carrying `tag`.
    #[instrument(skip(self))]
    pub fn revalidate(&self, tag: CacheTag) {
        if let Err(error) = self
            .inner
            .cache
            .invalidate_entries_if(move |_key, entry| entry.has_tag(tag))
        {
            warn!(error = %error, "Tagged invalidation unavailable, clearing cache");
            self.invalidate_all();
        }
    }

    /// Drop every cached response.
    pub fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a product by its handle. Hidden products are reported as missing.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_product(&self, market: Market, handle: &str) -> Option<Product> {
        let cache_key = format!("product:{handle}:{}", market.cache_key());
        if let Some(CacheValue::Product(product)) = self.cached(&cache_key).await {
            return product.map(|p| *p);
        }

        let data = self
            .fetch::<GetProduct>(GetProductVariables {
                handle: handle.to_string(),
                country: market.country(),
            })
            .await?;
        let product = data
            .product
            .and_then(|product| reshape_product(product, true));

        self.store(
            cache_key,
            &[CacheTag::Products],
            CacheValue::Product(product.clone().map(Box::new)),
        )
        .await;
        product
    }

    /// Search products (first 100), hidden products removed.
    #[instrument(skip(self))]
    pub async fn get_products(
        &self,
        market: Market,
        query: Option<&str>,
        sort_key: ProductSortKey,
        reverse: bool,
    ) -> Vec<Product> {
        let cache_key = format!(
            "products:{}:{}:{reverse}:{}",
            query.unwrap_or_default(),
            sort_key.as_str(),
            market.cache_key()
        );
        if let Some(CacheValue::Products(products)) = self.cached(&cache_key).await {
            return products;
        }

        let Some(data) = self
            .fetch::<GetProducts>(GetProductsVariables {
                query: query.map(str::to_string),
                sort_key,
                reverse,
                country: market.country(),
            })
            .await
        else {
            return Vec::new();
        };
        let products = reshape_products(remove_edges_and_nodes(data.products));

        self.store(
            cache_key,
            &[CacheTag::Products],
            CacheValue::Products(products.clone()),
        )
        .await;
        products
    }

    /// Products Shopify recommends for `product_id`, hidden products removed.
    #[instrument(skip(self))]
    pub async fn get_product_recommendations(
        &self,
        market: Market,
        product_id: &ProductGid,
    ) -> Vec<Product> {
        let cache_key = format!("recommendations:{product_id}:{}", market.cache_key());
        if let Some(CacheValue::Products(products)) = self.cached(&cache_key).await {
            return products;
        }

        let Some(data) = self
            .fetch::<GetProductRecommendations>(GetProductRecommendationsVariables {
                product_id: product_id.to_string(),
                country: market.country(),
            })
            .await
        else {
            return Vec::new();
        };
        let products = reshape_products(data.product_recommendations.unwrap_or_default());

        self.store(
            cache_key,
            &[CacheTag::Products],
            CacheValue::Products(products.clone()),
        )
        .await;
        products
    }

    // =========================================================================
    // Collection Methods
    // =========================================================================

    /// Get a collection by its handle.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_collection(&self, handle: &str) -> Option<Collection> {
        let cache_key = format!("collection:{handle}");
        if let Some(CacheValue::Collection(collection)) = self.cached(&cache_key).await {
            return collection.map(|c| *c);
        }

        let data = self
            .fetch::<GetCollection>(HandleVariables {
                handle: handle.to_string(),
            })
            .await?;
        let collection = data.collection.map(reshape_collection);

        self.store(
            cache_key,
            &[CacheTag::Collections],
            CacheValue::Collection(collection.clone().map(Box::new)),
        )
        .await;
        collection
    }

    /// Every visible collection, preceded by the synthetic "All" collection.
    #[instrument(skip(self))]
    pub async fn get_collections(&self) -> Vec<Collection> {
        let cache_key = "collections".to_string();
        if let Some(CacheValue::Collections(collections)) = self.cached(&cache_key).await {
            return collections;
        }

        let Some(data) = self.fetch::<GetCollections>(NoVariables::default()).await else {
            return storefront_collections(Vec::new());
        };
        let collections = storefront_collections(reshape_collections(data.collections));

        self.store(
            cache_key,
            &[CacheTag::Collections],
            CacheValue::Collections(collections.clone()),
        )
        .await;
        collections
    }

    /// Products in a collection (first 100), hidden products removed.
    ///
    /// An unknown collection yields an empty list.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_collection_products(
        &self,
        market: Market,
        handle: &str,
        sort_key: ProductSortKey,
        reverse: bool,
    ) -> Vec<Product> {
        let sort_key = ProductCollectionSortKey::from(sort_key);
        let cache_key = format!(
            "collection-products:{handle}:{}:{reverse}:{}",
            sort_key.as_str(),
            market.cache_key()
        );
        if let Some(CacheValue::Products(products)) = self.cached(&cache_key).await {
            return products;
        }

        let Some(data) = self
            .fetch::<GetCollectionProducts>(GetCollectionProductsVariables {
                handle: handle.to_string(),
                sort_key,
                reverse,
                country: market.country(),
            })
            .await
        else {
            return Vec::new();
        };

        let products = match data.collection {
            Some(collection) => reshape_products(remove_edges_and_nodes(collection.products)),
            None => {
                debug!("No collection found");
                Vec::new()
            }
        };

        self.store(
            cache_key,
            &[CacheTag::Collections, CacheTag::Products],
            CacheValue::Products(products.clone()),
        )
        .await;
        products
    }

    // =========================================================================
    // Content Methods
    // =========================================================================

    /// Navigation menu items with storefront-relative paths.
    #[instrument(skip(self))]
    pub async fn get_menu(&self, handle: &str) -> Vec<MenuItem> {
        let cache_key = format!("menu:{handle}");
        if let Some(CacheValue::Menu(items)) = self.cached(&cache_key).await {
            return items;
        }

        let Some(data) = self
            .fetch::<GetMenu>(HandleVariables {
                handle: handle.to_string(),
            })
            .await
        else {
            return Vec::new();
        };
        let items = reshape_menu(data.menu, &self.inner.store_domain);

        self.store(
            cache_key,
            &[CacheTag::Collections],
            CacheValue::Menu(items.clone()),
        )
        .await;
        items
    }

    /// A CMS page by handle.
    #[instrument(skip(self))]
    pub async fn get_page(&self, handle: &str) -> Option<Page> {
        self.fetch_or_default::<GetPage>(HandleVariables {
            handle: handle.to_string(),
        })
        .await
        .page_by_handle
        .map(reshape_page)
    }

    /// Every CMS page.
    #[instrument(skip(self))]
    pub async fn get_pages(&self) -> Vec<Page> {
        let data = self.fetch_or_default::<GetPages>(NoVariables::default()).await;
        remove_edges_and_nodes(data.pages)
            .into_iter()
            .map(reshape_page)
            .collect()
    }

    /// Newest `first` articles of a blog.
    #[instrument(skip(self))]
    pub async fn get_blog_articles(&self, blog_handle: &str, first: i64) -> Vec<Article> {
        let data = self
            .fetch_or_default::<GetBlogArticles>(GetBlogArticlesVariables {
                handle: blog_handle.to_string(),
                first,
            })
            .await;
        data.blog
            .map(|blog| {
                remove_edges_and_nodes(blog.articles)
                    .into_iter()
                    .map(reshape_article)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// One article of a blog.
    #[instrument(skip(self))]
    pub async fn get_article(&self, blog_handle: &str, article_handle: &str) -> Option<Article> {
        self.fetch_or_default::<GetArticle>(GetArticleVariables {
            blog_handle: blog_handle.to_string(),
            article_handle: article_handle.to_string(),
        })
        .await
        .blog
        .and_then(|blog| blog.article_by_handle)
        .map(reshape_article)
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Get an existing cart. Unknown or expired carts yield `None`.
    #[instrument(skip(self))]
    pub async fn get_cart(&self, cart_id: &str) -> Option<Cart> {
        self.fetch_or_default::<GetCart>(CartIdVariables {
            cart_id: cart_id.to_string(),
        })
        .await
        .cart
        .map(reshape_cart)
    }

    /// Look up a cart, keeping an unknown cart apart from an unreachable
    /// store.
    ///
    /// `Ok(None)` means Shopify answered and no longer knows the cart.
    ///
    /// # Errors
    ///
    /// Returns the upstream error when Shopify could not answer.
    #[instrument(skip(self))]
    pub async fn find_cart(&self, cart_id: &str) -> Result<Option<Cart>, ShopifyError> {
        let data = self
            .execute::<GetCart>(CartIdVariables {
                cart_id: cart_id.to_string(),
            })
            .await?;
        Ok(data.cart.map(reshape_cart))
    }

    /// Create a cart priced in the shopper's market.
    #[instrument(skip(self, lines))]
    pub async fn create_cart(&self, market: Market, lines: Vec<CartLineInput>) -> Option<Cart> {
        let data = self
            .fetch_or_default::<CreateCart>(CreateCartVariables {
                line_items: lines,
                buyer_identity: market
                    .country()
                    .map(|country_code| BuyerIdentity { country_code }),
            })
            .await;
        cart_from_payload("createCart", data.cart_create)
    }

    /// Add lines to a cart.
    #[instrument(skip(self, lines))]
    pub async fn add_to_cart(&self, cart_id: &str, lines: Vec<CartLineInput>) -> Option<Cart> {
        let data = self
            .fetch_or_default::<AddToCart>(AddToCartVariables {
                cart_id: cart_id.to_string(),
                lines,
            })
            .await;
        cart_from_payload("addToCart", data.cart_lines_add)
    }

    /// Remove lines from a cart.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(&self, cart_id: &str, line_ids: Vec<String>) -> Option<Cart> {
        let data = self
            .fetch_or_default::<RemoveFromCart>(RemoveFromCartVariables {
                cart_id: cart_id.to_string(),
                line_ids,
            })
            .await;
        cart_from_payload("removeFromCart", data.cart_lines_remove)
    }

    /// Set line quantities.
    #[instrument(skip(self, lines))]
    pub async fn update_cart(
        &self,
        cart_id: &str,
        lines: Vec<CartLineUpdateInput>,
    ) -> Option<Cart> {
        let data = self
            .fetch_or_default::<EditCartItems>(EditCartItemsVariables {
                cart_id: cart_id.to_string(),
                lines,
            })
            .await;
        cart_from_payload("editCartItems", data.cart_lines_update)
    }

    // =========================================================================
    // Customer Methods
    // =========================================================================

    /// Register a customer.
    ///
    /// # Errors
    ///
    /// Returns Shopify's validation errors, or a single general error when
    /// the store could not be reached.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_customer(
        &self,
        input: CustomerCreateInput,
    ) -> Result<(), Vec<CustomerUserError>> {
        let payload = self
            .fetch_or_default::<CustomerCreate>(CustomerCreateVariables { input })
            .await
            .customer_create
            .ok_or_else(|| vec![CustomerUserError::general(CUSTOMER_UNAVAILABLE)])?;

        if !payload.customer_user_errors.is_empty() {
            return Err(reshape_customer_user_errors(payload.customer_user_errors));
        }
        match payload.customer {
            Some(_) => Ok(()),
            None => Err(vec![CustomerUserError::general(CUSTOMER_UNAVAILABLE)]),
        }
    }

    /// Log a customer in.
    ///
    /// # Errors
    ///
    /// Returns Shopify's validation errors (e.g. unidentified customer), or a
    /// single general error when the store could not be reached.
    #[instrument(skip(self, password))]
    pub async fn create_customer_access_token(
        &self,
        email: &str,
        password: &str,
    ) -> Result<CustomerAccessToken, Vec<CustomerUserError>> {
        let payload = self
            .fetch_or_default::<CustomerAccessTokenCreate>(CustomerAccessTokenCreateVariables {
                input: CustomerCredentials {
                    email: email.to_string(),
                    password: password.to_string(),
                },
            })
            .await
            .customer_access_token_create
            .ok_or_else(|| vec![CustomerUserError::general(CUSTOMER_UNAVAILABLE)])?;

        if !payload.customer_user_errors.is_empty() {
            return Err(reshape_customer_user_errors(payload.customer_user_errors));
        }
        payload
            .customer_access_token
            .map(|token| CustomerAccessToken {
                access_token: token.access_token,
                expires_at: token.expires_at,
            })
            .ok_or_else(|| vec![CustomerUserError::general(CUSTOMER_UNAVAILABLE)])
    }

    /// Revoke a customer access token.
    #[instrument(skip_all)]
    pub async fn delete_customer_access_token(&self, token: &str) {
        let data = self
            .fetch_or_default::<CustomerAccessTokenDelete>(CustomerTokenVariables {
                customer_access_token: token.to_string(),
            })
            .await;
        if let Some(payload) = data.customer_access_token_delete
            && !payload.user_errors.is_empty()
        {
            warn!(
                errors = %join_messages(payload.user_errors.iter().map(|e| e.message.as_str())),
                "Customer access token was not deleted"
            );
        }
    }

    /// The customer owning `token`. Expired tokens yield `None`.
    #[instrument(skip_all)]
    pub async fn get_customer(&self, token: &str) -> Option<Customer> {
        self.fetch_or_default::<GetCustomer>(CustomerTokenVariables {
            customer_access_token: token.to_string(),
        })
        .await
        .customer
        .map(reshape_customer)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn cart_from_payload(operation: &'static str, payload: Option<CartPayload>) -> Option<Cart> {
    let payload = payload?;
    if !payload.user_errors.is_empty() {
        warn!(
            operation,
            errors = %join_messages(payload.user_errors.iter().map(|e| e.message.as_str())),
            "Cart mutation returned user errors"
        );
    }
    payload.cart.map(reshape_cart)
}

fn join_messages<'a>(messages: impl Iterator<Item = &'a str>) -> String {
    messages.collect::<Vec<_>>().join("; ")
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn convert_graphql_error(e: graphql_client::Error) -> GraphQLError {
    GraphQLError {
        message: e.message,
        locations: e.locations.map_or_else(Vec::new, |locs| {
            locs.into_iter()
                .map(|l| GraphQLErrorLocation {
                    line: i64::from(l.line),
                    column: i64::from(l.column),
                })
                .collect()
        }),
        path: e.path.map_or_else(Vec::new, |p| {
            p.into_iter()
                .map(|fragment| match fragment {
                    graphql_client::PathFragment::Key(s) => serde_json::Value::String(s),
                    graphql_client::PathFragment::Index(i) => serde_json::Value::Number(i.into()),
                })
                .collect()
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("héllo wörld", 5), "héllo");
        assert_eq!(truncate("ok", 500), "ok");
    }

    #[test]
    fn test_cart_payload_without_cart_is_none() {
        let payload = CartPayload {
            cart: None,
            user_errors: vec![schema::RawUserError {
                field: Some(vec!["lines".to_string()]),
                message: "Merchandise does not exist".to_string(),
            }],
        };
        assert!(cart_from_payload("addToCart", Some(payload)).is_none());
        assert!(cart_from_payload("addToCart", None).is_none());
    }

    #[test]
    fn test_convert_graphql_error() {
        let error: graphql_client::Error = serde_json::from_value(serde_json::json!({
            "message": "Throttled",
            "locations": [{ "line": 2, "column": 3 }],
            "path": ["products", 0]
        }))
        .unwrap();
        let converted = convert_graphql_error(error);
        assert_eq!(converted.message, "Throttled");
        assert_eq!(converted.locations[0].line, 2);
        assert_eq!(converted.path.len(), 2);
    }
}
