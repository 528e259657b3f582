//! Integration tests for the Storefront API gateway, driven directly and
//! through the router without a network listener.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use acme_store_core::CurrencyCode;
use acme_store_integration_tests::{
    DEFAULT_TIMEOUT, FakeShopify, Reply, STOREFRONT_TOKEN, cart, cart_payload, connection,
    product, shopify_config, test_config,
};
use acme_store_storefront::{
    app,
    shopify::{
        CacheTag, CartLineInput, Market, Money, ProductSortKey, ShopifyError, StorefrontClient,
    },
    state::AppState,
};
use axum::{body::Body, extract::ConnectInfo, http::Request};
use graphql_client::{GraphQLQuery, QueryBody};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn client(timeout: Duration) -> (FakeShopify, StorefrontClient) {
    let shopify = FakeShopify::start().await;
    let client = StorefrontClient::new(&shopify_config(&shopify.url, timeout))
        .expect("Failed to build Storefront client");
    (shopify, client)
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn test_products_skip_null_nodes_and_hidden_products() {
    let (shopify, client) = client(DEFAULT_TIMEOUT).await;
    shopify.data(
        "getProducts",
        json!({
            "products": connection(vec![
                Value::Null,
                product("acme-tee", "Acme Tee", &[]),
                product("secret-tee", "Secret Tee", &["sale", "nextjs-frontend-hidden"]),
                product("acme-mug", "Acme Mug", &[]),
            ])
        }),
    );

    let products = client
        .get_products(Market::default(), Some("acme"), ProductSortKey::Relevance, false)
        .await;

    let handles: Vec<_> = products.iter().map(|p| p.handle.as_str()).collect();
    assert_eq!(handles, ["acme-tee", "acme-mug"]);
    assert_eq!(products[0].variants.len(), 1);
    assert_eq!(products[0].images.len(), 1);
    assert_eq!(products[0].images[0].alt_text, "Acme Tee - acme-tee");
}

#[tokio::test]
async fn test_market_is_sent_as_context_country() {
    let (shopify, client) = client(DEFAULT_TIMEOUT).await;

    client
        .get_products(
            Market::new(CurrencyCode::GBP),
            None,
            ProductSortKey::BestSelling,
            false,
        )
        .await;
    client
        .get_products(Market::default(), None, ProductSortKey::BestSelling, false)
        .await;

    let requests = shopify.requests_for("getProducts");
    assert_eq!(requests.len(), 2, "markets are cached separately");
    assert_eq!(requests[0].variables["country"], "GB");
    assert_eq!(requests[1].variables["country"], Value::Null);
}

#[tokio::test]
async fn test_cart_tax_defaults_to_zero() {
    let (shopify, client) = client(DEFAULT_TIMEOUT).await;
    shopify.data("getCart", json!({ "cart": cart(2, None) }));

    let cart = client.get_cart("gid://shopify/Cart/c1?key=abc").await.expect("cart");

    assert_eq!(cart.cost.total_tax_amount, Money::zero("USD"));
    assert_eq!(cart.cost.total_amount.amount, "40.0");
    assert_eq!(cart.total_quantity, 2);
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.lines[0].merchandise.product.handle, "acme-tee");
}

#[tokio::test]
async fn test_unknown_cart_is_none() {
    let (shopify, client) = client(DEFAULT_TIMEOUT).await;
    shopify.data("getCart", json!({ "cart": null }));

    assert!(client.get_cart("gid://shopify/Cart/gone").await.is_none());
}

#[tokio::test]
async fn test_find_cart_separates_unknown_from_unreachable() {
    let (shopify, client) = client(DEFAULT_TIMEOUT).await;

    shopify.reply("getCart", Reply::Status(503));
    assert!(client.find_cart("gid://shopify/Cart/c1").await.is_err());

    shopify.data("getCart", json!({ "cart": null }));
    assert!(client.find_cart("gid://shopify/Cart/c1").await.expect("answered").is_none());

    shopify.data("getCart", json!({ "cart": cart(1, None) }));
    let cart = client.find_cart("gid://shopify/Cart/c1").await.expect("answered");
    assert_eq!(cart.map(|c| c.total_quantity), Some(1));
}

#[tokio::test]
async fn test_collections_fall_back_to_all() {
    let (shopify, client) = client(DEFAULT_TIMEOUT).await;
    shopify.reply(
        "getCollections",
        Reply::Body(json!({ "errors": [{ "message": "Internal error" }] })),
    );

    let collections = client.get_collections().await;

    assert_eq!(collections.len(), 1);
    assert_eq!(collections[0].title, "All");
    assert_eq!(collections[0].path, "/search");
}

#[tokio::test]
async fn test_reads_time_out() {
    let (shopify, client) = client(Duration::from_millis(300)).await;
    shopify.reply(
        "getProduct",
        Reply::Delayed(
            Duration::from_secs(3),
            json!({ "product": product("acme-tee", "Acme Tee", &[]) }),
        ),
    );

    let started = Instant::now();
    let product = client.get_product(Market::default(), "acme-tee").await;

    assert!(product.is_none());
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_missing_data_is_empty() {
    let (shopify, client) = client(DEFAULT_TIMEOUT).await;
    shopify.reply("getPages", Reply::Body(json!({})));

    assert!(client.get_pages().await.is_empty());
}

/// An operation the gateway does not ship with.
struct GetShop;

#[derive(Debug, Deserialize)]
struct ShopData {
    shop: Shop,
}

#[derive(Debug, Deserialize)]
struct Shop {
    name: String,
}

impl GraphQLQuery for GetShop {
    type Variables = Value;
    type ResponseData = ShopData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: "query getShop { shop { name } }",
            operation_name: "getShop",
        }
    }
}

#[tokio::test]
async fn test_execute_custom_operation() {
    let (shopify, client) = client(DEFAULT_TIMEOUT).await;
    shopify.data("getShop", json!({ "shop": { "name": "Acme" } }));

    let data = client.execute::<GetShop>(json!({})).await.expect("shop");

    assert_eq!(data.shop.name, "Acme");
    assert_eq!(
        shopify.requests_for("getShop")[0].access_token.as_deref(),
        Some(STOREFRONT_TOKEN)
    );
}

#[tokio::test]
async fn test_execute_maps_upstream_failures() {
    let (shopify, client) = client(DEFAULT_TIMEOUT).await;

    shopify.reply("getShop", Reply::Status(429));
    let error = client.execute::<GetShop>(json!({})).await.unwrap_err();
    assert!(matches!(error, ShopifyError::RateLimited(_)));

    shopify.reply(
        "getShop",
        Reply::Body(json!({ "errors": [{ "message": "Throttled" }] })),
    );
    let error = client.execute::<GetShop>(json!({})).await.unwrap_err();
    assert_eq!(error.to_string(), "GraphQL errors: Throttled");

    shopify.reply("getShop", Reply::Body(json!({ "data": null })));
    let error = client.execute::<GetShop>(json!({})).await.unwrap_err();
    assert_eq!(error.to_string(), "GraphQL errors: No data in response");
}

// =============================================================================
// Mutations
// =============================================================================

#[tokio::test]
async fn test_create_cart_sends_buyer_identity() {
    let (shopify, client) = client(DEFAULT_TIMEOUT).await;
    shopify.data("createCart", json!({ "cartCreate": cart_payload(cart(1, Some("1.6"))) }));

    let cart = client
        .create_cart(
            Market::new(CurrencyCode::CAD),
            vec![CartLineInput {
                merchandise_id: "gid://shopify/ProductVariant/11".to_string(),
                quantity: 1,
            }],
        )
        .await
        .expect("cart");

    assert_eq!(cart.cost.total_tax_amount.amount, "1.6");
    let requests = shopify.requests_for("createCart");
    assert_eq!(requests[0].variables["buyerIdentity"], json!({ "countryCode": "CA" }));
}

#[tokio::test]
async fn test_cart_user_errors_without_cart_are_none() {
    let (shopify, client) = client(DEFAULT_TIMEOUT).await;
    shopify.data(
        "addToCart",
        json!({
            "cartLinesAdd": {
                "cart": null,
                "userErrors": [{ "field": ["lines"], "message": "Merchandise does not exist" }]
            }
        }),
    );

    let cart = client
        .add_to_cart(
            "gid://shopify/Cart/c1",
            vec![CartLineInput {
                merchandise_id: "gid://shopify/ProductVariant/999".to_string(),
                quantity: 1,
            }],
        )
        .await;

    assert!(cart.is_none());
}

#[tokio::test]
async fn test_customer_login_when_store_unreachable() {
    let (shopify, client) = client(DEFAULT_TIMEOUT).await;
    shopify.reply("customerAccessTokenCreate", Reply::Status(503));

    let errors = client
        .create_customer_access_token("ada@example.com", "correct-horse")
        .await
        .expect_err("login must fail");

    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("couldn't reach the store"));
}

// =============================================================================
// Cache
// =============================================================================

#[tokio::test]
async fn test_revalidation_is_scoped_by_tag() {
    let (shopify, client) = client(DEFAULT_TIMEOUT).await;
    shopify.data(
        "getProducts",
        json!({ "products": connection(vec![product("acme-tee", "Acme Tee", &[])]) }),
    );
    let fetch = || client.get_products(Market::default(), None, ProductSortKey::Relevance, false);

    fetch().await;
    fetch().await;
    assert_eq!(shopify.count("getProducts"), 1);

    client.revalidate(CacheTag::Collections);
    fetch().await;
    assert_eq!(shopify.count("getProducts"), 1);

    client.revalidate(CacheTag::Products);
    fetch().await;
    assert_eq!(shopify.count("getProducts"), 2);

    client.invalidate_all();
    fetch().await;
    assert_eq!(shopify.count("getProducts"), 3);
}

// =============================================================================
// Router (no listener)
// =============================================================================

async fn router() -> (FakeShopify, axum::Router) {
    router_with_proxy(false).await
}

async fn router_with_proxy(trusted_proxy: bool) -> (FakeShopify, axum::Router) {
    let shopify = FakeShopify::start().await;
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, 3000));
    let mut config = test_config(addr, "http://localhost:3000", &shopify.url, DEFAULT_TIMEOUT);
    config.trusted_proxy = trusted_proxy;
    let state = AppState::new(config).expect("Failed to build application state");
    (shopify, app(state))
}

/// POST a log-in form from `peer`, claiming to be `forwarded_for`.
async fn login_attempt(
    app: &axum::Router,
    peer: Option<SocketAddr>,
    forwarded_for: &str,
) -> StatusCode {
    let mut request = Request::post("/account/login")
        .header("content-type", "application/x-www-form-urlencoded")
        .header("x-forwarded-for", forwarded_for)
        .body(Body::from("email=not-an-email&password=x"))
        .expect("request");
    if let Some(peer) = peer {
        request.extensions_mut().insert(ConnectInfo(peer));
    }
    app.clone().oneshot(request).await.expect("response").status()
}

#[tokio::test]
async fn test_router_health() {
    let (_shopify, app) = router().await;

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn test_router_canonical_url_uses_base_url() {
    let (_shopify, app) = router().await;

    let response = app
        .oneshot(Request::get("/search").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let html = String::from_utf8_lossy(&body);
    assert!(html.contains("<link rel=\"canonical\" href=\"http://localhost:3000/search\">"));
}

#[tokio::test]
async fn test_router_login_burst_is_rate_limited() {
    let (_shopify, app) = router().await;
    let peer = SocketAddr::from(([203, 0, 113, 7], 51000));

    let mut statuses = Vec::new();
    for _ in 0..7 {
        statuses.push(login_attempt(&app, Some(peer), "203.0.113.7").await);
    }

    assert_eq!(&statuses[..5], [StatusCode::OK; 5]);
    assert_eq!(&statuses[5..], [StatusCode::TOO_MANY_REQUESTS; 2]);
}

#[tokio::test]
async fn test_router_rotating_forwarded_for_does_not_reset_limit() {
    let (_shopify, app) = router().await;
    let peer = SocketAddr::from(([203, 0, 113, 7], 51000));

    let mut statuses = Vec::new();
    for hop in 1..=7 {
        statuses.push(login_attempt(&app, Some(peer), &format!("198.51.100.{hop}")).await);
    }

    assert_eq!(&statuses[..5], [StatusCode::OK; 5]);
    assert_eq!(&statuses[5..], [StatusCode::TOO_MANY_REQUESTS; 2]);
}

#[tokio::test]
async fn test_router_trusted_proxy_keys_on_forwarded_for() {
    let (_shopify, app) = router_with_proxy(true).await;

    for hop in 1..=7 {
        let status = login_attempt(&app, None, &format!("198.51.100.{hop}")).await;
        assert_eq!(status, StatusCode::OK);
    }

    let mut statuses = Vec::new();
    for _ in 0..6 {
        statuses.push(login_attempt(&app, None, "203.0.113.9").await);
    }
    assert_eq!(statuses[5], StatusCode::TOO_MANY_REQUESTS);
}
