//! Integration tests for catalog pages: search, collections and products.
//!
//! Upstream failures must never break a page: the storefront renders an
//! empty result instead.

use std::time::{Duration, Instant};

use acme_store_integration_tests::{Reply, TestContext, connection, location, product, text};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await;
    let (status, body) = ctx.get_text("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
    assert!(ctx.shopify.requests().is_empty(), "health must not call Shopify");
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_lists_visible_products_only() {
    let ctx = TestContext::new().await;
    ctx.shopify.data(
        "getProducts",
        json!({
            "products": connection(vec![
                product("acme-tee", "Acme Tee", &["summer"]),
                product("secret-tee", "Secret Tee", &["nextjs-frontend-hidden"]),
                Value::Null,
            ])
        }),
    );

    let (status, body) = ctx.get_text("/search?q=tee").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Acme Tee"));
    assert!(body.contains("/product/acme-tee"));
    assert!(!body.contains("Secret Tee"));
    assert!(body.contains("Showing 1 result for"));
    assert!(body.contains("$20.00 USD"));

    let requests = ctx.shopify.requests_for("getProducts");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].variables["query"], "tee");
    assert_eq!(requests[0].variables["sortKey"], "RELEVANCE");
    assert_eq!(
        requests[0].access_token.as_deref(),
        Some(acme_store_integration_tests::STOREFRONT_TOKEN)
    );
}

#[tokio::test]
async fn test_search_sort_is_forwarded() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx.get_text("/search?sort=price-desc").await;
    assert_eq!(status, StatusCode::OK);

    let requests = ctx.shopify.requests_for("getProducts");
    assert_eq!(requests[0].variables["sortKey"], "PRICE");
    assert_eq!(requests[0].variables["reverse"], true);
}

#[tokio::test]
async fn test_search_without_matches() {
    let ctx = TestContext::new().await;
    ctx.shopify
        .data("getProducts", json!({ "products": { "edges": [] } }));

    let (status, body) = ctx.get_text("/search?q=zzz").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("There are no products that match"));
}

#[tokio::test]
async fn test_search_without_query_or_products() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get_text("/search").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No products found in this collection."));
}

#[tokio::test]
async fn test_search_graphql_errors_render_empty_results() {
    let ctx = TestContext::new().await;
    ctx.shopify.reply(
        "getProducts",
        Reply::Body(json!({ "errors": [{ "message": "Throttled" }] })),
    );

    let (status, body) = ctx.get_text("/search?q=tee").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("There are no products that match"));
}

#[tokio::test]
async fn test_search_server_error_renders_empty_results() {
    let ctx = TestContext::new().await;
    ctx.shopify.reply("getProducts", Reply::Status(502));

    let (status, body) = ctx.get_text("/search?q=tee").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("There are no products that match"));
}

#[tokio::test]
async fn test_search_timeout_renders_empty_results() {
    let ctx = TestContext::with_timeout(Duration::from_millis(300)).await;
    ctx.shopify.reply(
        "getProducts",
        Reply::Delayed(
            Duration::from_secs(3),
            json!({ "products": connection(vec![product("acme-tee", "Acme Tee", &[])]) }),
        ),
    );

    let started = Instant::now();
    let (status, body) = ctx.get_text("/search?q=tee").await;

    assert_eq!(status, StatusCode::OK);
    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(body.contains("There are no products that match"));
    assert!(!body.contains("Acme Tee"));
}

#[tokio::test]
async fn test_failed_reads_are_not_cached() {
    let ctx = TestContext::new().await;
    ctx.shopify.reply("getProducts", Reply::Status(500));
    let (_, body) = ctx.get_text("/search?q=tee").await;
    assert!(!body.contains("Acme Tee"));

    ctx.shopify.data(
        "getProducts",
        json!({ "products": connection(vec![product("acme-tee", "Acme Tee", &[])]) }),
    );
    let (_, body) = ctx.get_text("/search?q=tee").await;
    assert!(body.contains("Acme Tee"));
}

// =============================================================================
// Collections
// =============================================================================

#[tokio::test]
async fn test_collection_page() {
    let ctx = TestContext::new().await;
    ctx.shopify.data(
        "getCollection",
        json!({
            "collection": {
                "handle": "shirts",
                "title": "Shirts",
                "description": "All our shirts",
                "seo": { "title": null, "description": null },
                "updatedAt": "2024-05-01T10:00:00Z"
            }
        }),
    );
    ctx.shopify.data(
        "getCollectionProducts",
        json!({
            "collection": {
                "products": connection(vec![
                    product("acme-tee", "Acme Tee", &[]),
                    product("secret-tee", "Secret Tee", &["nextjs-frontend-hidden"]),
                ])
            }
        }),
    );

    let (status, body) = ctx.get_text("/search/shirts").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1>Shirts</h1>"));
    assert!(body.contains("Acme Tee"));
    assert!(!body.contains("Secret Tee"));
    assert!(body.contains("<title>Shirts | Acme Store</title>"));

    let requests = ctx.shopify.requests_for("getCollectionProducts");
    assert_eq!(requests[0].variables["handle"], "shirts");
    assert_eq!(requests[0].variables["sortKey"], "RELEVANCE");
}

#[tokio::test]
async fn test_unknown_collection_lists_nothing() {
    let ctx = TestContext::new().await;
    ctx.shopify
        .data("getCollectionProducts", json!({ "collection": null }));

    let (status, body) = ctx.get_text("/search/missing").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No products found in this collection."));
}

#[tokio::test]
async fn test_collection_sidebar_starts_with_all() {
    let ctx = TestContext::new().await;
    ctx.shopify.data(
        "getCollections",
        json!({
            "collections": connection(vec![
                json!({ "handle": "shirts", "title": "Shirts", "description": "", "updatedAt": "" }),
                json!({ "handle": "hidden-homepage-carousel", "title": "Carousel", "description": "", "updatedAt": "" }),
            ])
        }),
    );

    let (_, body) = ctx.get_text("/search").await;

    let all = body.find(">All<").expect("All collection link");
    let shirts = body.find(">Shirts<").expect("Shirts collection link");
    assert!(all < shirts);
    assert!(body.contains("href=\"/search/shirts\""));
    assert!(!body.contains(">Carousel<"));
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_product_page() {
    let ctx = TestContext::new().await;
    ctx.shopify.data(
        "getProduct",
        json!({ "product": product("acme-tee", "Acme Tee", &[]) }),
    );
    ctx.shopify.data(
        "getProductRecommendations",
        json!({
            "productRecommendations": [
                product("acme-mug", "Acme Mug", &[]),
                product("secret-mug", "Secret Mug", &["nextjs-frontend-hidden"]),
            ]
        }),
    );

    let response = ctx.get("/product/acme-tee").await;
    let csp = response
        .headers()
        .get("content-security-policy")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .expect("CSP header");
    let (status, body) = text(response).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1>Acme Tee</h1>"));
    assert!(body.contains("$20.00 USD"));
    assert!(body.contains("Add to cart"));
    assert!(body.contains("name=\"variant_id\" value=\"gid://shopify/ProductVariant/11\""));
    assert!(body.contains("application/ld+json"));
    assert!(body.contains("Acme Mug"));
    assert!(!body.contains("Secret Mug"));

    // The JSON-LD script carries the nonce allowed by the policy
    let nonce = csp
        .split("'nonce-")
        .nth(1)
        .and_then(|rest| rest.split('\'').next())
        .expect("nonce in CSP");
    assert!(body.contains(&format!("nonce=\"{nonce}\"")));
}

#[tokio::test]
async fn test_product_page_is_cached() {
    let ctx = TestContext::new().await;
    ctx.shopify.data(
        "getProduct",
        json!({ "product": product("acme-tee", "Acme Tee", &[]) }),
    );

    ctx.get_text("/product/acme-tee").await;
    ctx.get_text("/product/acme-tee").await;

    assert_eq!(ctx.shopify.count("getProduct"), 1);
}

#[tokio::test]
async fn test_hidden_product_is_not_found() {
    let ctx = TestContext::new().await;
    ctx.shopify.data(
        "getProduct",
        json!({ "product": product("secret-tee", "Secret Tee", &["nextjs-frontend-hidden"]) }),
    );

    let (status, _) = ctx.get_text("/product/secret-tee").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let ctx = TestContext::new().await;
    ctx.shopify.data("getProduct", json!({ "product": null }));

    let (status, _) = ctx.get_text("/product/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_currency_choice_sets_context_country() {
    let ctx = TestContext::new().await;
    ctx.shopify.data(
        "getProduct",
        json!({ "product": product("acme-tee", "Acme Tee", &[]) }),
    );

    let response = ctx
        .post_form("/currency", &[("currency", "EUR"), ("redirect_to", "/product/acme-tee")])
        .await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response).as_deref(), Some("/product/acme-tee"));

    ctx.get_text("/product/acme-tee").await;

    let requests = ctx.shopify.requests_for("getProduct");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].variables["country"], "DE");
}

#[tokio::test]
async fn test_currency_rejects_unknown_code_and_foreign_redirect() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_form("/currency", &[("currency", "XYZ"), ("redirect_to", "/")])
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .post_form(
            "/currency",
            &[("currency", "GBP"), ("redirect_to", "https://evil.example/")],
        )
        .await;
    assert_eq!(location(&response).as_deref(), Some("/"));
}
