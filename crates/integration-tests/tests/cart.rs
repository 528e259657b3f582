//! Integration tests for the cart: HTMX mutations, the polled badge and
//! checkout.

use acme_store_integration_tests::{
    Reply, TestContext, cart, cart_payload, location, text,
};
use reqwest::StatusCode;
use serde_json::json;

const VARIANT_ID: &str = "gid://shopify/ProductVariant/11";
const LINE_ID: &str = "gid://shopify/CartLine/1";

/// Add one unit to a fresh cart so the session remembers a cart ID.
async fn add_first_item(ctx: &TestContext) {
    ctx.shopify
        .data("createCart", json!({ "cartCreate": cart_payload(cart(1, None)) }));
    let response = ctx
        .htmx_post_form("/cart/add", &[("variant_id", VARIANT_ID)])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cart_count_without_cart() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get_text("/cart/count").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.trim(), "");
    assert_eq!(ctx.shopify.count("getCart"), 0);
}

#[tokio::test]
async fn test_add_to_cart_creates_cart() {
    let ctx = TestContext::new().await;
    ctx.shopify
        .data("createCart", json!({ "cartCreate": cart_payload(cart(1, None)) }));

    let response = ctx
        .htmx_post_form("/cart/add", &[("variant_id", VARIANT_ID)])
        .await;

    let trigger = response
        .headers()
        .get("hx-trigger")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let (status, body) = text(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(trigger.as_deref(), Some("cart-updated"));
    assert!(body.contains("Added to cart"));

    let requests = ctx.shopify.requests_for("createCart");
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].variables["lineItems"],
        json!([{ "merchandiseId": VARIANT_ID, "quantity": 1 }])
    );

    // The badge now reads the remembered cart
    ctx.shopify.data("getCart", json!({ "cart": cart(3, None) }));
    let (_, badge) = ctx.get_text("/cart/count").await;
    assert_eq!(badge.trim(), "3");
    assert_eq!(
        ctx.shopify.requests_for("getCart")[0].variables["cartId"],
        "gid://shopify/Cart/c1?key=abc"
    );
}

#[tokio::test]
async fn test_second_add_reuses_cart() {
    let ctx = TestContext::new().await;
    add_first_item(&ctx).await;
    ctx.shopify
        .data("addToCart", json!({ "cartLinesAdd": cart_payload(cart(2, None)) }));

    let response = ctx
        .htmx_post_form("/cart/add", &[("variant_id", VARIANT_ID), ("quantity", "1")])
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(ctx.shopify.count("createCart"), 1);
    let requests = ctx.shopify.requests_for("addToCart");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].variables["cartId"], "gid://shopify/Cart/c1?key=abc");
}

#[tokio::test]
async fn test_add_to_cart_without_variant() {
    let ctx = TestContext::new().await;

    let (status, body) = text(ctx.htmx_post_form("/cart/add", &[]).await).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Missing product variant ID"));

    let (_, body) = text(
        ctx.htmx_post_form("/cart/add", &[("variant_id", "gid://shopify/Product/1")])
            .await,
    )
    .await;
    assert!(body.contains("Missing product variant ID"));

    assert_eq!(ctx.shopify.count("createCart"), 0);
}

#[tokio::test]
async fn test_add_to_cart_upstream_failure() {
    let ctx = TestContext::new().await;
    ctx.shopify.reply("createCart", Reply::Status(500));

    let (status, body) = text(
        ctx.htmx_post_form("/cart/add", &[("variant_id", VARIANT_ID)])
            .await,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Error adding item to cart"));
}

#[tokio::test]
async fn test_add_without_htmx_redirects_to_cart() {
    let ctx = TestContext::new().await;
    ctx.shopify
        .data("createCart", json!({ "cartCreate": cart_payload(cart(1, None)) }));

    let response = ctx
        .post_form("/cart/add", &[("variant_id", VARIANT_ID)])
        .await;

    assert!(response.status().is_redirection());
    assert_eq!(location(&response).as_deref(), Some("/cart"));
}

#[tokio::test]
async fn test_cart_page_defaults_missing_tax_to_zero() {
    let ctx = TestContext::new().await;
    add_first_item(&ctx).await;
    ctx.shopify.data("getCart", json!({ "cart": cart(2, None) }));

    let (status, body) = ctx.get_text("/cart").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Acme Tee"));
    assert!(body.contains("$40.00 USD"));
    assert!(body.contains("$0.00 USD"));
    assert!(body.contains("Proceed to Checkout"));
}

#[tokio::test]
async fn test_empty_cart_page() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get_text("/cart").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Your cart is empty."));
}

#[tokio::test]
async fn test_update_quantity() {
    let ctx = TestContext::new().await;
    add_first_item(&ctx).await;
    ctx.shopify.data(
        "editCartItems",
        json!({ "cartLinesUpdate": cart_payload(cart(2, Some("3.2"))) }),
    );

    let response = ctx
        .htmx_post_form(
            "/cart/update",
            &[("line_id", LINE_ID), ("variant_id", VARIANT_ID), ("quantity", "2")],
        )
        .await;
    let (status, body) = text(response).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("id=\"cart-items\""));
    assert!(body.contains("$3.20 USD"));

    let requests = ctx.shopify.requests_for("editCartItems");
    assert_eq!(
        requests[0].variables["lines"],
        json!([{ "id": LINE_ID, "merchandiseId": VARIANT_ID, "quantity": 2 }])
    );
}

#[tokio::test]
async fn test_update_to_zero_removes_line() {
    let ctx = TestContext::new().await;
    add_first_item(&ctx).await;
    ctx.shopify.data(
        "removeFromCart",
        json!({ "cartLinesRemove": cart_payload(cart(0, None)) }),
    );

    let (status, body) = text(
        ctx.htmx_post_form(
            "/cart/update",
            &[("line_id", LINE_ID), ("variant_id", VARIANT_ID), ("quantity", "0")],
        )
        .await,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Your cart is empty."));
    assert_eq!(ctx.shopify.count("editCartItems"), 0);
    assert_eq!(
        ctx.shopify.requests_for("removeFromCart")[0].variables["lineIds"],
        json!([LINE_ID])
    );
}

#[tokio::test]
async fn test_remove_failure_keeps_current_cart() {
    let ctx = TestContext::new().await;
    add_first_item(&ctx).await;
    ctx.shopify.reply("removeFromCart", Reply::Status(500));
    ctx.shopify.data("getCart", json!({ "cart": cart(1, None) }));

    let (status, body) = text(
        ctx.htmx_post_form("/cart/remove", &[("line_id", LINE_ID)])
            .await,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Error removing item from cart"));
    assert!(body.contains("Acme Tee"));
}

#[tokio::test]
async fn test_checkout_redirects_to_shopify() {
    let ctx = TestContext::new().await;
    add_first_item(&ctx).await;
    ctx.shopify.data("getCart", json!({ "cart": cart(1, None) }));

    let response = ctx.get("/checkout").await;

    assert!(response.status().is_redirection());
    assert_eq!(
        location(&response).as_deref(),
        Some("https://acme.myshopify.com/cart/c/c1?key=abc")
    );
}

#[tokio::test]
async fn test_checkout_without_cart_returns_to_cart() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/checkout").await;

    assert!(response.status().is_redirection());
    assert_eq!(location(&response).as_deref(), Some("/cart"));
}

#[tokio::test]
async fn test_expired_cart_is_replaced_on_add() {
    let ctx = TestContext::new().await;
    add_first_item(&ctx).await;
    // Shopify no longer knows the stored cart
    ctx.shopify
        .data("addToCart", json!({ "cartLinesAdd": { "cart": null, "userErrors": [] } }));
    ctx.shopify.data("getCart", json!({ "cart": null }));

    let response = ctx
        .htmx_post_form("/cart/add", &[("variant_id", VARIANT_ID)])
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(ctx.shopify.count("createCart"), 2);
}

#[tokio::test]
async fn test_checkout_keeps_cart_through_upstream_outage() {
    let ctx = TestContext::new().await;
    add_first_item(&ctx).await;
    ctx.shopify.reply("getCart", Reply::Status(503));

    let response = ctx.get("/checkout").await;
    assert_eq!(location(&response).as_deref(), Some("/cart"));

    // Shopify is back; the session still points at the same cart
    ctx.shopify.data("getCart", json!({ "cart": cart(1, None) }));
    let response = ctx.get("/checkout").await;

    assert_eq!(
        location(&response).as_deref(),
        Some("https://acme.myshopify.com/cart/c/c1?key=abc")
    );
    let requests = ctx.shopify.requests_for("getCart");
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].variables["cartId"], "gid://shopify/Cart/c1?key=abc");
}

#[tokio::test]
async fn test_checkout_forgets_unknown_cart() {
    let ctx = TestContext::new().await;
    add_first_item(&ctx).await;
    ctx.shopify.data("getCart", json!({ "cart": null }));

    let response = ctx.get("/checkout").await;
    assert_eq!(location(&response).as_deref(), Some("/cart"));

    // No cart left in the session, so Shopify is not asked again
    ctx.get("/checkout").await;
    assert_eq!(ctx.shopify.count("getCart"), 1);
}

#[tokio::test]
async fn test_add_keeps_cart_when_store_unreachable() {
    let ctx = TestContext::new().await;
    add_first_item(&ctx).await;
    ctx.shopify.reply("addToCart", Reply::Status(503));
    ctx.shopify.reply("getCart", Reply::Status(503));

    let (status, body) = text(
        ctx.htmx_post_form("/cart/add", &[("variant_id", VARIANT_ID)])
            .await,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Error adding item to cart"));
    assert_eq!(ctx.shopify.count("createCart"), 1);

    // The next add still targets the original cart
    ctx.shopify
        .data("addToCart", json!({ "cartLinesAdd": cart_payload(cart(2, None)) }));
    ctx.htmx_post_form("/cart/add", &[("variant_id", VARIANT_ID)])
        .await;
    let requests = ctx.shopify.requests_for("addToCart");
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].variables["cartId"], "gid://shopify/Cart/c1?key=abc");
}
