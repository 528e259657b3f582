//! Integration tests for Acme Store.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p acme-store-integration-tests
//! ```
//!
//! Every test starts its own storefront on an ephemeral port. The storefront
//! talks to [`FakeShopify`], an in-process stand-in for the Storefront API
//! that answers each GraphQL operation (by `operationName`) with a canned
//! [`Reply`] and records what it was asked.
//!
//! Operations without a configured reply receive `{"data": {}}`, which the
//! storefront reads as an empty result.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use acme_store_storefront::{
    app,
    config::{ShopifyStorefrontConfig, StorefrontConfig},
    state::AppState,
};
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use secrecy::SecretString;
use serde_json::{Value, json};

/// Revalidation secret configured on every test storefront.
pub const REVALIDATION_SECRET: &str = "Kq8vN2xRmT5wLp9z";

/// Storefront API token the fake expects.
pub const STOREFRONT_TOKEN: &str = "test-storefront-token";

/// Upstream timeout used unless a test asks for another one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// Fake Shopify
// =============================================================================

/// Canned answer for one GraphQL operation.
#[derive(Debug, Clone)]
pub enum Reply {
    /// `200 OK` with `{"data": <value>}`.
    Data(Value),
    /// `200 OK` with a raw body, e.g. `{"errors": [...]}`.
    Body(Value),
    /// An empty response with this status code.
    Status(u16),
    /// `{"data": <value>}`, sent after a delay.
    Delayed(Duration, Value),
}

/// A GraphQL request received by the fake.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub operation: String,
    pub variables: Value,
    pub access_token: Option<String>,
}

#[derive(Default)]
struct FakeShopifyState {
    replies: HashMap<String, Reply>,
    requests: Vec<RecordedRequest>,
}

/// In-process fake of the Shopify Storefront API.
#[derive(Clone)]
pub struct FakeShopify {
    state: Arc<Mutex<FakeShopifyState>>,
    /// Base URL the fake listens on, e.g. `http://127.0.0.1:53211`.
    pub url: String,
}

impl FakeShopify {
    /// Bind to an ephemeral port and start serving.
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake Shopify");
        let addr = listener
            .local_addr()
            .expect("Failed to read fake Shopify address");

        let state = Arc::new(Mutex::new(FakeShopifyState::default()));
        let router = Router::new()
            .route("/api/{version}/graphql.json", post(graphql))
            .with_state(Arc::clone(&state));

        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Fake Shopify server failed");
        });

        Self {
            state,
            url: format!("http://{addr}"),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FakeShopifyState> {
        self.state.lock().expect("Fake Shopify state poisoned")
    }

    /// Answer `operation` with `reply` from now on.
    pub fn reply(&self, operation: &str, reply: Reply) {
        self.lock().replies.insert(operation.to_string(), reply);
    }

    /// Answer `operation` with `{"data": data}` from now on.
    pub fn data(&self, operation: &str, data: Value) {
        self.reply(operation, Reply::Data(data));
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Requests received for `operation`.
    pub fn requests_for(&self, operation: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.operation == operation)
            .collect()
    }

    /// Number of requests received for `operation`.
    pub fn count(&self, operation: &str) -> usize {
        self.requests_for(operation).len()
    }
}

async fn graphql(
    State(state): State<Arc<Mutex<FakeShopifyState>>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let operation = body
        .get("operationName")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let reply = {
        let mut state = state.lock().expect("Fake Shopify state poisoned");
        state.requests.push(RecordedRequest {
            operation: operation.clone(),
            variables: body.get("variables").cloned().unwrap_or(Value::Null),
            access_token: headers
                .get("x-shopify-storefront-access-token")
                .and_then(|value| value.to_str().ok())
                .map(str::to_string),
        });
        state.replies.get(&operation).cloned()
    };

    match reply {
        None => Json(json!({ "data": {} })).into_response(),
        Some(Reply::Data(data)) => Json(json!({ "data": data })).into_response(),
        Some(Reply::Body(body)) => Json(body).into_response(),
        Some(Reply::Status(code)) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        Some(Reply::Delayed(delay, data)) => {
            tokio::time::sleep(delay).await;
            Json(json!({ "data": data })).into_response()
        }
    }
}

// =============================================================================
// Test Context
// =============================================================================

/// A running storefront wired to a fresh [`FakeShopify`].
pub struct TestContext {
    pub shopify: FakeShopify,
    pub base_url: String,
    /// Client with a cookie store (one shopper session) that does not
    /// follow redirects.
    pub client: reqwest::Client,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT).await
    }

    /// Start a storefront whose upstream requests time out after `timeout`.
    pub async fn with_timeout(timeout: Duration) -> Self {
        let shopify = FakeShopify::start().await;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind storefront");
        let addr = listener
            .local_addr()
            .expect("Failed to read storefront address");
        let base_url = format!("http://{addr}");

        let config = test_config(addr, &base_url, &shopify.url, timeout);
        let state = AppState::new(config).expect("Failed to build application state");
        let router = app(state);

        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Storefront server failed");
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            shopify,
            base_url,
            client,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// GET `path`, returning the status and body.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        text(self.get(path).await).await
    }

    /// POST an urlencoded form, as a browser without JavaScript would.
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> reqwest::Response {
        self.form_request(path, fields)
            .send()
            .await
            .expect("POST request failed")
    }

    /// POST an urlencoded form the way HTMX does.
    pub async fn htmx_post_form(&self, path: &str, fields: &[(&str, &str)]) -> reqwest::Response {
        self.form_request(path, fields)
            .header("HX-Request", "true")
            .send()
            .await
            .expect("POST request failed")
    }

    fn form_request(&self, path: &str, fields: &[(&str, &str)]) -> reqwest::RequestBuilder {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        self.client
            .post(self.url(path))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
    }
}

/// Storefront configuration pointing at `base_url`, backed by the fake at
/// `shopify_url`.
#[must_use]
pub fn test_config(
    addr: SocketAddr,
    base_url: &str,
    shopify_url: &str,
    timeout: Duration,
) -> StorefrontConfig {
    StorefrontConfig {
        host: addr.ip(),
        port: addr.port(),
        trusted_proxy: false,
        base_url: base_url.to_string(),
        site_name: "Acme Store".to_string(),
        company_name: "Acme Store Inc.".to_string(),
        shopify: shopify_config(shopify_url, timeout),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Storefront API configuration for the fake at `shopify_url`.
#[must_use]
pub fn shopify_config(shopify_url: &str, timeout: Duration) -> ShopifyStorefrontConfig {
    ShopifyStorefrontConfig {
        store_domain: shopify_url.to_string(),
        api_version: "2024-04".to_string(),
        storefront_access_token: SecretString::from(STOREFRONT_TOKEN),
        revalidation_secret: Some(SecretString::from(REVALIDATION_SECRET)),
        request_timeout: timeout,
        cache_ttl: Duration::from_secs(300),
        blog_handle: "news".to_string(),
    }
}

/// Status and body of a response.
pub async fn text(response: reqwest::Response) -> (StatusCode, String) {
    let status = response.status();
    let body = response.text().await.expect("Failed to read response body");
    (status, body)
}

/// `Location` header of a redirect.
#[must_use]
pub fn location(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

// =============================================================================
// Fixtures
// =============================================================================

/// A Storefront API connection over `nodes`.
#[must_use]
pub fn connection(nodes: Vec<Value>) -> Value {
    let edges: Vec<Value> = nodes.into_iter().map(|node| json!({ "node": node })).collect();
    json!({ "edges": edges })
}

#[must_use]
pub fn money(amount: &str) -> Value {
    json!({ "amount": amount, "currencyCode": "USD" })
}

/// A single-variant product priced at `$20.00`.
#[must_use]
pub fn product(handle: &str, title: &str, tags: &[&str]) -> Value {
    json!({
        "id": format!("gid://shopify/Product/{handle}"),
        "handle": handle,
        "availableForSale": true,
        "title": title,
        "description": format!("{title}, made by Acme."),
        "descriptionHtml": format!("<p>{title}, made by Acme.</p>"),
        "options": [{ "id": "gid://shopify/ProductOption/1", "name": "Title", "values": ["Default Title"] }],
        "priceRange": {
            "maxVariantPrice": money("20.0"),
            "minVariantPrice": money("20.0")
        },
        "variants": connection(vec![json!({
            "id": "gid://shopify/ProductVariant/11",
            "title": "Default Title",
            "availableForSale": true,
            "selectedOptions": [{ "name": "Title", "value": "Default Title" }],
            "price": money("20.0")
        })]),
        "featuredImage": {
            "url": format!("https://cdn.shopify.com/s/files/{handle}.png"),
            "altText": null,
            "width": 800,
            "height": 800
        },
        "images": connection(vec![json!({
            "url": format!("https://cdn.shopify.com/s/files/{handle}.png"),
            "altText": null,
            "width": 800,
            "height": 800
        })]),
        "seo": { "title": null, "description": null },
        "tags": tags,
        "updatedAt": "2024-05-01T10:00:00Z"
    })
}

/// A cart with one line of `quantity` units at `$20.00` each.
///
/// `tax` of `None` leaves `totalTaxAmount` null, as Shopify does before an
/// address is known.
#[must_use]
pub fn cart(quantity: i64, tax: Option<&str>) -> Value {
    let total = format!("{}.0", 20 * quantity);
    let lines = if quantity > 0 {
        vec![json!({
            "id": "gid://shopify/CartLine/1",
            "quantity": quantity,
            "cost": { "totalAmount": money(&total) },
            "merchandise": {
                "id": "gid://shopify/ProductVariant/11",
                "title": "Default Title",
                "selectedOptions": [{ "name": "Title", "value": "Default Title" }],
                "product": product("acme-tee", "Acme Tee", &[])
            }
        })]
    } else {
        Vec::new()
    };

    json!({
        "id": "gid://shopify/Cart/c1?key=abc",
        "checkoutUrl": "https://acme.myshopify.com/cart/c/c1?key=abc",
        "cost": {
            "subtotalAmount": money(&total),
            "totalAmount": money(&total),
            "totalTaxAmount": tax.map(money)
        },
        "lines": connection(lines),
        "totalQuantity": quantity
    })
}

/// Payload of a successful cart mutation.
#[must_use]
pub fn cart_payload(cart: Value) -> Value {
    json!({ "cart": cart, "userErrors": [] })
}
