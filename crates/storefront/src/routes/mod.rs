//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Catalog
//! GET  /search                 - Product search (?q=&sort=)
//! GET  /search/{collection}    - Collection listing (?sort=)
//! GET  /product/{handle}       - Product detail (?{option}=&image=)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (triggers cart-updated)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment, polled)
//! GET  /checkout               - Redirect to Shopify checkout
//!
//! # Account
//! GET  /account                - Account overview (requires log-in)
//! GET  /account/login          - Log-in page
//! POST /account/login          - Log-in action (rate limited)
//! GET  /account/register       - Registration page
//! POST /account/register       - Registration action (rate limited)
//! POST /account/logout         - Log-out action
//!
//! # Content
//! GET  /blog                   - Article list
//! GET  /blog/{handle}          - Article
//! GET  /{page}                 - Shopify page
//!
//! # Misc
//! POST /currency               - Choose presentment currency
//! POST /api/revalidate         - Shopify webhook, invalidates caches
//! GET  /sitemap.xml            - Sitemap
//! GET  /robots.txt             - Robots rules
//! ```

pub mod account;
pub mod blog;
pub mod cart;
pub mod currency;
pub mod home;
pub mod layout;
pub mod pages;
pub mod products;
pub mod revalidate;
pub mod search;
pub mod seo;

use axum::{
    Router,
    routing::{get, post},
};

use crate::config::StorefrontConfig;
use crate::middleware::{auth_rate_limiter, cart_rate_limiter};
use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes(config: &StorefrontConfig) -> Router<AppState> {
    let mutations = Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route_layer(cart_rate_limiter(config.trusted_proxy));

    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .merge(mutations)
}

/// Create the account routes router.
///
/// Log-in and registration share one rate limit bucket per client IP.
pub fn account_routes(config: &StorefrontConfig) -> Router<AppState> {
    let limiter = auth_rate_limiter(config.trusted_proxy);

    Router::new()
        .route("/", get(account::index))
        .route(
            "/login",
            post(account::login)
                .layer(limiter.clone())
                .get(account::login_page),
        )
        .route(
            "/register",
            post(account::register)
                .layer(limiter)
                .get(account::register_page),
        )
        .route("/logout", post(account::logout))
}

/// Create the blog routes router.
pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(blog::index))
        .route("/{handle}", get(blog::show))
}

/// Create all routes for the storefront.
pub fn routes(config: &StorefrontConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health))
        .route("/search", get(search::search))
        .route("/search/{collection}", get(search::collection))
        .route("/product/{handle}", get(products::show))
        .nest("/cart", cart_routes(config))
        .route("/checkout", get(cart::checkout))
        .nest("/account", account_routes(config))
        .nest("/blog", blog_routes())
        .route("/currency", post(currency::update))
        .route("/api/revalidate", post(revalidate::revalidate))
        .route("/sitemap.xml", get(seo::sitemap))
        .route("/robots.txt", get(seo::robots))
        // Shopify pages last; static routes above take precedence
        .route("/{page}", get(pages::show))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not call Shopify.
async fn health() -> &'static str {
    "ok"
}
