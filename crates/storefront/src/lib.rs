//! Acme Store Storefront library.
//!
//! Server-rendered storefront proxying the Shopify Storefront API. The
//! library exposes the router so it can be exercised end to end in tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod routes;
pub mod shopify;
pub mod sorting;
pub mod state;
pub mod variant;

use axum::{Router, body::Body, http::Request, middleware::from_fn};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::state::AppState;

/// Directory served under `/static`, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/storefront/static";

/// Build the storefront router with its middleware stack.
///
/// Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    routes::routes(state.config())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(from_fn(middleware::csp_nonce_middleware))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}
