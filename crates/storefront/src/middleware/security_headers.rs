//! Security headers middleware for XSS, clickjacking, and isolation protection.
//!
//! Adds restrictive security headers to all responses. Start locked down and
//! loosen only when specific functionality requires it.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use super::csp::CspNonce;

/// Origin serving the HTMX script.
const HTMX_ORIGIN: &str = "https://unpkg.com";

/// Origin serving Shopify product and article images.
const SHOPIFY_CDN_ORIGIN: &str = "https://cdn.shopify.com";

/// Build the Content-Security-Policy value for a request nonce.
///
/// ```text
/// default-src 'none';
/// script-src 'self' 'nonce-…' https://unpkg.com;
/// style-src 'self';
/// img-src 'self' https://cdn.shopify.com data:;
/// connect-src 'self';
/// frame-src 'none'; object-src 'none';
/// base-uri 'self'; form-action 'self' https://*.myshopify.com;
/// frame-ancestors 'none'
/// ```
///
/// `form-action` admits the Shopify checkout redirect.
#[must_use]
pub fn content_security_policy(nonce: &str) -> String {
    let script_src = if nonce.is_empty() {
        format!("'self' {HTMX_ORIGIN}")
    } else {
        format!("'self' 'nonce-{nonce}' {HTMX_ORIGIN}")
    };
    format!(
        "default-src 'none'; \
         script-src {script_src}; \
         style-src 'self'; \
         font-src 'self'; \
         img-src 'self' {SHOPIFY_CDN_ORIGIN} data:; \
         connect-src 'self'; \
         frame-src 'none'; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self' https://*.myshopify.com; \
         frame-ancestors 'none'"
    )
}

/// Add security headers to all responses.
///
/// Must run inside `csp_nonce_middleware` so the request nonce is available.
/// `Cache-Control: no-store` is only applied when the handler did not set its
/// own caching policy.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let nonce = request
        .extensions()
        .get::<CspNonce>()
        .map(|nonce| nonce.value().to_string())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    // Prevent clickjacking
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));

    // Prevent MIME sniffing
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));

    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    match HeaderValue::from_str(&content_security_policy(&nonce)) {
        Ok(value) => {
            headers.insert(CONTENT_SECURITY_POLICY, value);
        }
        Err(error) => tracing::warn!(%error, "Invalid CSP header value"),
    }

    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "accelerometer=(), \
             camera=(), \
             geolocation=(), \
             gyroscope=(), \
             magnetometer=(), \
             microphone=(), \
             payment=(), \
             usb=()",
        ),
    );

    if !headers.contains_key(CACHE_CONTROL) {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));
    }

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );

    // Shopify's CDN does not send CORP headers
    headers.insert(
        HeaderName::from_static("cross-origin-embedder-policy"),
        HeaderValue::from_static("credentialless"),
    );

    response
}
