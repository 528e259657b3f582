//! Rate limiting middleware using governor and `tower_governor`.
//!
//! - `auth_rate_limiter`: log-in and registration (~10/min per IP)
//! - `cart_rate_limiter`: cart mutations (~100/min per IP)

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Proxy headers carrying the client IP, most specific first.
const CLIENT_IP_HEADERS: [&str; 2] = ["cf-connecting-ip", "x-real-ip"];

/// Keys requests by client IP.
///
/// Clients can set proxy headers themselves, so they are only read when the
/// storefront runs behind a trusted reverse proxy. Then the proxy headers
/// win, then the first `X-Forwarded-For` hop. Otherwise, and as a fallback,
/// the peer address is used, which needs the server started with connect
/// info.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor {
    trust_proxy_headers: bool,
}

impl ClientIpKeyExtractor {
    #[must_use]
    pub const fn new(trust_proxy_headers: bool) -> Self {
        Self {
            trust_proxy_headers,
        }
    }

    fn forwarded_ip<T>(req: &Request<T>) -> Option<IpAddr> {
        let headers = req.headers();

        CLIENT_IP_HEADERS
            .iter()
            .find_map(|name| {
                headers
                    .get(*name)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.trim().parse::<IpAddr>().ok())
            })
            .or_else(|| {
                headers
                    .get("x-forwarded-for")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.split(',').next())
                    .and_then(|s| s.trim().parse::<IpAddr>().ok())
            })
    }
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        if self.trust_proxy_headers
            && let Some(ip) = Self::forwarded_ip(req)
        {
            return Ok(ip);
        }

        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Rate limiter for log-in and registration: ~10 requests per minute per IP.
///
/// Replenishes one request every 6 seconds with a burst of 5, which stops
/// password guessing against Shopify through the storefront.
///
/// # Panics
///
/// Never panics: `per_second(6)` and `burst_size(5)` are both non-zero,
/// which is all `GovernorConfigBuilder::finish` checks.
#[must_use]
pub fn auth_rate_limiter(trust_proxy_headers: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor::new(trust_proxy_headers))
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

/// Rate limiter for cart mutations: ~100 requests per minute per IP.
///
/// # Panics
///
/// Never panics: `per_second(1)` and `burst_size(50)` are both non-zero.
#[must_use]
pub fn cart_rate_limiter(trust_proxy_headers: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor::new(trust_proxy_headers))
        .per_second(1)
        .burst_size(50)
        .finish()
        .expect("rate limiter config with per_second(1) and burst_size(50) is valid");
    GovernorLayer::new(Arc::new(config))
}
