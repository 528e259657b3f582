//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, added in `main`)
//! 2. `TraceLayer` (request spans)
//! 3. Request ID (unique ID per request)
//! 4. CSP nonce (per-request nonce for inline JSON-LD)
//! 5. Security headers (CSP built from the nonce)
//! 6. Session layer (tower-sessions, in-memory store)
//! 7. Rate limiting (governor, on log-in/registration and cart routes)

pub mod csp;
pub mod customer;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use csp::{CspNonce, csp_nonce_middleware};
pub use customer::{RequireCustomer, clear_customer_token, customer_token, set_customer_token};
pub use rate_limit::{auth_rate_limiter, cart_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{Shopper, create_session_layer};
