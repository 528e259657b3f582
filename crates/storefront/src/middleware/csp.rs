//! Per-request CSP nonce.
//!
//! Product and article pages embed JSON-LD in an inline `<script>`; the CSP
//! only admits inline scripts carrying this nonce.

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;

/// A 128-bit random nonce, base64-encoded.
#[derive(Clone, Debug)]
pub struct CspNonce(pub String);

impl CspNonce {
    /// Generate a new random nonce.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut bytes);
        Self(STANDARD.encode(bytes))
    }

    /// Nonce value for `nonce="…"` attributes.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Generates a nonce and stores it in request extensions.
///
/// Layer this outside `security_headers_middleware`, which reads the nonce
/// back to build the CSP header.
pub async fn csp_nonce_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(CspNonce::generate());
    next.run(request).await
}

impl<S> FromRequestParts<S> for CspNonce
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_else(|| {
            tracing::warn!("CSP nonce missing from request extensions");
            Self(String::new())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonces_are_unique_base64() {
        let first = CspNonce::generate();
        let second = CspNonce::generate();
        assert_ne!(first.value(), second.value());
        // 16 bytes encode to 24 base64 characters
        assert_eq!(first.value().len(), 24);
        assert!(STANDARD.decode(first.value()).is_ok());
    }
}
