//! Newtype wrappers for Shopify global IDs.
//!
//! Shopify identifies every object with a `gid://shopify/<Kind>/<id>` string.
//! Use the `define_gid!` macro to create wrappers that only accept IDs of one
//! kind, so a cart line ID can never be sent where a variant ID is expected.

use thiserror::Error;

/// Prefix shared by every Shopify global ID.
pub const GID_PREFIX: &str = "gid://shopify/";

/// Errors that can occur when parsing a global ID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GidError {
    /// The string does not start with `gid://shopify/` or has no id segment.
    #[error("malformed Shopify global ID: {0}")]
    Malformed(String),
    /// The ID names a different object kind.
    #[error("expected a {expected} ID, got {actual}")]
    WrongKind {
        /// Kind the wrapper accepts.
        expected: &'static str,
        /// Kind found in the string.
        actual: String,
    },
}

/// Split a global ID into `(kind, id)`.
///
/// Query parameters (Shopify appends `?key=...` to cart IDs) are kept on the
/// id segment.
///
/// # Errors
///
/// Returns [`GidError::Malformed`] when the prefix or either segment is missing.
pub fn split_gid(value: &str) -> Result<(&str, &str), GidError> {
    let rest = value
        .strip_prefix(GID_PREFIX)
        .ok_or_else(|| GidError::Malformed(value.to_string()))?;
    match rest.split_once('/') {
        Some((kind, id)) if !kind.is_empty() && !id.is_empty() => Ok((kind, id)),
        _ => Err(GidError::Malformed(value.to_string())),
    }
}

/// Macro to define a type-safe global ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `parse()` that checks the object kind, `as_str()`, `numeric_id()`
/// - `Display` and `FromStr`
///
/// # Example
///
/// ```rust
/// # use acme_store_core::define_gid;
/// define_gid!(OrderGid, "Order");
///
/// let order = OrderGid::parse("gid://shopify/Order/42").unwrap();
/// assert_eq!(order.numeric_id(), "42");
/// assert!(OrderGid::parse("gid://shopify/Product/42").is_err());
/// ```
#[macro_export]
macro_rules! define_gid {
    ($name:ident, $kind:literal) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Object kind encoded in the global ID.
            pub const KIND: &'static str = $kind;

            /// Parse a global ID, rejecting other object kinds.
            ///
            /// # Errors
            ///
            /// Returns an error if the string is malformed or of another kind.
            pub fn parse(value: &str) -> ::core::result::Result<Self, $crate::GidError> {
                let (kind, _) = $crate::split_gid(value)?;
                if kind != Self::KIND {
                    return Err($crate::GidError::WrongKind {
                        expected: Self::KIND,
                        actual: kind.to_string(),
                    });
                }
                Ok(Self(value.to_string()))
            }

            /// Get the full global ID string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Get the trailing id segment without any query string.
            #[must_use]
            pub fn numeric_id(&self) -> &str {
                let id = $crate::split_gid(&self.0).map_or("", |(_, id)| id);
                id.split_once('?').map_or(id, |(id, _)| id)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::GidError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_gid!(ProductGid, "Product");
define_gid!(VariantGid, "ProductVariant");
define_gid!(CartGid, "Cart");
define_gid!(CartLineGid, "CartLine");
