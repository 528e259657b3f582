//! Cache types for Storefront API responses.

use crate::shopify::types::{Collection, MenuItem, Product};

/// Revalidation tag attached to cached responses.
///
/// Shopify's `products/*` and `collections/*` webhooks invalidate every entry
/// carrying the matching tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTag {
    Products,
    Collections,
}

impl CacheTag {
    /// Tag for a Shopify webhook topic such as `products/update`.
    #[must_use]
    pub fn from_topic(topic: &str) -> Option<Self> {
        let (resource, _) = topic.split_once('/').unwrap_or((topic, ""));
        match resource {
            "products" => Some(Self::Products),
            "collections" => Some(Self::Collections),
            _ => None,
        }
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Option<Box<Product>>),
    Products(Vec<Product>),
    Collection(Option<Box<Collection>>),
    Collections(Vec<Collection>),
    Menu(Vec<MenuItem>),
}

/// A cached value plus the tags that invalidate it.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub tags: &'static [CacheTag],
    pub value: CacheValue,
}

impl CacheEntry {
    pub const fn new(tags: &'static [CacheTag], value: CacheValue) -> Self {
        Self { tags, value }
    }

    pub fn has_tag(&self, tag: CacheTag) -> bool {
        self.tags.contains(&tag)
    }
}
