//! Collection reshaping.

use crate::shopify::types::{Collection, Seo};

use super::super::schema::{Connection, RawCollection};
use super::connection::remove_edges_and_nodes;
use super::products::reshape_seo;

/// Reshape a raw collection, adding its storefront path.
pub fn reshape_collection(collection: RawCollection) -> Collection {
    Collection {
        path: format!("/search/{}", collection.handle),
        seo: reshape_seo(collection.seo),
        handle: collection.handle,
        title: collection.title,
        description: collection.description,
        updated_at: collection.updated_at,
    }
}

/// Flatten and reshape a collection connection.
pub fn reshape_collections(collections: Connection<RawCollection>) -> Vec<Collection> {
    remove_edges_and_nodes(collections)
        .into_iter()
        .map(reshape_collection)
        .collect()
}

/// Collections shown in navigation: a synthetic "All" entry first, then
/// every collection whose handle does not start with `hidden`.
pub fn storefront_collections(collections: Vec<Collection>) -> Vec<Collection> {
    let all = Collection {
        handle: String::new(),
        title: "All".to_string(),
        description: "All products".to_string(),
        seo: Seo {
            title: Some("All".to_string()),
            description: Some("All products".to_string()),
        },
        updated_at: chrono::Utc::now().to_rfc3339(),
        path: "/search".to_string(),
    };

    std::iter::once(all)
        .chain(
            collections
                .into_iter()
                .filter(|collection| !collection.handle.starts_with("hidden")),
        )
        .collect()
}
