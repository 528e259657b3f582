//! GraphQL connection flattening.

use super::super::schema::Connection;

/// Collapse a connection into its nodes, skipping `null` nodes.
pub fn remove_edges_and_nodes<T>(connection: Connection<T>) -> Vec<T> {
    connection
        .edges
        .into_iter()
        .filter_map(|edge| edge.node)
        .collect()
}
