//! Reshaping of raw Storefront API responses into domain types.
//!
//! Connections are flattened, hidden products dropped, missing alt text and
//! cart tax defaulted, and collection and menu links rewritten to storefront
//! paths.

pub mod cart;
pub mod collections;
pub mod connection;
pub mod content;
pub mod customer;
pub mod products;

pub use cart::reshape_cart;
pub use collections::{reshape_collection, reshape_collections, storefront_collections};
pub use connection::remove_edges_and_nodes;
pub use content::{reshape_article, reshape_menu, reshape_page};
pub use customer::{reshape_customer, reshape_customer_user_errors};
pub use products::{reshape_product, reshape_products};
