//! Acme Store Core - Shared types library.
//!
//! This crate provides common types used across Acme Store components:
//! - `storefront` - Public-facing e-commerce site
//! - `integration-tests` - End-to-end tests against a fake Shopify upstream
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for Shopify global IDs, prices, and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
