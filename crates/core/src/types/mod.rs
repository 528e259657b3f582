//! Core types for Acme Store.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod gid;
pub mod price;

pub use email::{Email, EmailError};
pub use gid::*;
pub use price::{CurrencyCode, Price, PriceError, format_money};
