//! Core types for the Lixmath storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod catalog;
pub mod email;
pub mod id;
pub mod price;

pub use cart::{Cart, CartLine, PricedLine};
pub use catalog::{Catalog, Product, ProductId};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price};
