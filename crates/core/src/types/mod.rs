//! Core types for RocketShoes.
//!
//! This module provides type-safe wrappers for the catalog and cart domain.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;
pub mod stock;

pub use cart::{Cart, CartItem, CartValidationError};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use product::Product;
pub use stock::StockEntry;
