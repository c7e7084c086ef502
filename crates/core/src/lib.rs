//! RocketShoes Core - Shared types library.
//!
//! This crate provides the domain types used across all RocketShoes components:
//! - `cart` - Cart store, collaborator traits and adapters
//! - `cli` - Command-line front end for the cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O, no
//! HTTP clients, no storage access. This keeps it lightweight and allows it to
//! be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices, catalog records, stock entries and the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
