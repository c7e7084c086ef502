//! RocketShoes Cart - Stock-reconciled shopping cart store.
//!
//! The [`CartStore`] owns the cart contents and a cached snapshot of the remote
//! stock ledger. It talks to three collaborators through traits:
//!
//! - [`CatalogApi`] - stock snapshot and product lookups ([`HttpCatalog`], [`MemoryCatalog`])
//! - [`KeyValueStorage`] - durable string storage ([`FileStorage`], [`MemoryStorage`])
//! - [`Notifier`] - user-facing messages ([`TracingNotifier`], [`RecordingNotifier`])
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_cart::{CartConfig, CartStore, FileStorage, HttpCatalog, TracingNotifier};
//!
//! let config = CartConfig::from_env()?;
//! let catalog = HttpCatalog::new(&config)?;
//! let storage = FileStorage::new(&config.storage_path);
//!
//! let mut store = CartStore::initialize(catalog, storage, TracingNotifier).await;
//! let outcome = store.add_product(ProductId::new(1)).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod notify;
pub mod storage;
pub mod store;

pub use catalog::{ApiError, CatalogApi, HttpCatalog, MemoryCatalog};
pub use config::{CartConfig, ConfigError};
pub use error::{CartError, CartOperation, PersistError};
pub use notify::{Notifier, RecordingNotifier, TracingNotifier};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::{CART_STORAGE_KEY, CartStore, MutationOutcome, StockSnapshot};
