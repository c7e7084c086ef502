//! Remote catalog and stock ledger.
//!
//! # Architecture
//!
//! - [`CatalogApi`] is the seam the cart store depends on
//! - [`HttpCatalog`] talks to the JSON API (`GET /stock`, `GET /products/{id}`)
//! - [`MemoryCatalog`] serves fixtures in-process for tests and offline runs
//!
//! The stock ledger is read-only from the cart's point of view.

mod http;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use rocketshoes_core::{Product, ProductId, StockEntry};
use thiserror::Error;

pub use http::HttpCatalog;
pub use memory::MemoryCatalog;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success response.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The service could not be reached.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    /// The catalog answered with a different product than the one requested.
    #[error("Requested product {requested}, catalog returned {returned}")]
    IdMismatch {
        requested: ProductId,
        returned: ProductId,
    },
}

/// Read-only access to products and the stock ledger.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch available amounts for every product.
    async fn fetch_stock_snapshot(&self) -> Result<Vec<StockEntry>, ApiError>;

    /// Fetch one product's catalog record.
    ///
    /// Returns [`ApiError::NotFound`] when the ID does not resolve and
    /// [`ApiError::IdMismatch`] when the record is for another product.
    async fn fetch_product(&self, id: ProductId) -> Result<Product, ApiError>;
}

#[async_trait]
impl<T: CatalogApi + ?Sized> CatalogApi for Arc<T> {
    async fn fetch_stock_snapshot(&self) -> Result<Vec<StockEntry>, ApiError> {
        (**self).fetch_stock_snapshot().await
    }

    async fn fetch_product(&self, id: ProductId) -> Result<Product, ApiError> {
        (**self).fetch_product(id).await
    }
}
