//! In-process catalog fixture.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use rocketshoes_core::{Product, ProductId, StockEntry};

use super::{ApiError, CatalogApi};

/// Catalog backed by in-memory maps.
///
/// Stock entries keep insertion order so snapshots are deterministic.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    products: HashMap<ProductId, Product>,
    stock: Vec<StockEntry>,
    stock_unavailable: AtomicBool,
    products_unavailable: AtomicBool,
    product_fetches: AtomicUsize,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product together with its available amount.
    #[must_use]
    pub fn with_product(mut self, product: Product, available_amount: i32) -> Self {
        self.stock.push(StockEntry::new(product.id, available_amount));
        self.products.insert(product.id, product);
        self
    }

    /// Add a stock entry without a matching catalog record.
    #[must_use]
    pub fn with_stock(mut self, entry: StockEntry) -> Self {
        self.stock.push(entry);
        self
    }

    /// Make `fetch_stock_snapshot` fail.
    pub fn set_stock_unavailable(&self, unavailable: bool) {
        self.stock_unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make `fetch_product` fail for every ID.
    pub fn set_products_unavailable(&self, unavailable: bool) {
        self.products_unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// How many product lookups have been served (including failures).
    #[must_use]
    pub fn product_fetches(&self) -> usize {
        self.product_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogApi for MemoryCatalog {
    async fn fetch_stock_snapshot(&self) -> Result<Vec<StockEntry>, ApiError> {
        if self.stock_unavailable.load(Ordering::SeqCst) {
            return Err(ApiError::Unavailable("stock".to_string()));
        }
        Ok(self.stock.clone())
    }

    async fn fetch_product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.product_fetches.fetch_add(1, Ordering::SeqCst);
        if self.products_unavailable.load(Ordering::SeqCst) {
            return Err(ApiError::Unavailable(format!("product {id}")));
        }
        self.products
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("product {id}")))
    }
}
