//! The cart store: cart contents reconciled against a stock snapshot.
//!
//! # Lifecycle
//!
//! 1. [`CartStore::hydrate`] restores the cart from durable storage (or starts
//!    empty). The store is usable for display immediately.
//! 2. [`CartStore::load_stock`] fetches the stock snapshot. Until it succeeds,
//!    every quantity check fails closed.
//!
//! [`CartStore::initialize`] runs both steps.
//!
//! # Mutations
//!
//! Each mutation builds the next cart, writes it to storage, and only then
//! swaps it into memory. A failed write therefore leaves memory and storage on
//! the previous cart. Rejections are reported to the [`Notifier`] before the
//! operation returns; nothing escapes the store as an `Err` or a panic.

use std::collections::HashMap;

use rocketshoes_core::{Cart, ProductId, StockEntry};
use tracing::{debug, error, info, instrument, warn};

use crate::catalog::{ApiError, CatalogApi};
use crate::error::{CartError, CartOperation, PersistError};
use crate::notify::Notifier;
use crate::storage::KeyValueStorage;

/// Storage key the cart is persisted under.
pub const CART_STORAGE_KEY: &str = "@RocketShoes:cart";

/// Cached copy of the remote stock ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StockSnapshot {
    /// No snapshot has been fetched successfully yet.
    #[default]
    NotLoaded,
    /// Stock entries keyed by product.
    Loaded(HashMap<ProductId, StockEntry>),
}

impl StockSnapshot {
    /// Index entries by product ID. A repeated ID keeps its last entry.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = StockEntry>) -> Self {
        Self::Loaded(entries.into_iter().map(|entry| (entry.id, entry)).collect())
    }

    /// Stock entry for a product, if the snapshot has one.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&StockEntry> {
        match self {
            Self::NotLoaded => None,
            Self::Loaded(entries) => entries.get(&id),
        }
    }

    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Entries sorted by product ID.
    #[must_use]
    pub fn entries(&self) -> Vec<StockEntry> {
        let mut entries: Vec<StockEntry> = match self {
            Self::NotLoaded => Vec::new(),
            Self::Loaded(entries) => entries.values().copied().collect(),
        };
        entries.sort_by_key(|entry| entry.id);
        entries
    }
}

/// Result of a mutating cart operation.
#[must_use]
#[derive(Debug)]
pub enum MutationOutcome {
    /// The cart changed and was persisted.
    Applied,
    /// The request was a benign no-op; nothing was reported.
    Ignored,
    /// The request was refused and the shopper was notified.
    Rejected(CartError),
}

impl MutationOutcome {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// The rejection reason, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&CartError> {
        match self {
            Self::Rejected(err) => Some(err),
            Self::Applied | Self::Ignored => None,
        }
    }
}

/// Shopping cart reconciled against the remote stock ledger.
pub struct CartStore<C, S, N> {
    catalog: C,
    storage: S,
    notifier: N,
    cart: Cart,
    stock: StockSnapshot,
}

impl<C, S, N> CartStore<C, S, N>
where
    C: CatalogApi,
    S: KeyValueStorage,
    N: Notifier,
{
    /// Restore the cart from storage without fetching stock.
    ///
    /// A missing, unreadable or invalid stored cart yields an empty cart.
    pub fn hydrate(catalog: C, storage: S, notifier: N) -> Self {
        let cart = match storage.get(CART_STORAGE_KEY) {
            Ok(Some(json)) => match Cart::from_json(&json) {
                Ok(cart) => {
                    debug!(items = cart.len(), "Hydrated cart from storage");
                    cart
                }
                Err(e) => {
                    warn!(error = %e, "Discarding invalid persisted cart");
                    Cart::new()
                }
            },
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read persisted cart");
                Cart::new()
            }
        };

        Self {
            catalog,
            storage,
            notifier,
            cart,
            stock: StockSnapshot::NotLoaded,
        }
    }

    /// Restore the cart and fetch the stock snapshot.
    ///
    /// A failed stock fetch is logged, not reported; the store stays usable
    /// and refuses quantity changes until stock is loaded.
    pub async fn initialize(catalog: C, storage: S, notifier: N) -> Self {
        let mut store = Self::hydrate(catalog, storage, notifier);
        store.load_stock().await;
        store
    }

    /// Fetch the stock snapshot, replacing the cached one on success.
    ///
    /// Returns whether the fetch succeeded. On failure the previous snapshot
    /// (possibly none) is kept.
    #[instrument(skip(self))]
    pub async fn load_stock(&mut self) -> bool {
        match self.catalog.fetch_stock_snapshot().await {
            Ok(entries) => {
                self.stock = StockSnapshot::from_entries(entries);
                info!("Stock snapshot loaded");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to load stock snapshot");
                false
            }
        }
    }

    /// Current cart contents.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Cached stock snapshot.
    #[must_use]
    pub const fn stock(&self) -> &StockSnapshot {
        &self.stock
    }

    #[must_use]
    pub const fn is_stock_loaded(&self) -> bool {
        self.stock.is_loaded()
    }

    #[must_use]
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart is incremented if stock allows; a new
    /// product is fetched from the catalog and appended with an amount of one.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&mut self, product_id: ProductId) -> MutationOutcome {
        let in_cart = self.cart.get(product_id).map(|item| item.amount);

        let next = if let Some(current) = in_cart {
            let entry = match self.stock_entry(product_id) {
                Ok(entry) => entry,
                Err(err) => return self.reject(err),
            };
            if entry.available_amount() <= current {
                return self.reject(CartError::StockExceeded {
                    product_id,
                    requested: current + 1,
                    available: entry.available_amount(),
                });
            }
            self.cart.with_amount(product_id, current + 1)
        } else {
            let product = match self.catalog.fetch_product(product_id).await {
                Ok(product) if product.id == product_id => product,
                Ok(product) => {
                    let source = ApiError::IdMismatch {
                        requested: product_id,
                        returned: product.id,
                    };
                    return self.reject(CartError::ProductFetch { product_id, source });
                }
                Err(source) => {
                    return self.reject(CartError::ProductFetch { product_id, source });
                }
            };
            self.cart.with_product(product)
        };

        match next {
            Some(next) => self.commit(next, CartOperation::Add),
            None => self.reject(CartError::ItemNotInCart {
                product_id,
                operation: CartOperation::Add,
            }),
        }
    }

    /// Remove a product's line from the cart.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn remove_product(&mut self, product_id: ProductId) -> MutationOutcome {
        match self.cart.without(product_id) {
            Some(next) => self.commit(next, CartOperation::Remove),
            None => self.reject(CartError::ItemNotInCart {
                product_id,
                operation: CartOperation::Remove,
            }),
        }
    }

    /// Set a product's amount.
    ///
    /// Non-positive amounts are ignored without notifying the shopper.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn update_product_amount(&mut self, product_id: ProductId, amount: i32) -> MutationOutcome {
        if amount <= 0 {
            debug!(amount, "Ignoring non-positive amount");
            return MutationOutcome::Ignored;
        }

        let entry = match self.stock_entry(product_id) {
            Ok(entry) => entry,
            Err(err) => return self.reject(err),
        };
        if !entry.covers(amount) {
            return self.reject(CartError::StockExceeded {
                product_id,
                requested: amount,
                available: entry.available_amount(),
            });
        }

        match self.cart.with_amount(product_id, amount) {
            Some(next) => self.commit(next, CartOperation::UpdateAmount),
            None => self.reject(CartError::ItemNotInCart {
                product_id,
                operation: CartOperation::UpdateAmount,
            }),
        }
    }

    /// Stock entry to check a quantity against.
    fn stock_entry(&self, product_id: ProductId) -> Result<StockEntry, CartError> {
        match &self.stock {
            StockSnapshot::NotLoaded => Err(CartError::StockNotLoaded { product_id }),
            StockSnapshot::Loaded(entries) => entries
                .get(&product_id)
                .copied()
                .ok_or(CartError::NoStockEntry { product_id }),
        }
    }

    /// Persist `next`, then make it the current cart.
    fn commit(&mut self, next: Cart, operation: CartOperation) -> MutationOutcome {
        let written = next
            .to_json()
            .map_err(PersistError::from)
            .and_then(|json| {
                self.storage
                    .set(CART_STORAGE_KEY, &json)
                    .map_err(PersistError::from)
            });

        match written {
            Ok(()) => {
                self.cart = next;
                debug!(%operation, items = self.cart.len(), "Cart committed");
                MutationOutcome::Applied
            }
            Err(source) => self.reject(CartError::Persist { operation, source }),
        }
    }

    /// Log and report a rejection.
    fn reject(&self, err: CartError) -> MutationOutcome {
        if err.is_unexpected() {
            let event_id = sentry::capture_error(&err);
            error!(error = %err, sentry_event_id = %event_id, "Cart operation failed");
        } else {
            info!(error = %err, "Cart operation rejected");
        }

        self.notifier.notify(err.user_message());
        MutationOutcome::Rejected(err)
    }
}
