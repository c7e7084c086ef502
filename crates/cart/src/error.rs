//! Cart error taxonomy and the messages shown to shoppers.
//!
//! Every rejection carries enough detail for logs while mapping to one of a
//! handful of fixed user-facing messages. Internal details never reach the
//! notifier.

use rocketshoes_core::ProductId;
use thiserror::Error;

use crate::catalog::ApiError;
use crate::storage::StorageError;

/// Shown when a requested quantity cannot be covered by stock.
pub const STOCK_EXCEEDED_MESSAGE: &str = "requested quantity exceeds stock";

/// The mutating operation an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOperation {
    Add,
    Remove,
    UpdateAmount,
}

impl CartOperation {
    /// Generic message for a failure of this operation.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Add => "failed to add product",
            Self::Remove => "failed to remove product",
            Self::UpdateAmount => "failed to update quantity",
        }
    }
}

impl std::fmt::Display for CartOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Remove => write!(f, "remove"),
            Self::UpdateAmount => write!(f, "update_amount"),
        }
    }
}

/// Writing the cart to durable storage failed.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to serialize cart: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write cart: {0}")]
    Storage(#[from] StorageError),
}

/// Why a cart mutation was rejected.
#[derive(Debug, Error)]
pub enum CartError {
    /// The stock snapshot has fewer units than requested.
    #[error("Requested {requested} of product {product_id}, only {available} in stock")]
    StockExceeded {
        product_id: ProductId,
        requested: i32,
        available: i32,
    },

    /// No stock snapshot has been loaded yet.
    #[error("Stock snapshot not loaded, cannot check product {product_id}")]
    StockNotLoaded { product_id: ProductId },

    /// The loaded snapshot has no entry for the product.
    #[error("No stock entry for product {product_id}")]
    NoStockEntry { product_id: ProductId },

    /// The catalog could not resolve the product.
    #[error("Failed to fetch product {product_id}: {source}")]
    ProductFetch {
        product_id: ProductId,
        #[source]
        source: ApiError,
    },

    /// The product has no line in the cart.
    #[error("Product {product_id} is not in the cart ({operation})")]
    ItemNotInCart {
        product_id: ProductId,
        operation: CartOperation,
    },

    /// The new cart could not be persisted; nothing was changed.
    #[error("Failed to persist cart ({operation}): {source}")]
    Persist {
        operation: CartOperation,
        #[source]
        source: PersistError,
    },
}

impl CartError {
    /// The message reported to the shopper for this error.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::StockExceeded { .. }
            | Self::StockNotLoaded { .. }
            | Self::NoStockEntry { .. } => STOCK_EXCEEDED_MESSAGE,
            Self::ProductFetch { .. } => CartOperation::Add.failure_message(),
            Self::ItemNotInCart { operation, .. } | Self::Persist { operation, .. } => {
                operation.failure_message()
            }
        }
    }

    /// Whether this is an unexpected failure rather than a business rule.
    #[must_use]
    pub const fn is_unexpected(&self) -> bool {
        matches!(self, Self::Persist { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let id = ProductId::new(1);

        let err = CartError::StockExceeded {
            product_id: id,
            requested: 3,
            available: 2,
        };
        assert_eq!(err.user_message(), "requested quantity exceeds stock");

        let err = CartError::StockNotLoaded { product_id: id };
        assert_eq!(err.user_message(), "requested quantity exceeds stock");

        let err = CartError::NoStockEntry { product_id: id };
        assert_eq!(err.user_message(), "requested quantity exceeds stock");
        assert!(!err.is_unexpected());

        let err = CartError::ProductFetch {
            product_id: id,
            source: ApiError::NotFound("product 1".to_string()),
        };
        assert_eq!(err.user_message(), "failed to add product");

        let err = CartError::ItemNotInCart {
            product_id: id,
            operation: CartOperation::Remove,
        };
        assert_eq!(err.user_message(), "failed to remove product");

        let err = CartError::Persist {
            operation: CartOperation::UpdateAmount,
            source: PersistError::Storage(StorageError::ReadOnly),
        };
        assert_eq!(err.user_message(), "failed to update quantity");
        assert!(err.is_unexpected());
    }

    #[test]
    fn test_error_display_keeps_detail() {
        let err = CartError::StockExceeded {
            product_id: ProductId::new(5),
            requested: 11,
            available: 10,
        };
        assert_eq!(
            err.to_string(),
            "Requested 11 of product 5, only 10 in stock"
        );

        let err = CartError::ItemNotInCart {
            product_id: ProductId::new(99),
            operation: CartOperation::UpdateAmount,
        };
        assert_eq!(
            err.to_string(),
            "Product 99 is not in the cart (update_amount)"
        );
    }
}
