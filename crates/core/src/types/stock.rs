//! Remote stock ledger entries.

use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// How many units of a product the remote stock ledger has available.
///
/// Serialized with the API's field names (`{"id": 1, "amount": 3}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockEntry {
    /// Product this entry counts.
    pub id: ProductId,
    /// Units available.
    #[serde(rename = "amount")]
    available_amount: i32,
}

impl StockEntry {
    /// Create a stock entry.
    #[must_use]
    pub const fn new(id: ProductId, available_amount: i32) -> Self {
        Self {
            id,
            available_amount,
        }
    }

    /// Units available.
    #[must_use]
    pub const fn available_amount(&self) -> i32 {
        self.available_amount
    }

    /// Whether `requested` units fit in the available amount.
    #[must_use]
    pub const fn covers(&self, requested: i32) -> bool {
        requested <= self.available_amount
    }
}
