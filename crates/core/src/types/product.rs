//! Catalog product records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A product as served by the catalog API.
///
/// `price` accepts either a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog product ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price in the store currency.
    pub price: Decimal,
    /// Product image URL.
    pub image: String,
}
