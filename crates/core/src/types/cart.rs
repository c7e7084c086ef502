//! Cart line items and the ordered cart.
//!
//! [`Cart`] is an immutable-by-convention value: every transition
//! (`with_product`, `with_amount`, `without`) builds a new cart and leaves the
//! receiver untouched, so a caller can persist the new value before swapping it
//! in.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::ProductId;
use super::price::{CurrencyCode, Price};
use super::product::Product;

/// Reasons a serialized cart is rejected.
#[derive(Debug, Error)]
pub enum CartValidationError {
    /// Not a JSON array of cart items.
    #[error("Malformed cart JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A line item carries a quantity below one.
    #[error("Product {product_id} has non-positive amount {amount}")]
    NonPositiveAmount { product_id: ProductId, amount: i32 },

    /// The same product appears on more than one line.
    #[error("Product {0} appears more than once")]
    DuplicateItem(ProductId),
}

/// A cart line: the product's catalog fields plus the requested quantity.
///
/// Serialized flat, e.g. `{"id": 1, "title": "...", "price": "179.9", "image": "...", "amount": 2}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    /// Requested quantity (always >= 1).
    pub amount: i32,
}

impl CartItem {
    /// A fresh line with a quantity of one.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self { product, amount: 1 }
    }

    /// Product ID of this line.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self, currency_code: CurrencyCode) -> Price {
        Price::new(self.product.price, currency_code).times(self.amount)
    }
}

/// Ordered cart contents, unique by product ID, in first-added order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl TryFrom<Vec<CartItem>> for Cart {
    type Error = CartValidationError;

    fn try_from(items: Vec<CartItem>) -> Result<Self, Self::Error> {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from line items, enforcing the cart invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if any amount is below one or an ID repeats.
    pub fn from_items(items: Vec<CartItem>) -> Result<Self, CartValidationError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.amount < 1 {
                return Err(CartValidationError::NonPositiveAmount {
                    product_id: item.id(),
                    amount: item.amount,
                });
            }
            if !seen.insert(item.id()) {
                return Err(CartValidationError::DuplicateItem(item.id()));
            }
        }
        Ok(Self { items })
    }

    /// Parse and validate a persisted cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the cart item shape or the
    /// items violate the cart invariants.
    pub fn from_json(json: &str) -> Result<Self, CartValidationError> {
        let items: Vec<CartItem> = serde_json::from_str(json)?;
        Self::from_items(items)
    }

    /// Serialize for persistence.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Line items in first-added order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up a line by product ID.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Whether a line exists for this product.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|item| i64::from(item.amount)).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self, currency_code: CurrencyCode) -> Price {
        self.items
            .iter()
            .fold(Price::zero(currency_code), |acc, item| {
                Price::new(
                    acc.amount + item.line_total(currency_code).amount,
                    currency_code,
                )
            })
    }

    /// A new cart with `product` appended at quantity one.
    ///
    /// Returns `None` if the product is already in the cart.
    #[must_use]
    pub fn with_product(&self, product: Product) -> Option<Self> {
        if self.contains(product.id) {
            return None;
        }
        let mut items = self.items.clone();
        items.push(CartItem::new(product));
        Some(Self { items })
    }

    /// A new cart with the line for `id` set to `amount`.
    ///
    /// Returns `None` if the product is not in the cart or `amount` is below one.
    #[must_use]
    pub fn with_amount(&self, id: ProductId, amount: i32) -> Option<Self> {
        if amount < 1 || !self.contains(id) {
            return None;
        }
        let items = self
            .items
            .iter()
            .map(|item| {
                if item.id() == id {
                    CartItem {
                        product: item.product.clone(),
                        amount,
                    }
                } else {
                    item.clone()
                }
            })
            .collect();
        Some(Self { items })
    }

    /// A new cart without the line for `id`.
    ///
    /// Returns `None` if the product is not in the cart.
    #[must_use]
    pub fn without(&self, id: ProductId) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }
        let items = self
            .items
            .iter()
            .filter(|item| item.id() != id)
            .cloned()
            .collect();
        Some(Self { items })
    }
}
