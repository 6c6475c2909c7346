//! Catalog records: products and stock levels.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A product as served by the catalog API (`GET /products/{id}`).
///
/// Only `id` is required. Display fields default to empty values so that
/// minimal `{id, amount}` snapshots can still be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier, shared with the stock record.
    pub id: ProductId,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Unit price in the store currency.
    #[serde(default)]
    pub price: Decimal,
    /// Product image URL.
    #[serde(default)]
    pub image: String,
}

impl Product {
    /// Create a product with only an id and no display fields.
    #[must_use]
    pub fn bare(id: ProductId) -> Self {
        Self {
            id,
            title: String::new(),
            price: Decimal::ZERO,
            image: String::new(),
        }
    }
}

/// Available stock for a product (`GET /stock/{id}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockInfo {
    /// Catalog identifier.
    pub id: ProductId,
    /// Units available for purchase. Negative values mean none.
    pub amount: i64,
}

impl StockInfo {
    /// Whether `requested` units can be purchased.
    #[must_use]
    pub const fn covers(&self, requested: i64) -> bool {
        requested <= self.amount
    }
}
