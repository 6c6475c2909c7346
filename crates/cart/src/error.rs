//! Unified error handling for cart operations.
//!
//! Provides a `CartError` type that the fallible `try_*` operations return.
//! The public cart operations convert every `CartError` into
//! [`Notice`]s instead of propagating it.

use storecart_core::{CartSnapshotError, ProductId, QuantityError};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::notify::{Notice, Operation};
use crate::storage::StorageError;

/// Error type for cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested quantity exceeds available stock.
    #[error("Requested {requested} of product {product_id}, only {available} in stock")]
    StockExceeded {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// The product has no line in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    /// The requested quantity is not a valid line item amount.
    #[error("Invalid quantity: {0}")]
    Quantity(#[from] QuantityError),

    /// The new snapshot would violate cart invariants.
    #[error("Invalid cart: {0}")]
    Snapshot(#[from] CartSnapshotError),

    /// Catalog read failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Storage read or write failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Snapshot could not be serialized.
    #[error("Failed to encode cart: {0}")]
    Encode(#[source] serde_json::Error),

    /// The persisted snapshot is not a valid cart.
    #[error("Stored cart under '{key}' is corrupt: {source}")]
    CorruptSnapshot {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CartError {
    /// The notices shown, in order, when `operation` fails with this error.
    ///
    /// Every failure ends with the operation's generic notice. A stock
    /// violation is announced as out of stock first.
    #[must_use]
    pub fn notices(&self, operation: Operation) -> Vec<Notice> {
        match self {
            Self::StockExceeded { .. } => vec![Notice::OutOfStock, Notice::failed(operation)],
            _ => vec![Notice::failed(operation)],
        }
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
