//! Cart snapshots.
//!
//! A [`Cart`] is an immutable, ordered sequence of [`LineItem`]s, unique by
//! product id and kept in insertion order. Every change goes through one of
//! the copy-on-write builders (`with_appended`, `with_amount`, `without`),
//! which leave the original snapshot untouched and return a new one.
//!
//! The serialized form is a JSON array of line items, each carrying the
//! product's display fields next to its `amount`:
//!
//! ```json
//! [{"id": 1, "title": "Sneaker", "price": "179.9", "image": "...", "amount": 2}]
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::product::Product;
use super::quantity::Quantity;

/// Errors raised when a snapshot violates cart invariants.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartSnapshotError {
    /// The same product appears on more than one line.
    #[error("duplicate line item for product {0}")]
    DuplicateId(ProductId),
}

/// One product entry in the cart with its chosen quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// The product, flattened into the line item.
    #[serde(flatten)]
    pub product: Product,
    /// Units of the product in the cart.
    pub amount: Quantity,
}

impl LineItem {
    /// Create a line item.
    #[must_use]
    pub const fn new(product: Product, amount: Quantity) -> Self {
        Self { product, amount }
    }

    /// The product id of this line.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price times amount, saturating at the `Decimal` range.
    #[must_use]
    pub fn line_price(&self) -> Decimal {
        self.product.price.saturating_mul(Decimal::from(self.amount.get()))
    }
}

/// An immutable snapshot of the cart.
///
/// Cloning is cheap: the items are shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Arc<[LineItem]>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Arc::from(Vec::new()),
        }
    }

    /// Build a cart from line items.
    ///
    /// # Errors
    ///
    /// Returns [`CartSnapshotError::DuplicateId`] if two lines share an id.
    pub fn from_items(items: Vec<LineItem>) -> Result<Self, CartSnapshotError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id()) {
                return Err(CartSnapshotError::DuplicateId(item.id()));
            }
        }
        Ok(Self {
            items: items.into(),
        })
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the line for `id`.
    #[must_use]
    pub fn position(&self, id: ProductId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// The line for `id`.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Whether the cart holds a line for `id`.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .fold(0_u64, |total, item| total.saturating_add(item.amount.get()))
    }

    /// Sum of all line prices.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items
            .iter()
            .map(LineItem::line_price)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// A new snapshot with `item` appended.
    ///
    /// # Errors
    ///
    /// Returns [`CartSnapshotError::DuplicateId`] if the cart already holds
    /// a line for the item's product.
    pub fn with_appended(&self, item: LineItem) -> Result<Self, CartSnapshotError> {
        if self.contains(item.id()) {
            return Err(CartSnapshotError::DuplicateId(item.id()));
        }
        let items: Vec<LineItem> = self
            .items
            .iter()
            .cloned()
            .chain(std::iter::once(item))
            .collect();
        Ok(Self {
            items: items.into(),
        })
    }

    /// A new snapshot with the amount of `id` replaced.
    ///
    /// Returns `None` if the cart holds no line for `id`.
    #[must_use]
    pub fn with_amount(&self, id: ProductId, amount: Quantity) -> Option<Self> {
        self.position(id)?;
        let items: Vec<LineItem> = self
            .items
            .iter()
            .map(|item| {
                if item.id() == id {
                    LineItem::new(item.product.clone(), amount)
                } else {
                    item.clone()
                }
            })
            .collect();
        Some(Self {
            items: items.into(),
        })
    }

    /// A new snapshot without the line for `id`, other lines in order.
    ///
    /// Returns `None` if the cart holds no line for `id`.
    #[must_use]
    pub fn without(&self, id: ProductId) -> Option<Self> {
        self.position(id)?;
        let items: Vec<LineItem> = self
            .items
            .iter()
            .filter(|item| item.id() != id)
            .cloned()
            .collect();
        Some(Self {
            items: items.into(),
        })
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::empty()
    }
}

impl TryFrom<Vec<LineItem>> for Cart {
    type Error = CartSnapshotError;

    fn try_from(items: Vec<LineItem>) -> Result<Self, Self::Error> {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items.to_vec()
    }
}
