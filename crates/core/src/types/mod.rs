//! Core types for storecart.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod cart;
pub mod id;
pub mod product;
pub mod quantity;

pub use cart::{Cart, CartSnapshotError, LineItem};
pub use id::*;
pub use product::{Product, StockInfo};
pub use quantity::{Quantity, QuantityError};
