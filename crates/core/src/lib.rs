//! storecart core - Shared cart types.
//!
//! This crate provides the data model used by every storecart component:
//! - `storecart` - The cart state manager library
//! - `storecart-cli` - Command-line front end for the cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. Carts are immutable snapshots; every change builds a
//! new snapshot.
//!
//! # Modules
//!
//! - [`types`] - Product ids, quantities, products, stock records, and carts

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
