//! storecart - Shopping cart state manager.
//!
//! Owns an in-memory cart, validates quantities against remote stock, and
//! mirrors every change to string-keyed local storage so the cart survives
//! restarts.
//!
//! # Architecture
//!
//! - [`store::CartStore`] is the single stateful component
//! - [`catalog::Catalog`] reads product and stock records (HTTP via `reqwest`)
//! - [`storage::Storage`] persists the cart snapshot as JSON
//! - [`notify::Notifier`] surfaces user-facing failure messages
//!
//! Failures never propagate out of the cart operations; they become notices.
//!
//! # Example
//!
//! ```rust,ignore
//! use storecart::{CartConfig, CartStore, HttpCatalog, FileStorage, TracingNotifier};
//!
//! let config = CartConfig::from_env()?;
//! let store = CartStore::open(
//!     HttpCatalog::new(&config.catalog)?,
//!     FileStorage::new(&config.data_dir)?,
//!     TracingNotifier,
//!     &config.namespace,
//! )?;
//!
//! store.add_product(ProductId::new(1)).await;
//! println!("{} items", store.cart().item_count());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod notify;
pub mod storage;
pub mod store;
pub mod telemetry;

pub use catalog::{Catalog, CatalogError, HttpCatalog};
pub use config::{CartConfig, CatalogConfig, ConfigError, LogFormat};
pub use error::CartError;
pub use notify::{MemoryNotifier, Notice, Notifier, Operation, TracingNotifier};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::{CartStore, Outcome, UpdateProductAmount, storage_key};
pub use storecart_core::{Cart, LineItem, Product, ProductId, Quantity, StockInfo};
