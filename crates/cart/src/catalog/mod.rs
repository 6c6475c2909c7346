//! Catalog API access: product and stock records.
//!
//! # Architecture
//!
//! - [`Catalog`] is the read-only seam the cart store depends on
//! - [`HttpCatalog`] implements it over `reqwest` against a REST API
//! - The catalog is the source of truth for stock - records are fetched per
//!   operation and never cached
//!
//! # Endpoints
//!
//! - `GET /products/{id}` - product record (`id`, `title`, `price`, `image`)
//! - `GET /stock/{id}` - stock record (`id`, `amount`)

mod http;

use std::future::Future;

use storecart_core::{Product, ProductId, StockInfo};
use thiserror::Error;

pub use http::HttpCatalog;

/// Errors that can occur when reading from the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Read-only access to product and stock records.
pub trait Catalog: Send + Sync {
    /// Fetch the product record for `id`.
    fn product(&self, id: ProductId) -> impl Future<Output = Result<Product, CatalogError>> + Send;

    /// Fetch the stock record for `id`.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<StockInfo, CatalogError>> + Send;
}

impl<C: Catalog> Catalog for std::sync::Arc<C> {
    fn product(&self, id: ProductId) -> impl Future<Output = Result<Product, CatalogError>> + Send {
        (**self).product(id)
    }

    fn stock(&self, id: ProductId) -> impl Future<Output = Result<StockInfo, CatalogError>> + Send {
        (**self).stock(id)
    }
}
