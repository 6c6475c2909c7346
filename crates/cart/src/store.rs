//! The cart state container.
//!
//! [`CartStore`] owns the authoritative in-memory cart. It is constructed
//! explicitly at session start and injected into whatever drives it; several
//! isolated stores can coexist.
//!
//! # Operations
//!
//! - [`CartStore::add_product`] - add one unit, validated against stock
//! - [`CartStore::remove_product`] - drop a line
//! - [`CartStore::update_product_amount`] - set a line's quantity, validated against stock
//!
//! Each operation builds a new snapshot, writes it to storage, and only then
//! publishes it. Failures are converted into [`Notice`](crate::Notice)s
//! and never reach the caller; the `try_*` variants return them instead.
//!
//! Mutations are serialized: an operation holds the mutation lock across its
//! catalog reads, so two interleaved operations never start from the same
//! base snapshot. Reading the cart never waits on that lock.

use std::sync::{PoisonError, RwLock};

use storecart_core::{Cart, LineItem, Product, ProductId, Quantity, StockInfo};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::catalog::Catalog;
use crate::error::{CartError, Result};
use crate::notify::{Notifier, Operation};
use crate::storage::Storage;

/// Storage key holding the cart for `namespace`.
#[must_use]
pub fn storage_key(namespace: &str) -> String {
    format!("{namespace}:cart")
}

/// What a successful operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A new line was appended.
    Added,
    /// An existing line gained one unit.
    Incremented,
    /// A line's quantity was set.
    Updated,
    /// A line was removed.
    Removed,
    /// Nothing changed and nothing was written.
    Unchanged,
}

/// Request to set a line's quantity.
///
/// `amount` is signed: non-positive values are ignored rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i64,
}

/// Cart state manager.
pub struct CartStore<C, S, N> {
    catalog: C,
    storage: S,
    notifier: N,
    key: String,
    snapshot: RwLock<Cart>,
    mutation: Mutex<()>,
}

impl<C, S, N> CartStore<C, S, N>
where
    C: Catalog,
    S: Storage,
    N: Notifier,
{
    /// Open the cart stored under `<namespace>:cart`.
    ///
    /// A missing key yields an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CorruptSnapshot` if the stored value is not a valid
    /// cart, or `CartError::Storage` if storage cannot be read.
    pub fn open(catalog: C, storage: S, notifier: N, namespace: &str) -> Result<Self> {
        let key = storage_key(namespace);
        let cart = load(&storage, &key)?;
        info!(key = %key, lines = cart.len(), "Cart loaded");
        Ok(Self::with_cart(catalog, storage, notifier, key, cart))
    }

    /// Like [`open`](Self::open), but replaces a corrupt snapshot with an
    /// empty cart instead of failing.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if storage cannot be read or the empty
    /// cart cannot be written.
    pub fn open_or_reset(catalog: C, storage: S, notifier: N, namespace: &str) -> Result<Self> {
        let key = storage_key(namespace);
        let cart = match load(&storage, &key) {
            Ok(cart) => cart,
            Err(err @ CartError::CorruptSnapshot { .. }) => {
                warn!(error = %err, "Discarding corrupt cart snapshot");
                let empty = Cart::empty();
                storage.set(&key, &encode(&empty)?)?;
                empty
            }
            Err(err) => return Err(err),
        };
        info!(key = %key, lines = cart.len(), "Cart loaded");
        Ok(Self::with_cart(catalog, storage, notifier, key, cart))
    }

    fn with_cart(catalog: C, storage: S, notifier: N, key: String, cart: Cart) -> Self {
        Self {
            catalog,
            storage,
            notifier,
            key,
            snapshot: RwLock::new(cart),
            mutation: Mutex::new(()),
        }
    }

    /// The current cart snapshot.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The storage key this store persists to.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Add one unit of `product_id`, notifying on failure.
    pub async fn add_product(&self, product_id: ProductId) {
        if let Err(err) = self.try_add_product(product_id).await {
            self.report(Operation::Add, product_id, &err);
        }
    }

    /// Remove the line for `product_id`, notifying on failure.
    pub async fn remove_product(&self, product_id: ProductId) {
        if let Err(err) = self.try_remove_product(product_id).await {
            self.report(Operation::Remove, product_id, &err);
        }
    }

    /// Set the quantity of a line, notifying on failure.
    pub async fn update_product_amount(&self, request: UpdateProductAmount) {
        if let Err(err) = self.try_update_product_amount(request).await {
            self.report(Operation::UpdateAmount, request.product_id, &err);
        }
    }

    /// Add one unit of `product_id`.
    ///
    /// Appends a new line with amount 1 if the product is not in the cart,
    /// otherwise increments the existing line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::StockExceeded` if the resulting amount exceeds
    /// stock, or the catalog/storage error that aborted the operation. The
    /// cart is unchanged on error.
    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn try_add_product(&self, product_id: ProductId) -> Result<Outcome> {
        let _guard = self.mutation.lock().await;

        let (product, stock) = tokio::try_join!(
            self.catalog.product(product_id),
            self.catalog.stock(product_id)
        )?;

        let current = self.cart();
        let (next, outcome) = if let Some(existing) = current.get(product_id) {
            let requested = existing
                .amount
                .checked_increment()
                .ok_or(CartError::StockExceeded {
                    product_id,
                    requested: i64::MAX,
                    available: stock.amount,
                })?;
            ensure_in_stock(product_id, requested.as_i64(), &stock)?;
            let next = current
                .with_amount(product_id, requested)
                .ok_or(CartError::NotInCart(product_id))?;
            (next, Outcome::Incremented)
        } else {
            ensure_in_stock(product_id, Quantity::ONE.as_i64(), &stock)?;
            // Key the line by the requested id even if the record disagrees
            let product = Product {
                id: product_id,
                ..product
            };
            let next = current.with_appended(LineItem::new(product, Quantity::ONE))?;
            (next, Outcome::Added)
        };

        self.commit(next)?;
        debug!(?outcome, "Product added");
        Ok(outcome)
    }

    /// Remove the line for `product_id`, keeping other lines in order.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInCart` if there is no such line, or
    /// `CartError::Storage` if the new snapshot cannot be persisted.
    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn try_remove_product(&self, product_id: ProductId) -> Result<Outcome> {
        let _guard = self.mutation.lock().await;

        let next = self
            .cart()
            .without(product_id)
            .ok_or(CartError::NotInCart(product_id))?;

        self.commit(next)?;
        debug!("Product removed");
        Ok(Outcome::Removed)
    }

    /// Set the quantity of an existing line.
    ///
    /// A non-positive amount is a no-op: no catalog read, no write.
    ///
    /// # Errors
    ///
    /// Returns `CartError::StockExceeded` if the amount exceeds stock,
    /// `CartError::NotInCart` if there is no such line, or the
    /// catalog/storage error that aborted the operation.
    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn try_update_product_amount(&self, request: UpdateProductAmount) -> Result<Outcome> {
        let UpdateProductAmount { product_id, amount } = request;
        if amount <= 0 {
            debug!("Ignoring non-positive amount");
            return Ok(Outcome::Unchanged);
        }

        let _guard = self.mutation.lock().await;

        let stock = self.catalog.stock(product_id).await?;
        ensure_in_stock(product_id, amount, &stock)?;
        let amount = Quantity::try_from(amount)?;

        let next = self
            .cart()
            .with_amount(product_id, amount)
            .ok_or(CartError::NotInCart(product_id))?;

        self.commit(next)?;
        debug!("Product amount updated");
        Ok(Outcome::Updated)
    }

    /// Persist `next`, then publish it as the current snapshot.
    fn commit(&self, next: Cart) -> Result<()> {
        self.storage.set(&self.key, &encode(&next)?)?;
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next;
        Ok(())
    }

    fn report(&self, operation: Operation, product_id: ProductId, err: &CartError) {
        warn!(
            %operation,
            %product_id,
            error = %err,
            "Cart operation failed"
        );
        for notice in err.notices(operation) {
            self.notifier.notify(notice);
        }
    }
}

fn load<S: Storage>(storage: &S, key: &str) -> Result<Cart> {
    match storage.get(key)? {
        Some(raw) => serde_json::from_str(&raw).map_err(|source| CartError::CorruptSnapshot {
            key: key.to_string(),
            source,
        }),
        None => Ok(Cart::empty()),
    }
}

fn encode(cart: &Cart) -> Result<String> {
    serde_json::to_string(cart).map_err(CartError::Encode)
}

fn ensure_in_stock(product_id: ProductId, requested: i64, stock: &StockInfo) -> Result<()> {
    if stock.covers(requested) {
        Ok(())
    } else {
        Err(CartError::StockExceeded {
            product_id,
            requested,
            available: stock.amount,
        })
    }
}
