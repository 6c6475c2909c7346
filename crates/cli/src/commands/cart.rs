//! Cart commands.
//!
//! Each invocation opens the persisted cart, applies at most one operation,
//! and prints the resulting cart.
//!
//! # Environment Variables
//!
//! See [`storecart::config`] - `CART_API_URL`, `CART_NAMESPACE`,
//! `CART_DATA_DIR`, `CART_REQUEST_TIMEOUT_SECS`.

use std::fmt::Write as _;

use storecart::{
    Cart, CartConfig, CartError, CartStore, CatalogError, FileStorage, HttpCatalog, ProductId,
    StorageError, TracingNotifier, UpdateProductAmount,
};
use thiserror::Error;

/// Errors that stop a command before the cart can be used.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Catalog client could not be built.
    #[error("Catalog setup failed: {0}")]
    Catalog(#[from] CatalogError),

    /// Data directory could not be opened.
    #[error("Storage setup failed: {0}")]
    Storage(#[from] StorageError),

    /// Stored cart could not be loaded.
    #[error("{0} (rerun with --reset to start from an empty cart)")]
    Open(#[from] CartError),
}

/// A cart command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Show,
    Add(ProductId),
    Remove(ProductId),
    Update(ProductId, i64),
}

/// Run `command` against the cart described by `config`.
///
/// # Errors
///
/// Returns `CommandError` if the catalog client, storage directory, or
/// stored cart cannot be opened. Failed cart operations are notices, not
/// errors.
pub async fn run(command: Command, config: &CartConfig, reset: bool) -> Result<(), CommandError> {
    let catalog = HttpCatalog::new(&config.catalog)?;
    let storage = FileStorage::new(&config.data_dir)?;
    tracing::debug!(
        api_url = %catalog.base_url(),
        data_dir = %storage.dir().display(),
        "Opening cart"
    );

    let store = if reset {
        CartStore::open_or_reset(catalog, storage, TracingNotifier, &config.namespace)?
    } else {
        CartStore::open(catalog, storage, TracingNotifier, &config.namespace)?
    };

    match command {
        Command::Show => {}
        Command::Add(id) => store.add_product(id).await,
        Command::Remove(id) => store.remove_product(id).await,
        Command::Update(id, amount) => {
            store
                .update_product_amount(UpdateProductAmount {
                    product_id: id,
                    amount,
                })
                .await;
        }
    }

    print_cart(&store.cart());
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_cart(cart: &Cart) {
    print!("{}", render(cart));
}

/// Render the cart as a plain-text table.
fn render(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let mut out = String::new();
    for item in cart.items() {
        let title = if item.product.title.is_empty() {
            "(untitled)"
        } else {
            item.product.title.as_str()
        };
        let _ = writeln!(
            out,
            "{:>6}  {:<40}  x{:<4}  ${:.2}",
            item.id().as_i32(),
            title,
            item.amount,
            item.line_price()
        );
    }
    let _ = writeln!(
        out,
        "{} items, subtotal ${:.2}",
        cart.item_count(),
        cart.subtotal()
    );
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use storecart::{LineItem, Product, Quantity};

    use super::*;

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&Cart::empty()), "Cart is empty\n");
    }

    #[test]
    fn test_render_lines_and_totals() {
        let cart = Cart::from_items(vec![
            LineItem::new(
                Product {
                    id: ProductId::new(1),
                    title: "Running Shoe".to_string(),
                    price: "139.90".parse().unwrap(),
                    image: String::new(),
                },
                Quantity::new(2).unwrap(),
            ),
            LineItem::new(Product::bare(ProductId::new(2)), Quantity::ONE),
        ])
        .unwrap();

        let output = render(&cart);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Running Shoe"));
        assert!(lines[0].contains("x2"));
        assert!(lines[0].ends_with("$279.80"));
        assert!(lines[1].contains("(untitled)"));
        assert_eq!(lines[2], "3 items, subtotal $279.80");
    }
}
