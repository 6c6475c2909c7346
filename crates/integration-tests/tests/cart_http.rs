//! Integration tests for the cart store over the HTTP catalog and file
//! storage.
//!
//! These tests run the real `HttpCatalog` against an in-process stub of the
//! catalog API and persist to a temporary directory.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use storecart::{
    CartError, CartStore, Catalog, CatalogConfig, CatalogError, FileStorage, HttpCatalog,
    MemoryNotifier, Notice, Outcome, ProductId, Storage, UpdateProductAmount,
};
use storecart_integration_tests::{Behavior, CatalogStub, temp_data_dir};

const NAMESPACE: &str = "@RocketShoes";

type HttpStore = CartStore<HttpCatalog, FileStorage, MemoryNotifier>;

fn catalog_for(stub: &CatalogStub, timeout: Duration) -> HttpCatalog {
    HttpCatalog::new(&CatalogConfig {
        api_url: stub.base_url(),
        request_timeout: timeout,
    })
    .unwrap()
}

fn open(stub: &CatalogStub, storage: &FileStorage) -> (HttpStore, MemoryNotifier) {
    let notifier = MemoryNotifier::new();
    let store = CartStore::open(
        catalog_for(stub, Duration::from_secs(5)),
        storage.clone(),
        notifier.clone(),
        NAMESPACE,
    )
    .unwrap();
    (store, notifier)
}

async fn sneakers() -> CatalogStub {
    CatalogStub::start()
        .await
        .with_product(1, "Tênis de Caminhada Leve Confortável", 179.9, 3)
        .with_product(2, "Tênis VR Caminhada Confortável Detalhes Couro Masculino", 139.9, 5)
        .with_product(3, "Tênis Adidas Duramo Lite 2.0", 219.9, 1)
}

fn amounts(store: &HttpStore) -> Vec<(i32, u64)> {
    store
        .cart()
        .items()
        .iter()
        .map(|item| (item.id().as_i32(), item.amount.get()))
        .collect()
}

// =============================================================================
// HttpCatalog
// =============================================================================

#[tokio::test]
async fn test_catalog_reads_product_and_stock() {
    let stub = sneakers().await;
    let catalog = catalog_for(&stub, Duration::from_secs(5));

    let product = catalog.product(ProductId::new(2)).await.unwrap();
    assert_eq!(product.id, ProductId::new(2));
    assert_eq!(
        product.title,
        "Tênis VR Caminhada Confortável Detalhes Couro Masculino"
    );
    assert_eq!(product.price.to_string(), "139.9");

    let stock = catalog.stock(ProductId::new(2)).await.unwrap();
    assert_eq!(stock.amount, 5);
}

#[tokio::test]
async fn test_catalog_error_variants() {
    let stub = sneakers().await;
    let catalog = catalog_for(&stub, Duration::from_secs(5));

    let err = catalog.product(ProductId::new(99)).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(ref path) if path == "/products/99"));

    stub.set_behavior(1, Behavior::ServerError);
    let err = catalog.stock(ProductId::new(1)).await.unwrap_err();
    assert!(matches!(err, CatalogError::Api { status: 500, .. }));

    stub.set_behavior(2, Behavior::Malformed);
    let err = catalog.product(ProductId::new(2)).await.unwrap_err();
    assert!(matches!(err, CatalogError::Parse(_)));
}

// =============================================================================
// CartStore over HTTP
// =============================================================================

#[tokio::test]
async fn test_add_persists_and_reloads() {
    let stub = sneakers().await;
    let dir = temp_data_dir();
    let storage = FileStorage::new(dir.path()).unwrap();

    let (store, notifier) = open(&stub, &storage);
    store.add_product(ProductId::new(2)).await;
    store.add_product(ProductId::new(1)).await;
    store.add_product(ProductId::new(2)).await;
    assert_eq!(amounts(&store), vec![(2, 2), (1, 1)]);
    assert!(notifier.notices().is_empty());

    // Stored under the namespaced key as a JSON array
    let raw = storage.get("@RocketShoes:cart").unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value.as_array().map(Vec::len), Some(2));
    assert_eq!(value[0]["id"], 2);
    assert_eq!(value[0]["amount"], 2);
    assert_eq!(value[1]["title"], "Tênis de Caminhada Leve Confortável");

    // A new session on the same directory sees the same cart
    let (reopened, _) = open(&stub, &FileStorage::new(dir.path()).unwrap());
    assert_eq!(reopened.cart(), store.cart());
    assert_eq!(reopened.cart().subtotal().to_string(), "459.7");
}

#[tokio::test]
async fn test_add_beyond_stock() {
    let stub = sneakers().await;
    let dir = temp_data_dir();
    let storage = FileStorage::new(dir.path()).unwrap();
    let (store, notifier) = open(&stub, &storage);

    store.add_product(ProductId::new(3)).await;
    store.add_product(ProductId::new(3)).await;

    assert_eq!(amounts(&store), vec![(3, 1)]);
    assert_eq!(notifier.notices(), vec![Notice::OutOfStock, Notice::AddFailed]);
}

#[tokio::test]
async fn test_add_unknown_product() {
    let stub = sneakers().await;
    let dir = temp_data_dir();
    let storage = FileStorage::new(dir.path()).unwrap();
    let (store, notifier) = open(&stub, &storage);

    store.add_product(ProductId::new(404)).await;

    assert!(store.cart().is_empty());
    assert_eq!(notifier.notices(), vec![Notice::AddFailed]);
    assert!(storage.get(store.storage_key()).unwrap().is_none());
}

#[tokio::test]
async fn test_add_when_catalog_fails() {
    let stub = sneakers().await;
    stub.set_behavior(1, Behavior::ServerError);
    let dir = temp_data_dir();
    let storage = FileStorage::new(dir.path()).unwrap();
    let (store, notifier) = open(&stub, &storage);

    let err = store.try_add_product(ProductId::new(1)).await.unwrap_err();
    assert!(matches!(err, CartError::Catalog(CatalogError::Api { status: 500, .. })));

    store.add_product(ProductId::new(1)).await;
    assert!(store.cart().is_empty());
    assert_eq!(notifier.notices(), vec![Notice::AddFailed]);
}

#[tokio::test]
async fn test_hung_catalog_request_times_out() {
    let stub = sneakers().await;
    stub.set_behavior(1, Behavior::Delay(Duration::from_secs(5)));
    let dir = temp_data_dir();
    let notifier = MemoryNotifier::new();
    let store = CartStore::open(
        catalog_for(&stub, Duration::from_millis(200)),
        FileStorage::new(dir.path()).unwrap(),
        notifier.clone(),
        NAMESPACE,
    )
    .unwrap();

    let started = std::time::Instant::now();
    store.add_product(ProductId::new(1)).await;

    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(store.cart().is_empty());
    assert_eq!(notifier.notices(), vec![Notice::AddFailed]);
}

#[tokio::test]
async fn test_update_reads_current_stock() {
    let stub = sneakers().await;
    let dir = temp_data_dir();
    let storage = FileStorage::new(dir.path()).unwrap();
    let (store, notifier) = open(&stub, &storage);

    store.add_product(ProductId::new(2)).await;
    let outcome = store
        .try_update_product_amount(UpdateProductAmount {
            product_id: ProductId::new(2),
            amount: 5,
        })
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Updated);

    // Stock drops between operations; the next update is checked against it
    stub.set_stock(2, 2);
    store
        .update_product_amount(UpdateProductAmount {
            product_id: ProductId::new(2),
            amount: 4,
        })
        .await;

    assert_eq!(amounts(&store), vec![(2, 5)]);
    assert_eq!(
        notifier.notices(),
        vec![Notice::OutOfStock, Notice::UpdateFailed]
    );
}

#[tokio::test]
async fn test_update_non_positive_makes_no_requests() {
    let stub = sneakers().await;
    let dir = temp_data_dir();
    let storage = FileStorage::new(dir.path()).unwrap();
    let (store, notifier) = open(&stub, &storage);

    store.add_product(ProductId::new(1)).await;
    let requests = stub.requests();
    let persisted = storage.get(store.storage_key()).unwrap();

    store
        .update_product_amount(UpdateProductAmount {
            product_id: ProductId::new(1),
            amount: 0,
        })
        .await;

    assert_eq!(stub.requests(), requests);
    assert_eq!(storage.get(store.storage_key()).unwrap(), persisted);
    assert!(notifier.notices().is_empty());
}

#[tokio::test]
async fn test_remove_is_persisted() {
    let stub = sneakers().await;
    let dir = temp_data_dir();
    let storage = FileStorage::new(dir.path()).unwrap();
    let (store, notifier) = open(&stub, &storage);

    for id in [1, 2, 3] {
        store.add_product(ProductId::new(id)).await;
    }
    store.remove_product(ProductId::new(1)).await;
    store.remove_product(ProductId::new(1)).await;

    assert_eq!(amounts(&store), vec![(2, 1), (3, 1)]);
    assert_eq!(notifier.notices(), vec![Notice::RemoveFailed]);

    let (reopened, _) = open(&stub, &FileStorage::new(dir.path()).unwrap());
    assert_eq!(reopened.cart(), store.cart());
}

#[tokio::test]
async fn test_corrupt_file_blocks_open_until_reset() {
    let stub = sneakers().await;
    let dir = temp_data_dir();
    let storage = FileStorage::new(dir.path()).unwrap();
    storage.set("@RocketShoes:cart", "{\"id\": 1").unwrap();

    let result = CartStore::open(
        catalog_for(&stub, Duration::from_secs(5)),
        storage.clone(),
        MemoryNotifier::new(),
        NAMESPACE,
    );
    assert!(matches!(result, Err(CartError::CorruptSnapshot { .. })));

    let store = CartStore::open_or_reset(
        catalog_for(&stub, Duration::from_secs(5)),
        storage.clone(),
        MemoryNotifier::new(),
        NAMESPACE,
    )
    .unwrap();
    assert!(store.cart().is_empty());
    store.add_product(ProductId::new(1)).await;
    assert_eq!(store.cart().len(), 1);
}
