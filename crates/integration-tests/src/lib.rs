//! Integration tests for storecart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p storecart-integration-tests
//! ```
//!
//! No external services are needed: [`CatalogStub`] serves the catalog API
//! from an in-process axum server on an ephemeral port, and
//! [`temp_data_dir`] gives each test its own storage directory.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tempfile::TempDir;
use tokio::task::JoinHandle;
use url::Url;

/// How the stub answers requests for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Behavior {
    /// Serve the records normally.
    #[default]
    Normal,
    /// Answer `500 Internal Server Error`.
    ServerError,
    /// Answer `200` with a body that is not JSON.
    Malformed,
    /// Wait this long before answering.
    Delay(Duration),
}

#[derive(Default)]
struct StubInner {
    products: HashMap<i32, serde_json::Value>,
    stock: HashMap<i32, i64>,
    behavior: HashMap<i32, Behavior>,
}

#[derive(Clone, Default)]
struct StubState {
    inner: Arc<Mutex<StubInner>>,
    requests: Arc<AtomicUsize>,
}

impl StubState {
    fn with<T>(&self, f: impl FnOnce(&mut StubInner) -> T) -> T {
        f(&mut self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// In-process stand-in for the catalog REST API.
///
/// Serves `GET /products/{id}` and `GET /stock/{id}`. The server is shut
/// down when the stub is dropped.
pub struct CatalogStub {
    base_url: Url,
    state: StubState,
    handle: JoinHandle<()>,
}

impl CatalogStub {
    /// Start a stub server on an ephemeral local port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = StubState::default();
        let app = Router::new()
            .route("/products/{id}", get(product))
            .route("/stock/{id}", get(stock))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub listener");
        let addr = listener.local_addr().expect("Listener has no address");
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let base_url = Url::parse(&format!("http://{addr}")).expect("Stub URL is valid");
        Self {
            base_url,
            state,
            handle,
        }
    }

    /// Base URL to point an `HttpCatalog` at.
    #[must_use]
    pub fn base_url(&self) -> Url {
        self.base_url.clone()
    }

    /// Register a product with `stock` units available.
    #[must_use]
    pub fn with_product(self, id: i32, title: &str, price: f64, stock: i64) -> Self {
        let record = serde_json::json!({
            "id": id,
            "title": title,
            "price": price,
            "image": format!("https://images.example.com/{id}.jpg"),
        });
        self.state.with(|inner| {
            inner.products.insert(id, record);
            inner.stock.insert(id, stock);
        });
        self
    }

    /// Change the stock of a product.
    pub fn set_stock(&self, id: i32, amount: i64) {
        self.state.with(|inner| {
            inner.stock.insert(id, amount);
        });
    }

    /// Change how requests for `id` are answered.
    pub fn set_behavior(&self, id: i32, behavior: Behavior) {
        self.state.with(|inner| {
            inner.behavior.insert(id, behavior);
        });
    }

    /// Number of requests served so far.
    #[must_use]
    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }
}

impl Drop for CatalogStub {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Create a fresh data directory, removed when the guard is dropped.
///
/// # Panics
///
/// Panics if the directory cannot be created.
#[must_use]
pub fn temp_data_dir() -> TempDir {
    tempfile::Builder::new()
        .prefix("storecart-it-")
        .tempdir()
        .expect("Failed to create temp dir")
}

async fn product(State(state): State<StubState>, Path(id): Path<i32>) -> Response {
    let record = state.with(|inner| inner.products.get(&id).cloned());
    respond(&state, id, record).await
}

async fn stock(State(state): State<StubState>, Path(id): Path<i32>) -> Response {
    let record = state.with(|inner| {
        inner
            .stock
            .get(&id)
            .map(|amount| serde_json::json!({ "id": id, "amount": amount }))
    });
    respond(&state, id, record).await
}

async fn respond(state: &StubState, id: i32, record: Option<serde_json::Value>) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let behavior = state.with(|inner| inner.behavior.get(&id).copied().unwrap_or_default());

    match behavior {
        Behavior::ServerError => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "catalog unavailable").into_response();
        }
        Behavior::Malformed => return (StatusCode::OK, "<html>oops</html>").into_response(),
        Behavior::Delay(delay) => tokio::time::sleep(delay).await,
        Behavior::Normal => {}
    }

    match record {
        Some(record) => Json(record).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
