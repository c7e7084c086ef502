//! Integration tests for RocketShoes.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! No external services are needed: [`CatalogServer`] serves the catalog and
//! stock API from an in-process `axum` router on an ephemeral port.
//!
//! # Test Categories
//!
//! - `cart_scenarios` - Store behaviour over in-memory catalog and file storage
//! - `http_catalog` - HTTP catalog client and the store end to end

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rocketshoes_cart::CartConfig;
use rocketshoes_core::{Product, ProductId, StockEntry};
use rust_decimal::Decimal;
use tokio::task::JoinHandle;

/// A product fixture priced in cents.
#[must_use]
pub fn product(id: i32, title: &str, cents: i64) -> Product {
    Product {
        id: ProductId::new(id),
        title: title.to_string(),
        price: Decimal::new(cents, 2),
        image: format!("https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux/tenis{id}.jpg"),
    }
}

/// Data and failure modes served by [`CatalogServer`].
#[derive(Debug, Clone, Default)]
pub struct CatalogFixture {
    products: Vec<Product>,
    stock: Vec<StockEntry>,
    stock_status: Option<StatusCode>,
    misrouted: Vec<(ProductId, Product)>,
}

impl CatalogFixture {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve a product and its available amount.
    #[must_use]
    pub fn with_product(mut self, product: Product, available_amount: i32) -> Self {
        self.stock.push(StockEntry::new(product.id, available_amount));
        self.products.push(product);
        self
    }

    /// Answer `GET /products/{requested}` with `product`, whatever its ID.
    #[must_use]
    pub fn with_misrouted_product(mut self, requested: i32, product: Product) -> Self {
        self.misrouted.push((ProductId::new(requested), product));
        self
    }

    /// Answer `GET /stock` with this status and no body.
    #[must_use]
    pub fn with_stock_status(mut self, status: StatusCode) -> Self {
        self.stock_status = Some(status);
        self
    }
}

#[derive(Clone)]
struct ServerState {
    fixture: Arc<CatalogFixture>,
    product_hits: Arc<AtomicUsize>,
    last_authorization: Arc<Mutex<Option<String>>>,
}

impl ServerState {
    fn record_auth(&self, headers: &HeaderMap) {
        let value = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        if let Ok(mut last) = self.last_authorization.lock() {
            *last = value;
        }
    }
}

async fn stock(State(state): State<ServerState>, headers: HeaderMap) -> Response {
    state.record_auth(&headers);
    match state.fixture.stock_status {
        Some(status) => status.into_response(),
        None => Json(state.fixture.stock.clone()).into_response(),
    }
}

async fn product_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    state.record_auth(&headers);
    state.product_hits.fetch_add(1, Ordering::SeqCst);
    let id = ProductId::new(id);
    let misrouted = state
        .fixture
        .misrouted
        .iter()
        .find(|(requested, _)| *requested == id)
        .map(|(_, product)| product);
    misrouted
        .or_else(|| state.fixture.products.iter().find(|p| p.id == id))
        .map_or_else(
            || (StatusCode::NOT_FOUND, "{}").into_response(),
            |p| Json(p.clone()).into_response(),
        )
}

/// In-process catalog/stock API.
///
/// The server task is aborted when this value is dropped.
pub struct CatalogServer {
    addr: SocketAddr,
    product_hits: Arc<AtomicUsize>,
    last_authorization: Arc<Mutex<Option<String>>>,
    handle: JoinHandle<()>,
}

impl CatalogServer {
    /// Bind an ephemeral port and start serving `fixture`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn(fixture: CatalogFixture) -> Self {
        let state = ServerState {
            fixture: Arc::new(fixture),
            product_hits: Arc::new(AtomicUsize::new(0)),
            last_authorization: Arc::new(Mutex::new(None)),
        };
        let product_hits = state.product_hits.clone();
        let last_authorization = state.last_authorization.clone();

        let app = Router::new()
            .route("/stock", get(stock))
            .route("/products/{id}", get(product_by_id))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no local address");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            product_hits,
            last_authorization,
            handle,
        }
    }

    /// Base URL of the server.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of `GET /products/{id}` requests served.
    #[must_use]
    pub fn product_hits(&self) -> usize {
        self.product_hits.load(Ordering::SeqCst)
    }

    /// `Authorization` header of the most recent request.
    #[must_use]
    pub fn last_authorization(&self) -> Option<String> {
        self.last_authorization
            .lock()
            .ok()
            .and_then(|last| last.clone())
    }

    /// Cart configuration pointing at this server and `storage_path`.
    ///
    /// # Panics
    ///
    /// Panics if the generated configuration is rejected.
    #[must_use]
    pub fn config(&self, storage_path: &std::path::Path, api_token: Option<&str>) -> CartConfig {
        let base_url = self.base_url();
        let storage_path = storage_path.display().to_string();
        let api_token = api_token.map(String::from);
        CartConfig::from_lookup(|key| match key {
            "ROCKETSHOES_API_URL" => Some(base_url.clone()),
            "ROCKETSHOES_STORAGE_PATH" => Some(storage_path.clone()),
            "ROCKETSHOES_API_TOKEN" => api_token.clone(),
            "ROCKETSHOES_REQUEST_TIMEOUT_SECS" => Some("5".to_string()),
            _ => None,
        })
        .expect("Test configuration is valid")
    }
}

impl Drop for CatalogServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
