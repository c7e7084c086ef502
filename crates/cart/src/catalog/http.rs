//! HTTP client for the catalog/stock JSON API.
//!
//! Uses `reqwest` for HTTP. Products are cached with `moka` (TTL from
//! [`CartConfig::product_cache_ttl`]); the stock snapshot is always fetched
//! fresh.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use rocketshoes_core::{Product, ProductId, StockEntry};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use super::{ApiError, CatalogApi};
use crate::config::CartConfig;

/// Client for the catalog/stock API.
#[derive(Clone)]
pub struct HttpCatalog {
    inner: Arc<HttpCatalogInner>,
}

struct HttpCatalogInner {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<SecretString>,
    products: Cache<ProductId, Product>,
}

impl HttpCatalog {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &CartConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let products = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.product_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(HttpCatalogInner {
                client,
                base_url: config.api_url.clone(),
                api_token: config.api_token.clone(),
                products,
            }),
        })
    }

    /// Build an endpoint URL below the configured base, keeping any base path.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET a JSON resource.
    async fn get_json<T: DeserializeOwned>(&self, url: Url, resource: &str) -> Result<T, ApiError> {
        let mut request = self.inner.client.get(url);
        if let Some(token) = &self.inner.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(resource.to_string()));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: response_text.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse catalog API response"
            );
            ApiError::Parse(e)
        })
    }
}

#[async_trait]
impl CatalogApi for HttpCatalog {
    #[instrument(skip(self))]
    async fn fetch_stock_snapshot(&self) -> Result<Vec<StockEntry>, ApiError> {
        let url = self.endpoint(&["stock"]);
        let stock: Vec<StockEntry> = self.get_json(url, "stock").await?;
        debug!(entries = stock.len(), "Fetched stock snapshot");
        Ok(stock)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn fetch_product(&self, id: ProductId) -> Result<Product, ApiError> {
        if let Some(product) = self.inner.products.get(&id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let id_segment = id.to_string();
        let url = self.endpoint(&["products", id_segment.as_str()]);
        let product: Product = self.get_json(url, &format!("product {id}")).await?;
        if product.id != id {
            warn!(returned = %product.id, "Catalog returned a different product");
            return Err(ApiError::IdMismatch {
                requested: id,
                returned: product.id,
            });
        }

        self.inner.products.insert(id, product.clone()).await;

        Ok(product)
    }
}
