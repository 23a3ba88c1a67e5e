//! Catalog API client.
//!
//! # Architecture
//!
//! - The Catalog API is the source of truth for products - no local copy
//! - Plain JSON over `reqwest`; every response is normalized into the
//!   canonical [`Product`] before anything else sees it
//! - In-memory caching via `moka` (TTL from `CATALOG_CACHE_TTL_SECS`)
//! - When the API is unreachable the listing and detail lookups can fall back
//!   to a small built-in product set
//!
//! # Example
//!
//! ```rust,ignore
//! use byte_mtaani_storefront::catalog::{CatalogClient, ProductQuery};
//!
//! let client = CatalogClient::new(&config.catalog)?;
//! let page = client.products_or_fallback(&ProductQuery::default()).await?;
//! let product = client.product_or_fallback(&page.products[0].id).await?;
//! ```

mod cache;
pub mod conversions;
pub mod fallback;
pub mod types;

use std::sync::Arc;

use byte_mtaani_core::{Product, ProductId};
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::CatalogConfig;

use cache::{CacheKey, CacheValue};
use conversions::{convert_product, convert_product_list};
pub use types::{ProductPage, ProductQuery, RawProduct, RawProductList};

/// Errors that can occur when talking to the Catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the Catalog API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The API answered with a non-success status.
    #[error("Upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// A product in the response could not be normalized.
    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    /// The configured base URL cannot hold a path.
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),
}

impl CatalogError {
    /// Whether the failure means the catalog could not answer at all, as
    /// opposed to answering "no such product".
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        !matches!(self, Self::NotFound(_) | Self::InvalidProduct(_))
    }
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the Catalog API.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
    fallback: bool,
}

impl CatalogClient {
    /// Create a new Catalog API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry a path or the HTTP client
    /// cannot be built.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        if config.base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidUrl(config.base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("byte-mtaani-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.base_url.clone(),
                api_token: config.api_token.clone(),
                cache,
                fallback: config.fallback,
            }),
        })
    }

    /// Build `{base}/{segments...}/` (the API expects trailing slashes).
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    /// Perform a GET and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        let mut request = self
            .inner
            .client
            .get(url.clone())
            .header("Accept", "application/json");
        if let Some(token) = &self.inner.api_token {
            request = request.header("Authorization", format!("Token {}", token.expose_secret()));
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(url.path().to_string()));
        }

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Upstream {
                status: status.as_u16(),
                message: response_text.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse Catalog API response"
            );
            CatalogError::Parse(e)
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Fetch one page of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn get_products(&self, query: &ProductQuery) -> Result<ProductPage, CatalogError> {
        let cache_key = CacheKey::Products(query.clone());
        if let Some(CacheValue::Products(page)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product listing");
            return Ok(page);
        }

        let mut url = self.endpoint(&["api", "products"])?;
        let pairs = query.pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let list: RawProductList = self.get_json(url).await?;
        let page = convert_product_list(list, query);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(page.clone()))
            .await;

        Ok(page)
    }

    /// Fetch a single product by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product does not exist, or
    /// another error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        let cache_key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.endpoint(&["api", "products", id.as_str()])?;
        let raw: RawProduct = self.get_json(url).await?;
        let product = convert_product(raw)?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Product listing, or the built-in set when the catalog is unavailable
    /// and fallback is enabled.
    ///
    /// # Errors
    ///
    /// Returns the upstream error when fallback is disabled.
    pub async fn products_or_fallback(
        &self,
        query: &ProductQuery,
    ) -> Result<ProductPage, CatalogError> {
        match self.get_products(query).await {
            Err(e) if self.inner.fallback && e.is_unavailable() => {
                tracing::warn!(error = %e, "Catalog unavailable, serving fallback products");
                Ok(fallback::page(query))
            }
            result => result,
        }
    }

    /// Product detail, or the matching built-in product when the catalog is
    /// unavailable and fallback is enabled.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if neither source has the product, or
    /// the upstream error when fallback is disabled.
    pub async fn product_or_fallback(&self, id: &ProductId) -> Result<Product, CatalogError> {
        match self.get_product(id).await {
            Err(e) if self.inner.fallback && e.is_unavailable() => {
                tracing::warn!(error = %e, product_id = %id, "Catalog unavailable, checking fallback products");
                fallback::find(id).ok_or_else(|| CatalogError::NotFound(id.to_string()))
            }
            result => result,
        }
    }
}
