//! Product catalog endpoints.
//!
//! Catalog reads are cached with `moka` (5-minute TTL). Search queries are
//! not cached, and any admin mutation invalidates the whole cache - the
//! catalog is small enough that precision there buys nothing. Cart and
//! order data never pass through here.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use kirana_core::ProductId;

use crate::api::ApiGateway;
use crate::error::Result;
use crate::types::{Product, ProductInput, ProductPage};

/// Cached catalog values.
#[derive(Clone)]
enum CacheValue {
    Products(Vec<Product>),
    Product(Box<Product>),
    Categories(Vec<String>),
}

/// Client for `/products`.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    gateway: ApiGateway,
    cache: Cache<String, CacheValue>,
}

impl CatalogService {
    /// Create the service over a gateway.
    #[must_use]
    pub fn new(gateway: ApiGateway) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogInner { gateway, cache }),
        }
    }

    /// List products, optionally filtered by category and/or name search.
    ///
    /// Category-only listings are cached; name searches always go to the
    /// backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        category: Option<&str>,
        name: Option<&str>,
    ) -> Result<Vec<Product>> {
        let cache_key = format!("products:{}", category.unwrap_or(""));

        if name.is_none()
            && let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await
        {
            debug!("cache hit for product listing");
            return Ok(products);
        }

        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(category) = category {
            query.push(("category", category.to_owned()));
        }
        if let Some(name) = name {
            query.push(("name", name.to_owned()));
        }

        let page: ProductPage = self.inner.gateway.get_query("products", &query).await?;

        if name.is_none() {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Products(page.content.clone()))
                .await;
        }

        Ok(page.content)
    }

    /// All known category names.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>> {
        let cache_key = "categories".to_owned();

        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<String> = self.inner.gateway.get("products/categories").await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: ProductId) -> Result<Product> {
        let cache_key = format!("product:{id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("cache hit for product");
            return Ok(*product);
        }

        let product: Product = self.inner.gateway.get(&format!("products/{id}")).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Featured products for the home carousel.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn featured(&self) -> Result<Vec<Product>> {
        let cache_key = "featured".to_owned();

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("cache hit for featured products");
            return Ok(products);
        }

        let products: Vec<Product> = self.inner.gateway.get("products/featured").await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    // =========================================================================
    // Admin CRUD
    // =========================================================================

    /// Create a product (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the caller is not an admin.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &ProductInput) -> Result<Product> {
        let product = self.inner.gateway.post("products", input).await?;
        self.invalidate_all();
        Ok(product)
    }

    /// Update a product (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the caller is not an admin.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn update(&self, id: ProductId, input: &ProductInput) -> Result<Product> {
        let product = self
            .inner
            .gateway
            .put(&format!("products/{id}"), input)
            .await?;
        self.invalidate_all();
        Ok(product)
    }

    /// Delete a product (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the caller is not an admin.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<()> {
        self.inner
            .gateway
            .delete_empty(&format!("products/{id}"))
            .await?;
        self.invalidate_all();
        Ok(())
    }

    /// Drop all cached catalog data.
    pub fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
    }
}
