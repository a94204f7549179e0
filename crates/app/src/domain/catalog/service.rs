//! Catalog service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use storefront::products::{Product, ProductUuid};
use tracing::instrument;

use crate::domain::catalog::{
    errors::CatalogServiceError,
    query::{self, CategorySummary, ProductPage, ProductQuery},
    repository::ProductsRepository,
};

#[derive(Clone)]
pub struct DefaultCatalogService {
    products: Arc<dyn ProductsRepository>,
}

impl std::fmt::Debug for DefaultCatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultCatalogService").finish_non_exhaustive()
    }
}

impl DefaultCatalogService {
    #[must_use]
    pub fn new(products: Arc<dyn ProductsRepository>) -> Self {
        Self { products }
    }
}

#[async_trait]
impl CatalogService for DefaultCatalogService {
    #[instrument(skip(self))]
    async fn list_products(&self, query: ProductQuery) -> Result<ProductPage, CatalogServiceError> {
        let products = self.products.list().await?;

        Ok(query.run(products))
    }

    #[instrument(skip(self))]
    async fn get_product(&self, uuid: ProductUuid) -> Result<Product, CatalogServiceError> {
        self.products
            .get(uuid)
            .await?
            .filter(Product::is_active)
            .ok_or_else(|| CatalogServiceError::NotFound(uuid.to_string()))
    }

    #[instrument(skip(self))]
    async fn get_product_by_slug(&self, slug: &str) -> Result<Product, CatalogServiceError> {
        self.products
            .get_by_slug(slug)
            .await?
            .filter(Product::is_active)
            .ok_or_else(|| CatalogServiceError::NotFound(slug.to_string()))
    }

    #[instrument(skip(self))]
    async fn categories(&self) -> Result<Vec<CategorySummary>, CatalogServiceError> {
        let products = self.products.list().await?;

        Ok(query::categories(&products))
    }
}

#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Filter, sort and paginate listed products.
    async fn list_products(&self, query: ProductQuery) -> Result<ProductPage, CatalogServiceError>;

    /// Retrieve a listed product.
    async fn get_product(&self, uuid: ProductUuid) -> Result<Product, CatalogServiceError>;

    /// Retrieve a listed product by slug.
    async fn get_product_by_slug(&self, slug: &str) -> Result<Product, CatalogServiceError>;

    /// Categories that contain listed products.
    async fn categories(&self) -> Result<Vec<CategorySummary>, CatalogServiceError>;
}
