//! Products Repository

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use storefront::products::{Product, ProductUuid};
use tracing::debug;

use crate::storage::{
    DocumentStore, StorageError,
    documents::{get_document, list_documents, set_document},
};

const COLLECTION: &str = "products";

#[automock]
#[async_trait]
pub trait ProductsRepository: Send + Sync {
    /// Every product, including unlisted ones.
    async fn list(&self) -> Result<Vec<Product>, StorageError>;

    /// Find a product by UUID.
    async fn get(&self, uuid: ProductUuid) -> Result<Option<Product>, StorageError>;

    /// Find a product by slug.
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, StorageError>;

    /// Create or replace a product.
    async fn save(&self, product: &Product) -> Result<(), StorageError>;
}

/// Products stored in the remote document store.
#[derive(Clone)]
pub struct RemoteProductsRepository {
    store: Arc<dyn DocumentStore>,
}

impl std::fmt::Debug for RemoteProductsRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteProductsRepository").finish_non_exhaustive()
    }
}

impl RemoteProductsRepository {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Store every product, replacing existing ones with the same UUID.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails.
    pub async fn seed(&self, products: &[Product]) -> Result<(), StorageError> {
        for product in products {
            self.save(product).await?;
        }

        debug!(count = products.len(), "seeded products");

        Ok(())
    }
}

#[async_trait]
impl ProductsRepository for RemoteProductsRepository {
    async fn list(&self) -> Result<Vec<Product>, StorageError> {
        list_documents(self.store.as_ref(), COLLECTION).await
    }

    async fn get(&self, uuid: ProductUuid) -> Result<Option<Product>, StorageError> {
        get_document(self.store.as_ref(), COLLECTION, &uuid.to_string()).await
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, StorageError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|product| product.slug.eq_ignore_ascii_case(slug)))
    }

    async fn save(&self, product: &Product) -> Result<(), StorageError> {
        set_document(
            self.store.as_ref(),
            COLLECTION,
            &product.uuid.to_string(),
            product,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{storage::MemoryDocumentStore, test::helpers::sample_fixture};

    use super::*;

    #[tokio::test]
    async fn seeded_products_can_be_found_by_uuid_and_slug() -> TestResult {
        let fixture = sample_fixture()?;
        let repository = RemoteProductsRepository::new(Arc::new(MemoryDocumentStore::new()));

        repository.seed(fixture.products()).await?;

        let tee = fixture.product("basic-tee").ok_or("basic-tee missing")?;

        assert_eq!(repository.get(tee.uuid).await?.as_ref(), Some(tee));
        assert_eq!(
            repository.get_by_slug("BASIC-TEE").await?.map(|p| p.uuid),
            Some(tee.uuid)
        );
        assert_eq!(repository.list().await?.len(), fixture.products().len());
        assert_eq!(repository.get(ProductUuid::new()).await?, None);

        Ok(())
    }
}
