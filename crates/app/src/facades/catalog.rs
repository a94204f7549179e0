//! Catalog facade.

use std::sync::Arc;

use storefront::products::{Product, ProductUuid};
use tokio::sync::watch;
use tracing::warn;

use crate::{
    domain::catalog::{
        CatalogService, CategorySummary, FavoritesService, ProductPage, ProductQuery,
        RecentlyViewedService,
    },
    facades::{
        messages::UserFacingError,
        notifications::Notifier,
        state::{ViewState, ViewStore},
    },
};

/// Listing, product detail, favorites and recently viewed products.
pub struct CatalogFacade {
    catalog: Arc<dyn CatalogService>,
    favorites: FavoritesService,
    recently_viewed: RecentlyViewedService,
    listing: ViewStore<ProductPage>,
    product: ViewStore<Product>,
    favorite_ids: watch::Sender<Vec<ProductUuid>>,
}

impl std::fmt::Debug for CatalogFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogFacade").finish_non_exhaustive()
    }
}

impl CatalogFacade {
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        favorites: FavoritesService,
        recently_viewed: RecentlyViewedService,
        notifier: Notifier,
    ) -> Self {
        let stored = favorites.list().unwrap_or_else(|error| {
            warn!(%error, "could not read favorites");
            Vec::new()
        });

        Self {
            catalog,
            favorites,
            recently_viewed,
            listing: ViewStore::new(notifier.clone()),
            product: ViewStore::new(notifier),
            favorite_ids: watch::Sender::new(stored),
        }
    }

    pub fn listing(&self) -> watch::Receiver<ViewState<ProductPage>> {
        self.listing.subscribe()
    }

    pub fn product(&self) -> watch::Receiver<ViewState<Product>> {
        self.product.subscribe()
    }

    pub fn favorites(&self) -> watch::Receiver<Vec<ProductUuid>> {
        self.favorite_ids.subscribe()
    }

    pub async fn search(&self, query: ProductQuery) -> Option<ProductPage> {
        self.listing.loading();

        let result = self.catalog.list_products(query).await;

        self.listing.settle(result, None)
    }

    /// Show a product and remember it as recently viewed.
    pub async fn open_product(&self, slug: &str) -> Option<Product> {
        self.product.loading();

        let result = self.catalog.get_product_by_slug(slug).await;
        let product = self.product.settle(result, None)?;

        if let Err(error) = self.recently_viewed.record(product.uuid) {
            warn!(%error, "could not record recently viewed product");
        }

        Some(product)
    }

    pub async fn categories(&self) -> Vec<CategorySummary> {
        match self.catalog.categories().await {
            Ok(categories) => categories,
            Err(error) => {
                self.listing.fail(&error);
                Vec::new()
            }
        }
    }

    /// Returns whether the product is now a favorite.
    pub fn toggle_favorite(&self, product: ProductUuid) -> Option<bool> {
        match self.favorites.toggle(product) {
            Ok(added) => {
                self.favorite_ids.send_modify(|ids| {
                    ids.retain(|id| *id != product);

                    if added {
                        ids.push(product);
                    }
                });

                Some(added)
            }
            Err(error) => {
                self.listing.notifier().error(error.user_message());
                None
            }
        }
    }

    pub fn is_favorite(&self, product: ProductUuid) -> bool {
        self.favorite_ids.borrow().contains(&product)
    }

    /// Recently viewed products that are still listed, most recent first.
    pub async fn recently_viewed(&self) -> Vec<Product> {
        let ids = match self.recently_viewed.list() {
            Ok(ids) => ids,
            Err(error) => {
                warn!(%error, "could not read recently viewed products");
                return Vec::new();
            }
        };

        let mut products = Vec::with_capacity(ids.len());

        for id in ids {
            if let Ok(product) = self.catalog.get_product(id).await {
                products.push(product);
            }
        }

        products
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::catalog::{CatalogServiceError, MockCatalogService},
        storage::{KeyValueStore, MemoryStorage},
        test::helpers::sample_fixture,
    };

    use super::*;

    fn facade(catalog: MockCatalogService, storage: Arc<dyn KeyValueStore>) -> CatalogFacade {
        CatalogFacade::new(
            Arc::new(catalog),
            FavoritesService::new(storage.clone()),
            RecentlyViewedService::new(storage),
            Notifier::default(),
        )
    }

    #[tokio::test]
    async fn opening_a_product_records_it() -> TestResult {
        let fixture = sample_fixture()?;
        let mug = fixture.product("ceramic-mug").cloned().ok_or("mug missing")?;
        let by_slug = mug.clone();
        let by_uuid = mug.clone();

        let mut catalog = MockCatalogService::new();
        catalog
            .expect_get_product_by_slug()
            .returning(move |_| Ok(by_slug.clone()));
        catalog
            .expect_get_product()
            .returning(move |_| Ok(by_uuid.clone()));

        let facade = facade(catalog, Arc::new(MemoryStorage::new()));

        assert_eq!(facade.open_product("ceramic-mug").await.as_ref(), Some(&mug));
        assert_eq!(facade.product().borrow().value(), Some(&mug));
        assert_eq!(facade.recently_viewed().await, vec![mug]);

        Ok(())
    }

    #[tokio::test]
    async fn missing_product_shows_a_message() {
        let mut catalog = MockCatalogService::new();
        catalog
            .expect_get_product_by_slug()
            .returning(|slug| Err(CatalogServiceError::NotFound(slug.to_string())));

        let storage = Arc::new(MemoryStorage::new());
        let facade = facade(catalog, storage.clone());

        assert_eq!(facade.open_product("nope").await, None);
        assert_eq!(
            facade.product().borrow().error(),
            Some("That product could not be found.")
        );
        assert_eq!(storage.keys().ok(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn favorites_are_published_and_persisted() -> TestResult {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStorage::new());
        let facade = facade(MockCatalogService::new(), storage.clone());
        let product = ProductUuid::new();
        let favorites = facade.favorites();

        assert_eq!(facade.toggle_favorite(product), Some(true));
        assert!(facade.is_favorite(product));
        assert_eq!(*favorites.borrow(), vec![product]);

        let reopened = CatalogFacade::new(
            Arc::new(MockCatalogService::new()),
            FavoritesService::new(storage.clone()),
            RecentlyViewedService::new(storage),
            Notifier::default(),
        );
        assert!(reopened.is_favorite(product));

        assert_eq!(facade.toggle_favorite(product), Some(false));
        assert!(favorites.borrow().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn search_publishes_the_page() -> TestResult {
        let fixture = sample_fixture()?;
        let products = fixture.products().to_vec();

        let mut catalog = MockCatalogService::new();
        catalog
            .expect_list_products()
            .returning(move |query| Ok(query.run(products.clone())));

        let facade = facade(catalog, Arc::new(MemoryStorage::new()));

        let page = facade
            .search(ProductQuery {
                category: Some("footwear".to_string()),
                ..ProductQuery::default()
            })
            .await
            .ok_or("search failed")?;

        assert_eq!(page.total, 2);
        assert_eq!(facade.listing().borrow().value(), Some(&page));

        Ok(())
    }
}
