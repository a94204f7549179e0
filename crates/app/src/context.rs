//! App Context

use std::{sync::Arc, time::Duration};

use jiff::Timestamp;
use storefront::{
    carts::{PricingPolicy, PricingPolicyError},
    fixtures::{Fixture, FixtureError},
};
use thiserror::Error;
use tracing::info;

use crate::{
    config::{AppConfig, CartBackend},
    domain::{
        auth::{AuthError, AuthService, LocalAuthProvider, RemoteUsersRepository, UsersRepository},
        carts::{
            CartsRepository, CartsService, DefaultCartsService, LocalCartsRepository,
            RemoteCartsRepository,
        },
        catalog::{
            CatalogService, DefaultCatalogService, FavoritesService, ProductsRepository,
            RecentlyViewedService, RemoteProductsRepository,
        },
        checkout::{
            CheckoutPorts, CheckoutService, DefaultCheckoutService, OrdersRepository,
            RemoteOrdersRepository, SimulatedPaymentGateway,
        },
        coupons::{CouponsRepository, RemoteCouponsRepository},
        profile::ProfileService,
    },
    facades::{AuthFacade, CartFacade, CatalogFacade, CheckoutFacade, Notifier},
    storage::{DocumentStore, FileStorage, KeyValueStore, MemoryDocumentStore, MemoryStorage, StorageError},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("invalid pricing configuration")]
    Pricing(#[from] PricingPolicyError),

    #[error("failed to load catalog fixture")]
    Fixture(#[from] FixtureError),

    #[error("failed to open storage")]
    Storage(#[from] StorageError),

    #[error("failed to restore session")]
    Session(#[from] AuthError),
}

/// Facades sharing one notifier and one session.
#[derive(Debug, Clone)]
pub struct Facades {
    pub notifier: Notifier,
    pub catalog: Arc<CatalogFacade>,
    pub cart: Arc<CartFacade>,
    pub checkout: Arc<CheckoutFacade>,
    pub auth: Arc<AuthFacade>,
}

#[derive(Clone)]
pub struct AppContext {
    pub policy: PricingPolicy,
    pub catalog: Arc<dyn CatalogService>,
    pub carts: Arc<dyn CartsService>,
    pub checkout: Arc<dyn CheckoutService>,
    pub auth: Arc<AuthService>,
    pub profiles: ProfileService,
    pub favorites: FavoritesService,
    pub recently_viewed: RecentlyViewedService,
    pub facades: Facades,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build the application context from configuration.
    ///
    /// Seeds the mocked document store with the configured fixture.
    ///
    /// # Errors
    ///
    /// Returns an error when the pricing settings are invalid, the fixture
    /// cannot be loaded or local storage cannot be opened.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let policy = config.pricing.policy()?;

        let local: Arc<dyn KeyValueStore> = match &config.storage.storage_dir {
            Some(dir) => Arc::new(FileStorage::open(dir)?),
            None => Arc::new(MemoryStorage::new()),
        };

        let documents: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::with_latency(
            Duration::from_millis(config.storage.remote_latency_ms),
        ));

        let now = Timestamp::now();
        let fixture = match &config.storage.fixture {
            Some(path) => Fixture::from_path(path, now)?,
            None => Fixture::sample(now)?,
        };

        let products = RemoteProductsRepository::new(documents.clone());
        products.seed(fixture.products()).await?;

        let coupons = RemoteCouponsRepository::new(documents.clone());
        coupons.seed(fixture.coupons()).await?;

        info!(
            products = fixture.products().len(),
            coupons = fixture.coupons().len(),
            "seeded catalog"
        );

        let products: Arc<dyn ProductsRepository> = Arc::new(products);
        let coupons: Arc<dyn CouponsRepository> = Arc::new(coupons);
        let orders: Arc<dyn OrdersRepository> =
            Arc::new(RemoteOrdersRepository::new(documents.clone()));

        let cart_repository: Arc<dyn CartsRepository> = match config.storage.cart_backend {
            CartBackend::Local => Arc::new(LocalCartsRepository::new(local.clone())),
            CartBackend::Remote => Arc::new(RemoteCartsRepository::new(documents.clone())),
        };

        let catalog: Arc<dyn CatalogService> =
            Arc::new(DefaultCatalogService::new(products.clone()));

        let carts: Arc<dyn CartsService> = Arc::new(DefaultCartsService::new(
            cart_repository,
            products.clone(),
            coupons.clone(),
            policy.clone(),
        ));

        let checkout: Arc<dyn CheckoutService> = Arc::new(DefaultCheckoutService::new(
            CheckoutPorts {
                carts: carts.clone(),
                products,
                coupons,
                orders,
                payments: Arc::new(SimulatedPaymentGateway::default()),
            },
            policy.currency.clone(),
        ));

        let users: Arc<dyn UsersRepository> =
            Arc::new(RemoteUsersRepository::new(documents.clone()));

        let auth = Arc::new(AuthService::new(Arc::new(LocalAuthProvider::new(
            users.clone(),
            documents,
        ))));
        auth.restore().await?;

        let profiles = ProfileService::new(users);
        let favorites = FavoritesService::new(local.clone());
        let recently_viewed = RecentlyViewedService::new(local);

        let notifier = Notifier::default();

        let cart_facade = Arc::new(CartFacade::new(
            carts.clone(),
            auth.subscribe(),
            notifier.clone(),
        ));

        let facades = Facades {
            catalog: Arc::new(CatalogFacade::new(
                catalog.clone(),
                favorites.clone(),
                recently_viewed.clone(),
                notifier.clone(),
            )),
            checkout: Arc::new(CheckoutFacade::new(
                checkout.clone(),
                cart_facade.clone(),
                auth.subscribe(),
                notifier.clone(),
            )),
            auth: Arc::new(AuthFacade::new(
                auth.clone(),
                profiles.clone(),
                cart_facade.clone(),
                notifier.clone(),
            )),
            cart: cart_facade,
            notifier,
        };

        Ok(Self {
            policy,
            catalog,
            carts,
            checkout,
            auth,
            profiles,
            favorites,
            recently_viewed,
            facades,
        })
    }
}
