//! Test context for service-level tests.

use std::sync::Arc;

use storefront::carts::PricingPolicy;
use testresult::TestResult;

use crate::{
    domain::{
        carts::{
            CartsRepository, CartsService, DefaultCartsService, LocalCartsRepository,
            RemoteCartsRepository,
        },
        catalog::{ProductsRepository, RemoteProductsRepository},
        checkout::{
            CheckoutPorts, CheckoutService, DefaultCheckoutService, OrdersRepository,
            RemoteOrdersRepository, SimulatedPaymentGateway,
        },
        coupons::{CouponsRepository, RemoteCouponsRepository},
    },
    storage::{MemoryDocumentStore, MemoryStorage},
    test::helpers::sample_fixture,
};

/// Services wired over in-memory adapters and seeded with the sample catalog.
pub(crate) struct TestContext {
    pub(crate) documents: Arc<MemoryDocumentStore>,
    pub(crate) products: Arc<dyn ProductsRepository>,
    pub(crate) coupons: Arc<dyn CouponsRepository>,
    pub(crate) orders: Arc<dyn OrdersRepository>,
    pub(crate) cart_repository: Arc<dyn CartsRepository>,
    pub(crate) carts: Arc<dyn CartsService>,
    pub(crate) checkout: Arc<dyn CheckoutService>,
}

impl TestContext {
    /// Carts in local storage.
    pub(crate) async fn new() -> TestResult<Self> {
        let storage = Arc::new(MemoryStorage::new());

        Self::build(|_documents| Arc::new(LocalCartsRepository::new(storage))).await
    }

    /// Carts in the document store.
    pub(crate) async fn remote() -> TestResult<Self> {
        Self::build(|documents| Arc::new(RemoteCartsRepository::new(documents))).await
    }

    async fn build<F>(carts_repository: F) -> TestResult<Self>
    where
        F: FnOnce(Arc<MemoryDocumentStore>) -> Arc<dyn CartsRepository>,
    {
        let fixture = sample_fixture()?;
        let documents = Arc::new(MemoryDocumentStore::new());

        let products = RemoteProductsRepository::new(documents.clone());
        products.seed(fixture.products()).await?;

        let coupons = RemoteCouponsRepository::new(documents.clone());
        coupons.seed(fixture.coupons()).await?;

        let products: Arc<dyn ProductsRepository> = Arc::new(products);
        let coupons: Arc<dyn CouponsRepository> = Arc::new(coupons);
        let orders: Arc<dyn OrdersRepository> =
            Arc::new(RemoteOrdersRepository::new(documents.clone()));
        let cart_repository = carts_repository(documents.clone());

        let policy = PricingPolicy::default();
        let currency = policy.currency.clone();

        let carts: Arc<dyn CartsService> = Arc::new(DefaultCartsService::new(
            cart_repository.clone(),
            products.clone(),
            coupons.clone(),
            policy,
        ));

        let checkout = Arc::new(DefaultCheckoutService::new(
            CheckoutPorts {
                carts: carts.clone(),
                products: products.clone(),
                coupons: coupons.clone(),
                orders: orders.clone(),
                payments: Arc::new(SimulatedPaymentGateway::default()),
            },
            currency,
        ));

        Ok(Self {
            documents,
            products,
            coupons,
            orders,
            cart_repository,
            carts,
            checkout,
        })
    }

    /// The ports behind [`Self::checkout`], for building variants of it.
    pub(crate) fn checkout_ports(&self) -> CheckoutPorts {
        CheckoutPorts {
            carts: self.carts.clone(),
            products: self.products.clone(),
            coupons: self.coupons.clone(),
            orders: self.orders.clone(),
            payments: Arc::new(SimulatedPaymentGateway::default()),
        }
    }
}
