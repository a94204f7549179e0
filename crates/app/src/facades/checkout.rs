//! Checkout facade.

use std::sync::Arc;

use storefront::{
    checkout::CheckoutStep,
    orders::Order,
    payments::PaymentMethod,
    users::{Address, AuthUser},
};
use tokio::sync::watch;

use crate::{
    domain::{
        auth::AuthError,
        checkout::{CheckoutService, CheckoutSession},
    },
    facades::{
        cart::CartFacade,
        notifications::Notifier,
        state::{ViewState, ViewStore},
    },
};

/// Checkout steps, order placement and order history.
pub struct CheckoutFacade {
    checkout: Arc<dyn CheckoutService>,
    cart: Arc<CartFacade>,
    session: watch::Receiver<Option<AuthUser>>,
    steps: ViewStore<CheckoutSession>,
    placed: ViewStore<Order>,
    history: ViewStore<Vec<Order>>,
}

impl std::fmt::Debug for CheckoutFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutFacade")
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

impl CheckoutFacade {
    #[must_use]
    pub fn new(
        checkout: Arc<dyn CheckoutService>,
        cart: Arc<CartFacade>,
        session: watch::Receiver<Option<AuthUser>>,
        notifier: Notifier,
    ) -> Self {
        Self {
            checkout,
            cart,
            session,
            steps: ViewStore::new(notifier.clone()),
            placed: ViewStore::new(notifier.clone()),
            history: ViewStore::new(notifier),
        }
    }

    pub fn steps(&self) -> watch::Receiver<ViewState<CheckoutSession>> {
        self.steps.subscribe()
    }

    pub fn placed_order(&self) -> watch::Receiver<ViewState<Order>> {
        self.placed.subscribe()
    }

    pub fn history(&self) -> watch::Receiver<ViewState<Vec<Order>>> {
        self.history.subscribe()
    }

    /// Publish the current checkout state.
    pub async fn load(&self) -> CheckoutSession {
        let session = self.checkout.session().await;

        self.steps.set(session.clone());

        session
    }

    pub async fn set_shipping_address(&self, address: Address) -> Option<CheckoutSession> {
        let result = self.checkout.set_shipping_address(address).await;

        self.steps.settle(result, None)
    }

    pub async fn set_payment_method(&self, method: PaymentMethod) -> Option<CheckoutSession> {
        let result = self.checkout.set_payment_method(method).await;

        self.steps.settle(result, None)
    }

    pub async fn back(&self) -> Option<CheckoutSession> {
        let result = self.checkout.back().await;

        self.steps.settle(result, None)
    }

    pub async fn go_to(&self, step: CheckoutStep) -> Option<CheckoutSession> {
        let result = self.checkout.go_to(step).await;

        self.steps.settle(result, None)
    }

    /// Place the order and refresh the cart, which starts over empty.
    pub async fn place_order(&self) -> Option<Order> {
        self.placed.loading();

        let user = self.session.borrow().as_ref().map(|user| user.uuid);
        let result = self.checkout.place_order(user).await;

        let order = self.placed.settle(result, None)?;

        self.placed
            .notifier()
            .success(format!("Order {} placed", order.number));

        self.load().await;
        self.cart.load().await;

        Some(order)
    }

    /// The signed-in user's orders.
    pub async fn load_history(&self) -> Option<Vec<Order>> {
        let Some(user) = self.session.borrow().as_ref().map(|user| user.uuid) else {
            self.history.fail(&AuthError::NotSignedIn);
            return None;
        };

        self.history.loading();

        let result = self.checkout.orders_for_user(user).await;

        self.history.settle(result, None)
    }
}
