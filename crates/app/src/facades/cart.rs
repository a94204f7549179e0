//! Cart facade.

use std::sync::Arc;

use storefront::{
    carts::{Cart, CartItemUuid},
    products::{ProductUuid, VariantUuid},
    users::{AuthUser, UserUuid},
};
use tokio::sync::watch;

use crate::{
    domain::carts::CartsService,
    facades::{
        notifications::Notifier,
        state::{ViewState, ViewStore},
    },
};

/// Cart state for the signed-in user or the guest.
pub struct CartFacade {
    carts: Arc<dyn CartsService>,
    session: watch::Receiver<Option<AuthUser>>,
    cart: ViewStore<Cart>,
}

impl std::fmt::Debug for CartFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartFacade")
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}

impl CartFacade {
    #[must_use]
    pub fn new(
        carts: Arc<dyn CartsService>,
        session: watch::Receiver<Option<AuthUser>>,
        notifier: Notifier,
    ) -> Self {
        Self {
            carts,
            session,
            cart: ViewStore::new(notifier),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState<Cart>> {
        self.cart.subscribe()
    }

    pub fn state(&self) -> ViewState<Cart> {
        self.cart.get()
    }

    fn user(&self) -> Option<UserUuid> {
        self.session.borrow().as_ref().map(|user| user.uuid)
    }

    /// Load (or create) the current cart.
    pub async fn load(&self) -> Option<Cart> {
        self.cart.loading();

        let result = self.carts.get_or_create_cart(self.user()).await;

        self.cart.settle(result, None)
    }

    pub async fn add_item(
        &self,
        product: ProductUuid,
        variant: Option<VariantUuid>,
        quantity: u32,
    ) -> Option<Cart> {
        self.cart.loading();

        let result = self
            .carts
            .add_item(self.user(), product, variant, quantity)
            .await;

        self.cart.settle(result, Some("Added to cart"))
    }

    pub async fn update_quantity(&self, item: CartItemUuid, quantity: u32) -> Option<Cart> {
        self.cart.loading();

        let result = self.carts.update_quantity(self.user(), item, quantity).await;

        self.cart.settle(result, None)
    }

    pub async fn remove_item(&self, item: CartItemUuid) -> Option<Cart> {
        self.cart.loading();

        let result = self.carts.remove_item(self.user(), item).await;

        self.cart.settle(result, Some("Removed from cart"))
    }

    pub async fn apply_coupon(&self, code: &str) -> Option<Cart> {
        self.cart.loading();

        let result = self.carts.apply_coupon(self.user(), code).await;

        self.cart.settle(result, Some("Coupon applied"))
    }

    pub async fn remove_coupon(&self) -> Option<Cart> {
        self.cart.loading();

        let result = self.carts.remove_coupon(self.user()).await;

        self.cart.settle(result, None)
    }

    pub async fn clear(&self) -> Option<Cart> {
        self.cart.loading();

        let result = self.carts.clear(self.user()).await;

        self.cart.settle(result, Some("Cart emptied"))
    }

    /// Move the guest cart to a user who just signed in.
    pub async fn claim_guest_cart(&self, user: UserUuid) -> Option<Cart> {
        self.cart.loading();

        let result = self.carts.assign_user(user).await;

        self.cart.settle(result, None)
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use storefront::carts::CartError;
    use testresult::TestResult;

    use crate::{
        domain::carts::{CartsServiceError, MockCartsService},
        facades::notifications::NotificationLevel,
        test::helpers::customer,
    };

    use super::*;

    #[tokio::test]
    async fn successful_add_publishes_the_cart() -> TestResult {
        let user = customer("ana@example.mx").auth_user();
        let user_uuid = user.uuid;
        let cart = Cart::new(Some(user_uuid), Timestamp::UNIX_EPOCH);
        let returned = cart.clone();

        let mut carts = MockCartsService::new();
        carts
            .expect_add_item()
            .withf(move |u, _, _, quantity| *u == Some(user_uuid) && *quantity == 2)
            .times(1)
            .returning(move |_, _, _, _| Ok(returned.clone()));

        let (_session_tx, session) = watch::channel(Some(user));
        let notifier = Notifier::default();
        let mut notifications = notifier.subscribe();

        let facade = CartFacade::new(Arc::new(carts), session, notifier);

        let result = facade.add_item(ProductUuid::new(), None, 2).await;

        assert_eq!(result.as_ref(), Some(&cart));
        assert_eq!(facade.state(), ViewState::Loaded(cart));
        assert_eq!(notifications.recv().await?.level, NotificationLevel::Success);

        Ok(())
    }

    #[tokio::test]
    async fn failures_become_messages() -> TestResult {
        let mut carts = MockCartsService::new();
        carts.expect_apply_coupon().returning(|_, code| {
            Err(CartsServiceError::Cart(CartError::Coupon(
                storefront::coupons::CouponError::Expired(code.to_uppercase()),
            )))
        });

        let (_session_tx, session) = watch::channel(None);
        let notifier = Notifier::default();
        let mut notifications = notifier.subscribe();

        let facade = CartFacade::new(Arc::new(carts), session, notifier);

        assert_eq!(facade.apply_coupon("verano2020").await, None);
        assert_eq!(
            facade.state().error(),
            Some("coupon VERANO2020 has expired")
        );

        let notification = notifications.recv().await?;
        assert_eq!(notification.level, NotificationLevel::Error);
        assert_eq!(notification.message, "coupon VERANO2020 has expired");

        Ok(())
    }

    #[tokio::test]
    async fn guests_use_no_user() {
        let mut carts = MockCartsService::new();
        carts
            .expect_get_or_create_cart()
            .withf(|user| user.is_none())
            .times(1)
            .returning(|_| Ok(Cart::new(None, Timestamp::UNIX_EPOCH)));

        let (_session_tx, session) = watch::channel(None);
        let facade = CartFacade::new(Arc::new(carts), session, Notifier::default());

        assert!(facade.load().await.is_some_and(|cart| cart.is_empty()));
    }
}
