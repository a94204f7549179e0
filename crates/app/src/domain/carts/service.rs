//! Carts service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use storefront::{
    carts::{Cart, CartError, CartItemUuid, NewCartItem, PricingPolicy},
    coupons::{CouponError, normalize_code},
    products::{ProductUuid, VariantUuid},
    users::UserUuid,
};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::domain::{
    carts::{errors::CartsServiceError, repositories::CartsRepository},
    catalog::ProductsRepository,
    coupons::CouponsRepository,
};

/// Cart use cases over the repository ports.
///
/// Mutations are load-modify-save and are serialised by an internal lock.
pub struct DefaultCartsService {
    carts: Arc<dyn CartsRepository>,
    products: Arc<dyn ProductsRepository>,
    coupons: Arc<dyn CouponsRepository>,
    policy: PricingPolicy,
    lock: Mutex<()>,
}

impl std::fmt::Debug for DefaultCartsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultCartsService")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl DefaultCartsService {
    #[must_use]
    pub fn new(
        carts: Arc<dyn CartsRepository>,
        products: Arc<dyn ProductsRepository>,
        coupons: Arc<dyn CouponsRepository>,
        policy: PricingPolicy,
    ) -> Self {
        Self {
            carts,
            products,
            coupons,
            policy,
            lock: Mutex::new(()),
        }
    }

    /// Pricing applied to carts.
    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    async fn current_cart(
        &self,
        user: Option<UserUuid>,
        now: Timestamp,
    ) -> Result<Cart, CartsServiceError> {
        match self.carts.load(user).await? {
            Some(mut cart) if cart.is_active() && !cart.is_expired(now) => {
                cart.reprice(&self.policy);

                Ok(cart)
            }
            Some(mut cart) => {
                if cart.is_active() {
                    info!(cart = %cart.uuid, "cart expired, starting a new one");

                    cart.expire(now);
                    self.carts.save(&cart).await?;
                }

                self.create_cart(user, now).await
            }
            None => self.create_cart(user, now).await,
        }
    }

    async fn create_cart(
        &self,
        user: Option<UserUuid>,
        now: Timestamp,
    ) -> Result<Cart, CartsServiceError> {
        let cart = Cart::new(user, now);

        self.carts.save(&cart).await?;

        debug!(cart = %cart.uuid, ?user, "created cart");

        Ok(cart)
    }

    /// Drop the applied coupon if it no longer holds for `user`. A coupon
    /// applied as a guest was checked without any redemptions counted.
    async fn recheck_coupon(
        &self,
        cart: &mut Cart,
        user: Option<UserUuid>,
        now: Timestamp,
    ) -> Result<(), CartsServiceError> {
        let Some(code) = cart.coupon.as_ref().map(|applied| applied.code.clone()) else {
            return Ok(());
        };

        let coupon = self.coupons.find_by_code(&code).await?;
        let redemptions = match user {
            Some(user) => self.coupons.user_redemptions(&code, user).await?,
            None => 0,
        };

        if let Err(error) = cart.check_coupon(coupon.as_ref(), redemptions, now) {
            warn!(cart = %cart.uuid, %code, %error, "dropped coupon that no longer applies");

            cart.remove_coupon(now, &self.policy)?;
        }

        Ok(())
    }

    /// Load the current cart, apply `change` and persist the result.
    async fn modify<F>(&self, user: Option<UserUuid>, change: F) -> Result<Cart, CartsServiceError>
    where
        F: FnOnce(&mut Cart, Timestamp, &PricingPolicy) -> Result<(), CartError> + Send,
    {
        let _guard = self.lock.lock().await;
        let now = Timestamp::now();

        let mut cart = self.current_cart(user, now).await?;

        change(&mut cart, now, &self.policy)?;

        self.carts.save(&cart).await?;

        Ok(cart)
    }
}

#[async_trait]
impl CartsService for DefaultCartsService {
    #[instrument(skip(self))]
    async fn get_or_create_cart(&self, user: Option<UserUuid>) -> Result<Cart, CartsServiceError> {
        let _guard = self.lock.lock().await;

        self.current_cart(user, Timestamp::now()).await
    }

    #[instrument(skip(self))]
    async fn add_item(
        &self,
        user: Option<UserUuid>,
        product: ProductUuid,
        variant: Option<VariantUuid>,
        quantity: u32,
    ) -> Result<Cart, CartsServiceError> {
        let product = self
            .products
            .get(product)
            .await?
            .ok_or(CartsServiceError::ProductNotFound(product))?;

        let variant = match variant {
            Some(uuid) => Some(
                product
                    .variant(uuid)
                    .ok_or(CartsServiceError::VariantNotFound(uuid))?,
            ),
            None if !product.variants.is_empty() => {
                return Err(CartsServiceError::VariantRequired(product.name));
            }
            None => None,
        };

        let item = NewCartItem::from_product(&product, variant, quantity);

        let cart = self
            .modify(user, move |cart, now, policy| {
                cart.add_item(item, now, policy).map(|_line| ())
            })
            .await?;

        info!(cart = %cart.uuid, product = %product.slug, quantity, "added item to cart");

        Ok(cart)
    }

    #[instrument(skip(self))]
    async fn update_quantity(
        &self,
        user: Option<UserUuid>,
        item: CartItemUuid,
        quantity: u32,
    ) -> Result<Cart, CartsServiceError> {
        self.modify(user, move |cart, now, policy| {
            cart.update_quantity(item, quantity, now, policy)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn remove_item(
        &self,
        user: Option<UserUuid>,
        item: CartItemUuid,
    ) -> Result<Cart, CartsServiceError> {
        self.modify(user, move |cart, now, policy| cart.remove_item(item, now, policy))
            .await
    }

    #[instrument(skip(self))]
    async fn apply_coupon(
        &self,
        user: Option<UserUuid>,
        code: &str,
    ) -> Result<Cart, CartsServiceError> {
        let coupon = self
            .coupons
            .find_by_code(code)
            .await?
            .ok_or_else(|| CartError::Coupon(CouponError::NotFound(normalize_code(code))))?;

        let redemptions = match user {
            Some(user) => self.coupons.user_redemptions(&coupon.code, user).await?,
            None => 0,
        };

        let cart = self
            .modify(user, |cart, now, policy| {
                cart.apply_coupon(&coupon, redemptions, now, policy)
            })
            .await?;

        info!(cart = %cart.uuid, code = %coupon.code, "applied coupon");

        Ok(cart)
    }

    #[instrument(skip(self))]
    async fn remove_coupon(&self, user: Option<UserUuid>) -> Result<Cart, CartsServiceError> {
        self.modify(user, |cart, now, policy| {
            cart.remove_coupon(now, policy).map(|_removed| ())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn clear(&self, user: Option<UserUuid>) -> Result<Cart, CartsServiceError> {
        self.modify(user, |cart, now, policy| cart.clear(now, policy))
            .await
    }

    #[instrument(skip(self))]
    async fn assign_user(&self, user: UserUuid) -> Result<Cart, CartsServiceError> {
        let _guard = self.lock.lock().await;
        let now = Timestamp::now();

        let guest = self
            .carts
            .load(None)
            .await?
            .filter(|cart| cart.is_active() && !cart.is_expired(now) && !cart.is_empty());

        let Some(mut guest) = guest else {
            return self.current_cart(Some(user), now).await;
        };

        // The guest cart replaces whatever the user had open.
        if let Some(mut previous) = self.carts.load(Some(user)).await?
            && previous.uuid != guest.uuid
            && previous.is_active()
        {
            previous.mark_abandoned(now);
            self.carts.save(&previous).await?;
        }

        guest.assign_user(user, now);
        self.recheck_coupon(&mut guest, Some(user), now).await?;
        guest.reprice(&self.policy);
        self.carts.save(&guest).await?;

        info!(cart = %guest.uuid, %user, "assigned guest cart to user");

        Ok(guest)
    }

    #[instrument(skip(self))]
    async fn mark_converted(&self, user: Option<UserUuid>) -> Result<Cart, CartsServiceError> {
        let _guard = self.lock.lock().await;
        let now = Timestamp::now();

        let mut cart = self.current_cart(user, now).await?;

        cart.mark_converted(now);
        self.carts.save(&cart).await?;

        Ok(cart)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// The user's active cart, created empty on first access. Expired carts
    /// are marked expired and replaced.
    async fn get_or_create_cart(&self, user: Option<UserUuid>) -> Result<Cart, CartsServiceError>;

    /// Add units of a product (and variant) to the cart.
    async fn add_item(
        &self,
        user: Option<UserUuid>,
        product: ProductUuid,
        variant: Option<VariantUuid>,
        quantity: u32,
    ) -> Result<Cart, CartsServiceError>;

    /// Change the quantity of a line; zero removes it.
    async fn update_quantity(
        &self,
        user: Option<UserUuid>,
        item: CartItemUuid,
        quantity: u32,
    ) -> Result<Cart, CartsServiceError>;

    /// Remove a line.
    async fn remove_item(
        &self,
        user: Option<UserUuid>,
        item: CartItemUuid,
    ) -> Result<Cart, CartsServiceError>;

    /// Validate and apply a coupon code.
    async fn apply_coupon(
        &self,
        user: Option<UserUuid>,
        code: &str,
    ) -> Result<Cart, CartsServiceError>;

    /// Remove the applied coupon.
    async fn remove_coupon(&self, user: Option<UserUuid>) -> Result<Cart, CartsServiceError>;

    /// Remove every line and the coupon.
    async fn clear(&self, user: Option<UserUuid>) -> Result<Cart, CartsServiceError>;

    /// Hand the guest cart over to a user who just signed in.
    async fn assign_user(&self, user: UserUuid) -> Result<Cart, CartsServiceError>;

    /// Close the current cart after an order was placed.
    async fn mark_converted(&self, user: Option<UserUuid>) -> Result<Cart, CartsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use rust_decimal::Decimal;
    use storefront::carts::{CartStatus, PricingPolicy};
    use testresult::TestResult;

    use crate::{
        domain::carts::repositories::MockCartsRepository,
        storage::{StorageError, documents::list_documents},
        test::{TestContext, helpers::product_by_slug},
    };

    use super::*;

    #[tokio::test]
    async fn first_access_creates_and_persists_an_empty_cart() -> TestResult {
        let ctx = TestContext::new().await?;

        let first = ctx.carts.get_or_create_cart(None).await?;
        let second = ctx.carts.get_or_create_cart(None).await?;

        assert!(first.is_empty());
        assert_eq!(first.uuid, second.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn adding_the_same_product_merges_lines() -> TestResult {
        let ctx = TestContext::new().await?;
        let mug = product_by_slug(&ctx, "ceramic-mug").await?;

        ctx.carts.add_item(None, mug.uuid, None, 1).await?;
        let cart = ctx.carts.add_item(None, mug.uuid, None, 2).await?;

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.totals.subtotal, Decimal::new(447, 0));
        assert_eq!(cart.totals.tax, Decimal::new(7152, 2));
        assert_eq!(cart.totals.total, Decimal::new(61752, 2));

        Ok(())
    }

    #[tokio::test]
    async fn products_with_variants_need_a_variant() -> TestResult {
        let ctx = TestContext::new().await?;
        let tee = product_by_slug(&ctx, "basic-tee").await?;

        let result = ctx.carts.add_item(None, tee.uuid, None, 1).await;

        assert!(
            matches!(result, Err(CartsServiceError::VariantRequired(_))),
            "expected VariantRequired, got {result:?}"
        );

        let medium = tee.variant_by_sku("TEE-M").ok_or("TEE-M missing")?;
        let cart = ctx.carts.add_item(None, tee.uuid, Some(medium.uuid), 2).await?;

        assert_eq!(
            cart.items.first().map(storefront::carts::CartItem::display_name),
            Some("Basic Tee (Medium)".to_string())
        );

        Ok(())
    }

    #[tokio::test]
    async fn sold_out_variant_is_unavailable() -> TestResult {
        let ctx = TestContext::new().await?;
        let tee = product_by_slug(&ctx, "basic-tee").await?;
        let xl = tee.variant_by_sku("TEE-XL").ok_or("TEE-XL missing")?;

        let result = ctx.carts.add_item(None, tee.uuid, Some(xl.uuid), 1).await;

        assert!(
            matches!(result, Err(CartsServiceError::Cart(CartError::ProductUnavailable(_)))),
            "expected ProductUnavailable, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn stock_limits_quantity_updates() -> TestResult {
        let ctx = TestContext::new().await?;
        let throw = product_by_slug(&ctx, "linen-throw").await?;

        let cart = ctx.carts.add_item(None, throw.uuid, None, 2).await?;
        let line = cart.items.first().map(|item| item.uuid).ok_or("line missing")?;

        let result = ctx.carts.update_quantity(None, line, 8).await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::Cart(CartError::InsufficientStock { available: 7, .. }))
            ),
            "expected InsufficientStock, got {result:?}"
        );

        let cart = ctx.carts.update_quantity(None, line, 0).await?;
        assert!(cart.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn unknown_product_is_reported() -> TestResult {
        let ctx = TestContext::new().await?;
        let missing = ProductUuid::new();

        let result = ctx.carts.add_item(None, missing, None, 1).await;

        assert!(
            matches!(result, Err(CartsServiceError::ProductNotFound(uuid)) if uuid == missing),
            "expected ProductNotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn coupon_codes_are_resolved_and_validated() -> TestResult {
        let ctx = TestContext::new().await?;
        let jacket = product_by_slug(&ctx, "denim-jacket").await?;
        let blue = jacket.variant_by_sku("JKT-M-BLU").ok_or("variant missing")?;

        ctx.carts.add_item(None, jacket.uuid, Some(blue.uuid), 1).await?;

        let unknown = ctx.carts.apply_coupon(None, "BOGUS").await;
        assert!(
            matches!(&unknown, Err(error) if error.code() == "coupon_invalid"),
            "expected coupon_invalid, got {unknown:?}"
        );

        let expired = ctx.carts.apply_coupon(None, "verano2020").await;
        assert!(
            matches!(&expired, Err(error) if error.code() == "coupon_expired"),
            "expected coupon_expired, got {expired:?}"
        );

        let cart = ctx.carts.apply_coupon(None, "welcome10").await?;
        assert_eq!(cart.coupon.as_ref().map(|c| c.code.as_str()), Some("WELCOME10"));
        assert_eq!(cart.totals.coupon_discount, Decimal::new(80, 0));

        let cart = ctx.carts.remove_coupon(None).await?;
        assert!(cart.coupon.is_none());
        assert_eq!(cart.totals.coupon_discount, Decimal::ZERO);

        Ok(())
    }

    #[tokio::test]
    async fn per_user_coupon_limit_uses_recorded_redemptions() -> TestResult {
        let ctx = TestContext::new().await?;
        let user = UserUuid::new();
        let mug = product_by_slug(&ctx, "ceramic-mug").await?;

        ctx.coupons.record_redemption("WELCOME10", Some(user)).await?;
        ctx.carts.add_item(Some(user), mug.uuid, None, 1).await?;

        let result = ctx.carts.apply_coupon(Some(user), "WELCOME10").await;

        assert!(
            matches!(&result, Err(error) if error.code() == "coupon_usage_limit"),
            "expected coupon_usage_limit, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn expired_carts_are_marked_and_replaced() -> TestResult {
        let ctx = TestContext::remote().await?;
        let user = UserUuid::new();

        let stale = Cart::new(Some(user), Timestamp::now() - SignedDuration::from_hours(24 * 31));
        ctx.cart_repository.save(&stale).await?;

        let cart = ctx.carts.get_or_create_cart(Some(user)).await?;

        assert_ne!(cart.uuid, stale.uuid);
        assert!(cart.is_active());

        let stored: Vec<Cart> = list_documents(ctx.documents.as_ref(), "carts").await?;
        let stale = stored
            .iter()
            .find(|c| c.uuid == stale.uuid)
            .ok_or("stale cart missing")?;

        assert_eq!(stale.status, CartStatus::Expired);

        Ok(())
    }

    #[tokio::test]
    async fn guest_cart_is_assigned_on_sign_in() -> TestResult {
        let ctx = TestContext::remote().await?;
        let user = UserUuid::new();
        let mug = product_by_slug(&ctx, "ceramic-mug").await?;

        let previous = ctx.carts.add_item(Some(user), mug.uuid, None, 5).await?;
        let guest = ctx.carts.add_item(None, mug.uuid, None, 1).await?;

        let cart = ctx.carts.assign_user(user).await?;

        assert_eq!(cart.uuid, guest.uuid);
        assert_eq!(cart.user_uuid, Some(user));
        assert_eq!(ctx.carts.get_or_create_cart(Some(user)).await?.uuid, guest.uuid);

        let stored: Vec<Cart> = list_documents(ctx.documents.as_ref(), "carts").await?;
        assert!(
            stored
                .iter()
                .any(|c| c.uuid == previous.uuid && c.status == CartStatus::Abandoned)
        );

        Ok(())
    }

    #[tokio::test]
    async fn guest_coupon_is_dropped_when_the_user_already_redeemed_it() -> TestResult {
        let ctx = TestContext::remote().await?;
        let user = UserUuid::new();
        let mug = product_by_slug(&ctx, "ceramic-mug").await?;

        ctx.coupons.record_redemption("WELCOME10", Some(user)).await?;
        ctx.carts.add_item(None, mug.uuid, None, 2).await?;

        let guest = ctx.carts.apply_coupon(None, "WELCOME10").await?;
        assert!(guest.coupon.is_some());

        let cart = ctx.carts.assign_user(user).await?;

        assert_eq!(cart.uuid, guest.uuid);
        assert!(cart.coupon.is_none());
        assert_eq!(cart.totals.coupon_discount, Decimal::ZERO);

        let stored = ctx.carts.get_or_create_cart(Some(user)).await?;
        assert!(stored.coupon.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn converted_cart_is_replaced_on_next_access() -> TestResult {
        let ctx = TestContext::new().await?;
        let mug = product_by_slug(&ctx, "ceramic-mug").await?;

        let cart = ctx.carts.add_item(None, mug.uuid, None, 1).await?;
        let converted = ctx.carts.mark_converted(None).await?;

        assert_eq!(converted.uuid, cart.uuid);
        assert_eq!(converted.status, CartStatus::Converted);

        let next = ctx.carts.get_or_create_cart(None).await?;

        assert_ne!(next.uuid, cart.uuid);
        assert!(next.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn storage_failures_are_propagated() -> TestResult {
        let ctx = TestContext::new().await?;

        let mut carts = MockCartsRepository::new();
        carts
            .expect_load()
            .returning(|_| Err(StorageError::LockPoisoned));

        let service = DefaultCartsService::new(
            Arc::new(carts),
            ctx.products.clone(),
            ctx.coupons.clone(),
            PricingPolicy::default(),
        );

        let result = service.get_or_create_cart(None).await;

        assert!(
            matches!(result, Err(CartsServiceError::Storage(StorageError::LockPoisoned))),
            "expected Storage, got {result:?}"
        );

        Ok(())
    }
}
