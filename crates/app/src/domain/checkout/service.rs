//! Checkout service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use serde::{Deserialize, Serialize};
use storefront::{
    carts::{Cart, CartError},
    checkout::{CheckoutProgress, CheckoutStep},
    orders::{Order, OrderError, OrderUuid},
    payments::PaymentMethod,
    products::Product,
    users::{Address, UserUuid},
};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::domain::{
    carts::CartsService,
    catalog::ProductsRepository,
    checkout::{errors::CheckoutError, orders::OrdersRepository, payments::PaymentGateway},
    coupons::CouponsRepository,
};

/// Checkout state for the current shopper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub progress: CheckoutProgress,
    pub shipping_address: Option<Address>,
    pub payment_method: Option<PaymentMethod>,
}

/// Ports the checkout service drives.
#[derive(Clone)]
pub struct CheckoutPorts {
    pub carts: Arc<dyn CartsService>,
    pub products: Arc<dyn ProductsRepository>,
    pub coupons: Arc<dyn CouponsRepository>,
    pub orders: Arc<dyn OrdersRepository>,
    pub payments: Arc<dyn PaymentGateway>,
}

impl std::fmt::Debug for CheckoutPorts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutPorts").finish_non_exhaustive()
    }
}

pub struct DefaultCheckoutService {
    ports: CheckoutPorts,
    currency: String,
    session: Mutex<CheckoutSession>,
}

impl std::fmt::Debug for DefaultCheckoutService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultCheckoutService")
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

impl DefaultCheckoutService {
    #[must_use]
    pub fn new(ports: CheckoutPorts, currency: impl Into<String>) -> Self {
        Self {
            ports,
            currency: currency.into(),
            session: Mutex::new(CheckoutSession::default()),
        }
    }

    /// Every line must still be listed and in stock.
    async fn check_stock(&self, cart: &Cart) -> Result<Vec<Product>, CheckoutError> {
        let mut products: Vec<Product> = Vec::with_capacity(cart.items.len());

        for item in &cart.items {
            let unavailable = || CartError::ProductUnavailable(item.display_name());

            let product = self
                .ports
                .products
                .get(item.product_uuid)
                .await?
                .filter(Product::is_active)
                .ok_or_else(unavailable)?;

            let available = match item.variant_uuid {
                Some(uuid) => product
                    .variant(uuid)
                    .map(|variant| variant.stock)
                    .ok_or_else(unavailable)?,
                None => product.stock,
            };

            if available < item.quantity {
                warn!(product = %product.slug, available, requested = item.quantity, "stock changed before checkout");

                return Err(CartError::InsufficientStock {
                    name: item.display_name(),
                    requested: item.quantity,
                    available,
                }
                .into());
            }

            if !products.iter().any(|p| p.uuid == product.uuid) {
                products.push(product);
            }
        }

        Ok(products)
    }

    /// The applied coupon must still hold for the buyer. A coupon that no
    /// longer does is removed from the cart before the error is returned.
    async fn check_coupon(&self, cart: &Cart, user: Option<UserUuid>) -> Result<(), CheckoutError> {
        let Some(applied) = &cart.coupon else {
            return Ok(());
        };

        let coupon = self.ports.coupons.find_by_code(&applied.code).await?;
        let redemptions = match user {
            Some(user) => self.ports.coupons.user_redemptions(&applied.code, user).await?,
            None => 0,
        };

        if let Err(error) = cart.check_coupon(coupon.as_ref(), redemptions, Timestamp::now()) {
            warn!(cart = %cart.uuid, code = %applied.code, %error, "coupon no longer applies");

            self.ports.carts.remove_coupon(user).await?;

            return Err(CartError::Coupon(error).into());
        }

        Ok(())
    }

    async fn decrement_stock(&self, cart: &Cart, products: Vec<Product>) -> Result<(), CheckoutError> {
        for mut product in products {
            for item in cart.items.iter().filter(|item| item.product_uuid == product.uuid) {
                match item.variant_uuid {
                    Some(uuid) => {
                        if let Some(variant) = product.variants.iter_mut().find(|v| v.uuid == uuid) {
                            variant.stock = variant.stock.saturating_sub(item.quantity);
                        }
                    }
                    None => product.stock = product.stock.saturating_sub(item.quantity),
                }
            }

            self.ports.products.save(&product).await?;
        }

        Ok(())
    }
}

fn validate_payment_method(method: &PaymentMethod) -> Result<(), CheckoutError> {
    match method {
        PaymentMethod::Card { last4, token, .. } => {
            if last4.len() != 4 || !last4.chars().all(|c| c.is_ascii_digit()) {
                return Err(CheckoutError::InvalidPaymentMethod(
                    "card must end in four digits".to_string(),
                ));
            }

            if token.trim().is_empty() {
                return Err(CheckoutError::InvalidPaymentMethod(
                    "card token is missing".to_string(),
                ));
            }

            Ok(())
        }
        PaymentMethod::CashOnDelivery => Ok(()),
    }
}

#[async_trait]
impl CheckoutService for DefaultCheckoutService {
    async fn session(&self) -> CheckoutSession {
        self.session.lock().await.clone()
    }

    #[instrument(skip(self, address))]
    async fn set_shipping_address(&self, address: Address) -> Result<CheckoutSession, CheckoutError> {
        address.validate()?;

        let mut session = self.session.lock().await;

        session.shipping_address = Some(address);
        session.progress.complete(CheckoutStep::Shipping);

        if session.progress.current() == CheckoutStep::Shipping {
            session.progress.advance()?;
        }

        Ok(session.clone())
    }

    #[instrument(skip(self, method))]
    async fn set_payment_method(
        &self,
        method: PaymentMethod,
    ) -> Result<CheckoutSession, CheckoutError> {
        validate_payment_method(&method)?;

        let mut session = self.session.lock().await;

        if !session.progress.is_completed(CheckoutStep::Shipping) {
            return Err(CheckoutError::NotReady(CheckoutStep::Shipping));
        }

        session.payment_method = Some(method);
        session.progress.complete(CheckoutStep::Payment);

        if session.progress.current() == CheckoutStep::Payment {
            session.progress.advance()?;
        }

        Ok(session.clone())
    }

    #[instrument(skip(self))]
    async fn back(&self) -> Result<CheckoutSession, CheckoutError> {
        let mut session = self.session.lock().await;

        session.progress.back()?;

        Ok(session.clone())
    }

    #[instrument(skip(self))]
    async fn go_to(&self, step: CheckoutStep) -> Result<CheckoutSession, CheckoutError> {
        let mut session = self.session.lock().await;

        session.progress.go_to(step)?;

        Ok(session.clone())
    }

    #[instrument(skip(self))]
    async fn reset(&self) {
        *self.session.lock().await = CheckoutSession::default();
    }

    #[instrument(skip(self))]
    async fn place_order(&self, user: Option<UserUuid>) -> Result<Order, CheckoutError> {
        let mut session = self.session.lock().await;

        if session.progress.current() != CheckoutStep::Review || !session.progress.ready_for_review()
        {
            let step = session
                .progress
                .first_incomplete()
                .unwrap_or(CheckoutStep::Review);

            return Err(CheckoutError::NotReady(step));
        }

        let (Some(address), Some(method)) =
            (session.shipping_address.clone(), session.payment_method.clone())
        else {
            return Err(CheckoutError::NotReady(CheckoutStep::Shipping));
        };

        let cart = self.ports.carts.get_or_create_cart(user).await?;

        if cart.is_empty() {
            return Err(OrderError::EmptyCart.into());
        }

        let products = self.check_stock(&cart).await?;
        self.check_coupon(&cart, user).await?;

        let payment = self
            .ports
            .payments
            .charge(cart.totals.total, &self.currency, &method)
            .await?;

        let order = Order::from_cart(&cart, address, payment, Timestamp::now())?;

        self.ports.orders.save(&order).await?;

        if let Some(code) = order.coupon_code.as_deref() {
            self.ports.coupons.record_redemption(code, user).await?;
        }

        self.ports.carts.mark_converted(user).await?;
        self.decrement_stock(&cart, products).await?;

        *session = CheckoutSession::default();

        info!(order = %order.number, total = %order.totals.total, "placed order");

        Ok(order)
    }

    #[instrument(skip(self))]
    async fn orders_for_user(&self, user: UserUuid) -> Result<Vec<Order>, CheckoutError> {
        Ok(self.ports.orders.list_for_user(user).await?)
    }

    #[instrument(skip(self))]
    async fn order(&self, uuid: OrderUuid) -> Result<Order, CheckoutError> {
        self.ports
            .orders
            .get(uuid)
            .await?
            .ok_or(CheckoutError::OrderNotFound(uuid))
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Current checkout state.
    async fn session(&self) -> CheckoutSession;

    /// Validate and store the shipping address, completing the shipping step.
    async fn set_shipping_address(&self, address: Address) -> Result<CheckoutSession, CheckoutError>;

    /// Store the payment method, completing the payment step.
    async fn set_payment_method(
        &self,
        method: PaymentMethod,
    ) -> Result<CheckoutSession, CheckoutError>;

    /// Return to the previous step.
    async fn back(&self) -> Result<CheckoutSession, CheckoutError>;

    /// Jump to a completed step or the first incomplete one.
    async fn go_to(&self, step: CheckoutStep) -> Result<CheckoutSession, CheckoutError>;

    /// Discard the checkout state.
    async fn reset(&self);

    /// Charge the cart total and record the order.
    async fn place_order(&self, user: Option<UserUuid>) -> Result<Order, CheckoutError>;

    /// A user's orders, newest first.
    async fn orders_for_user(&self, user: UserUuid) -> Result<Vec<Order>, CheckoutError>;

    /// Find an order.
    async fn order(&self, uuid: OrderUuid) -> Result<Order, CheckoutError>;
}
