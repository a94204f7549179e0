//! Carts
//!
//! The cart is a plain record; every mutation recomputes the totals from
//! scratch so the stored amounts always agree with the lines and coupon.

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    coupons::{AppliedCoupon, Coupon, CouponContext, CouponError},
    users::UserUuid,
    uuids::TypedUuid,
};

pub mod items;
pub mod receipt;
pub mod totals;

pub use items::{CartItem, CartItemUuid, NewCartItem};
pub use receipt::{CartReceipt, ReceiptError};
pub use totals::{CartTotals, PricingPolicy, PricingPolicyError, calculate_totals};

/// Cart UUID
pub type CartUuid = TypedUuid<Cart>;

/// Days after creation when a cart expires.
pub const CART_EXPIRY_DAYS: i64 = 30;

/// Errors raised by cart mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// No line with the given UUID.
    #[error("item not found in cart")]
    ItemNotFound(CartItemUuid),

    /// Quantity must be at least one when adding.
    #[error("quantity must be greater than zero")]
    InvalidQuantity,

    /// Requested more units than are available.
    #[error("only {available} of {name} available, requested {requested}")]
    InsufficientStock {
        /// Product display name
        name: String,
        /// Units requested in total
        requested: u32,
        /// Units available
        available: u32,
    },

    /// Product is not listed.
    #[error("{0} is not available for purchase")]
    ProductUnavailable(String),

    /// The cart has been converted, abandoned or expired.
    #[error("cart is {0} and can no longer be changed")]
    NotActive(CartStatus),

    /// Coupon could not be applied.
    #[error(transparent)]
    Coupon(#[from] CouponError),
}

impl CartError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ItemNotFound(_) => "cart_item_not_found",
            Self::InvalidQuantity => "invalid_quantity",
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::ProductUnavailable(_) => "product_unavailable",
            Self::NotActive(_) => "cart_not_active",
            Self::Coupon(error) => error.code(),
        }
    }
}

/// Lifecycle state of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartStatus {
    /// Being shopped
    Active,

    /// Left without checkout
    Abandoned,

    /// Turned into an order
    Converted,

    /// Past its expiry time
    Expired,
}

impl std::fmt::Display for CartStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Active => "active",
            Self::Abandoned => "abandoned",
            Self::Converted => "converted",
            Self::Expired => "expired",
        };

        f.write_str(name)
    }
}

/// Shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart UUID
    pub uuid: CartUuid,

    /// Owner, when signed in
    pub user_uuid: Option<UserUuid>,

    /// Lines in insertion order
    pub items: Vec<CartItem>,

    /// Applied coupon
    pub coupon: Option<AppliedCoupon>,

    /// Computed amounts
    pub totals: CartTotals,

    /// Lifecycle state
    pub status: CartStatus,

    /// Creation time
    pub created_at: Timestamp,

    /// Last mutation
    pub updated_at: Timestamp,

    /// Last customer interaction
    pub last_activity_at: Timestamp,

    /// Expiry time
    pub expires_at: Timestamp,
}

impl Cart {
    /// Create an empty cart.
    pub fn new(user_uuid: Option<UserUuid>, now: Timestamp) -> Self {
        Self {
            uuid: CartUuid::new(),
            user_uuid,
            items: Vec::new(),
            coupon: None,
            totals: CartTotals::default(),
            status: CartStatus::Active,
            created_at: now,
            updated_at: now,
            last_activity_at: now,
            expires_at: now + SignedDuration::from_hours(CART_EXPIRY_DAYS * 24),
        }
    }

    /// Find a line.
    pub fn item(&self, uuid: CartItemUuid) -> Option<&CartItem> {
        self.items.iter().find(|item| item.uuid == uuid)
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the cart can still be changed.
    pub fn is_active(&self) -> bool {
        self.status == CartStatus::Active
    }

    /// Whether the expiry time has passed.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.status == CartStatus::Expired || now >= self.expires_at
    }

    /// Add units of a product, merging with an existing line for the same
    /// product and variant.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the cart is not active, the quantity is zero,
    /// the product is unlisted, or stock is insufficient.
    pub fn add_item(
        &mut self,
        item: NewCartItem,
        now: Timestamp,
        policy: &PricingPolicy,
    ) -> Result<&CartItem, CartError> {
        self.ensure_active()?;

        if item.quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        if !item.purchasable {
            return Err(CartError::ProductUnavailable(item.product.name));
        }

        let position = self
            .items
            .iter()
            .position(|line| line.is_same_purchasable(item.product_uuid, item.variant_uuid));

        let index = match position {
            Some(index) => {
                let Some(line) = self.items.get_mut(index) else {
                    return Err(CartError::InvalidQuantity);
                };

                let requested = line.quantity.saturating_add(item.quantity);
                ensure_stock(&line.display_name(), requested, item.available)?;

                line.quantity = requested;
                line.unit_price = item.unit_price;
                line.compare_at_price = item.compare_at_price;
                line.max_quantity = item.available;
                line.in_stock = item.available > 0;
                line.recalculate();

                index
            }
            None => {
                let line = item.into_item(now);
                ensure_stock(&line.display_name(), line.quantity, line.max_quantity)?;
                self.items.push(line);

                self.items.len() - 1
            }
        };

        self.refresh(now, policy);

        self.items.get(index).ok_or(CartError::InvalidQuantity)
    }

    /// Set the quantity of a line; zero removes it.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the cart is not active, the line does not
    /// exist, or stock is insufficient.
    pub fn update_quantity(
        &mut self,
        uuid: CartItemUuid,
        quantity: u32,
        now: Timestamp,
        policy: &PricingPolicy,
    ) -> Result<(), CartError> {
        self.ensure_active()?;

        if quantity == 0 {
            return self.remove_item(uuid, now, policy);
        }

        let line = self
            .items
            .iter_mut()
            .find(|item| item.uuid == uuid)
            .ok_or(CartError::ItemNotFound(uuid))?;

        ensure_stock(&line.display_name(), quantity, line.max_quantity)?;

        line.quantity = quantity;
        line.recalculate();

        self.refresh(now, policy);

        Ok(())
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the cart is not active or the line does not exist.
    pub fn remove_item(
        &mut self,
        uuid: CartItemUuid,
        now: Timestamp,
        policy: &PricingPolicy,
    ) -> Result<(), CartError> {
        self.ensure_active()?;

        let before = self.items.len();
        self.items.retain(|item| item.uuid != uuid);

        if self.items.len() == before {
            return Err(CartError::ItemNotFound(uuid));
        }

        self.refresh(now, policy);

        Ok(())
    }

    /// Validate and apply a coupon, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the cart is not active or the coupon is not valid
    /// for this cart.
    pub fn apply_coupon(
        &mut self,
        coupon: &Coupon,
        user_redemptions: u32,
        now: Timestamp,
        policy: &PricingPolicy,
    ) -> Result<(), CartError> {
        self.ensure_active()?;

        coupon.validate(&CouponContext {
            now,
            items: &self.items,
            user_redemptions,
        })?;

        self.coupon = Some(coupon.applied(now));
        self.refresh(now, policy);

        Ok(())
    }

    /// Drop the applied coupon, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotActive`] if the cart is not active.
    pub fn remove_coupon(
        &mut self,
        now: Timestamp,
        policy: &PricingPolicy,
    ) -> Result<Option<AppliedCoupon>, CartError> {
        self.ensure_active()?;

        let removed = self.coupon.take();
        self.refresh(now, policy);

        Ok(removed)
    }

    /// Check the applied coupon against the coupon as currently stored.
    /// `coupon` is `None` when no coupon with that code exists any more. A
    /// cart without a coupon always passes.
    ///
    /// # Errors
    ///
    /// Returns the [`CouponError`] that would now reject the applied coupon.
    pub fn check_coupon(
        &self,
        coupon: Option<&Coupon>,
        user_redemptions: u32,
        now: Timestamp,
    ) -> Result<(), CouponError> {
        let Some(applied) = &self.coupon else {
            return Ok(());
        };

        let coupon = coupon
            .filter(|coupon| coupon.matches_code(&applied.code))
            .ok_or_else(|| CouponError::NotFound(applied.code.clone()))?;

        coupon.validate(&CouponContext {
            now,
            items: &self.items,
            user_redemptions,
        })
    }

    /// Remove every line and the coupon.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotActive`] if the cart is not active.
    pub fn clear(&mut self, now: Timestamp, policy: &PricingPolicy) -> Result<(), CartError> {
        self.ensure_active()?;

        self.items.clear();
        self.coupon = None;
        self.refresh(now, policy);

        Ok(())
    }

    /// Recompute totals under a (possibly changed) pricing policy.
    pub fn reprice(&mut self, policy: &PricingPolicy) {
        self.totals = calculate_totals(&self.items, self.coupon.as_ref(), policy);
    }

    /// Mark the cart expired.
    pub fn expire(&mut self, now: Timestamp) {
        self.set_status(CartStatus::Expired, now);
    }

    /// Mark the cart abandoned.
    pub fn mark_abandoned(&mut self, now: Timestamp) {
        self.set_status(CartStatus::Abandoned, now);
    }

    /// Mark the cart converted into an order.
    pub fn mark_converted(&mut self, now: Timestamp) {
        self.set_status(CartStatus::Converted, now);
    }

    /// Attach the cart to a signed-in user.
    pub fn assign_user(&mut self, user: UserUuid, now: Timestamp) {
        self.user_uuid = Some(user);
        self.updated_at = now;
    }

    fn set_status(&mut self, status: CartStatus, now: Timestamp) {
        self.status = status;
        self.updated_at = now;
    }

    fn ensure_active(&self) -> Result<(), CartError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(CartError::NotActive(self.status))
        }
    }

    /// Drop a coupon whose minimum purchase is no longer met, recompute the
    /// totals and touch the timestamps.
    fn refresh(&mut self, now: Timestamp, policy: &PricingPolicy) {
        let subtotal = self.items.iter().map(|item| item.subtotal).sum();

        if self
            .coupon
            .as_ref()
            .is_some_and(|coupon| self.is_empty() || !coupon.restrictions.meets_minimum(subtotal))
        {
            self.coupon = None;
        }

        self.reprice(policy);
        self.updated_at = now;
        self.last_activity_at = now;
    }
}

fn ensure_stock(name: &str, requested: u32, available: u32) -> Result<(), CartError> {
    if requested > available {
        return Err(CartError::InsufficientStock {
            name: name.to_string(),
            requested,
            available,
        });
    }

    Ok(())
}
