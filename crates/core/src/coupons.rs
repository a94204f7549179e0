//! Coupons
//!
//! A coupon is a discount code with a type, a value and a set of eligibility
//! restrictions. Validity is a pure predicate over the current time, usage
//! counters and the cart contents.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    carts::CartItem,
    money::{clamp_non_negative, round_money},
    products::ProductUuid,
};

/// Errors raised when validating or applying a coupon.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CouponError {
    /// No coupon exists with the given code.
    #[error("coupon {0} is not valid")]
    NotFound(String),

    /// The coupon has been switched off.
    #[error("coupon {0} is no longer active")]
    Inactive(String),

    /// The validity window has not started.
    #[error("coupon {code} is valid from {starts_at}")]
    NotYetValid {
        /// Coupon code
        code: String,
        /// Start of the validity window
        starts_at: Timestamp,
    },

    /// The validity window has ended.
    #[error("coupon {0} has expired")]
    Expired(String),

    /// Global usage limit reached.
    #[error("coupon {0} has reached its usage limit")]
    UsageLimitReached(String),

    /// Per-user usage limit reached.
    #[error("you have already used coupon {0} the maximum number of times")]
    UserLimitReached(String),

    /// Cart subtotal below the minimum purchase.
    #[error("coupon {code} requires a minimum purchase of {minimum}")]
    MinimumNotMet {
        /// Coupon code
        code: String,
        /// Required subtotal
        minimum: Decimal,
    },

    /// No cart item matches the category/product allow-lists.
    #[error("coupon {0} does not apply to any item in your cart")]
    NoEligibleItems(String),

    /// Value is negative or a percentage above 100.
    #[error("coupon value {0} is out of range")]
    InvalidValue(Decimal),
}

impl CouponError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) | Self::Inactive(_) | Self::InvalidValue(_) => "coupon_invalid",
            Self::NotYetValid { .. } => "coupon_not_yet_valid",
            Self::Expired(_) => "coupon_expired",
            Self::UsageLimitReached(_) | Self::UserLimitReached(_) => "coupon_usage_limit",
            Self::MinimumNotMet { .. } => "coupon_minimum_not_met",
            Self::NoEligibleItems(_) => "coupon_not_applicable",
        }
    }
}

/// How a coupon reduces the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `value` percent off the eligible subtotal.
    Percentage,

    /// `value` off the eligible subtotal.
    Fixed,

    /// Shipping is waived; no line discount.
    FreeShipping,
}

/// Eligibility restrictions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponRestrictions {
    /// Minimum cart subtotal
    #[serde(default)]
    pub minimum_purchase: Option<Decimal>,

    /// Category slugs the coupon applies to; empty means all
    #[serde(default)]
    pub categories: Vec<String>,

    /// Products the coupon applies to; empty means all
    #[serde(default)]
    pub products: Vec<ProductUuid>,

    /// Redemptions allowed per user
    #[serde(default)]
    pub per_user_limit: Option<u32>,
}

impl CouponRestrictions {
    /// Whether any allow-list is set.
    pub fn is_targeted(&self) -> bool {
        !self.categories.is_empty() || !self.products.is_empty()
    }

    /// Whether a cart line matches the allow-lists.
    pub fn applies_to(&self, item: &CartItem) -> bool {
        if !self.is_targeted() {
            return true;
        }

        self.products.contains(&item.product_uuid)
            || self
                .categories
                .iter()
                .any(|category| category.eq_ignore_ascii_case(&item.product.category))
    }

    /// Subtotal of the lines the coupon applies to.
    pub fn eligible_subtotal(&self, items: &[CartItem]) -> Decimal {
        items
            .iter()
            .filter(|item| self.applies_to(item))
            .map(|item| item.subtotal)
            .sum()
    }

    /// Whether the subtotal satisfies the minimum purchase.
    pub fn meets_minimum(&self, subtotal: Decimal) -> bool {
        self.minimum_purchase
            .is_none_or(|minimum| subtotal >= minimum)
    }
}

/// Discount code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    /// Code typed by the customer, stored upper-case
    pub code: String,

    /// Human description
    #[serde(default)]
    pub description: String,

    /// Discount kind
    pub discount_type: DiscountType,

    /// Percent (0-100) or fixed amount; ignored for free shipping
    pub value: Decimal,

    /// Cap on a percentage discount
    #[serde(default)]
    pub max_discount: Option<Decimal>,

    /// Total redemptions allowed
    #[serde(default)]
    pub usage_limit: Option<u32>,

    /// Redemptions so far
    #[serde(default)]
    pub usage_count: u32,

    /// Start of the validity window
    #[serde(default)]
    pub valid_from: Option<Timestamp>,

    /// End of the validity window
    #[serde(default)]
    pub valid_until: Option<Timestamp>,

    /// Switched on
    pub active: bool,

    /// Eligibility restrictions
    #[serde(default)]
    pub restrictions: CouponRestrictions,
}

/// Everything the validity predicate looks at besides the coupon itself.
#[derive(Debug, Clone, Copy)]
pub struct CouponContext<'a> {
    /// Evaluation time
    pub now: Timestamp,

    /// Cart lines
    pub items: &'a [CartItem],

    /// Times the current user has already redeemed this coupon
    pub user_redemptions: u32,
}

/// Normalise a customer-entered code for lookup.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

impl Coupon {
    /// Check the coupon's own value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::InvalidValue`] for negative values or percentages above 100.
    pub fn validate_value(&self) -> Result<(), CouponError> {
        let out_of_range = self.value.is_sign_negative()
            || (self.discount_type == DiscountType::Percentage && self.value > Decimal::ONE_HUNDRED)
            || self.max_discount.is_some_and(|cap| cap.is_sign_negative());

        if out_of_range {
            return Err(CouponError::InvalidValue(self.value));
        }

        Ok(())
    }

    /// Whether `code` refers to this coupon.
    pub fn matches_code(&self, code: &str) -> bool {
        self.code.eq_ignore_ascii_case(code.trim())
    }

    /// Evaluate the validity predicate.
    ///
    /// # Errors
    ///
    /// Returns the first [`CouponError`] that makes the coupon unusable.
    pub fn validate(&self, ctx: &CouponContext<'_>) -> Result<(), CouponError> {
        self.validate_value()?;

        let code = || self.code.clone();

        if !self.active {
            return Err(CouponError::Inactive(code()));
        }

        if let Some(starts_at) = self.valid_from
            && ctx.now < starts_at
        {
            return Err(CouponError::NotYetValid {
                code: code(),
                starts_at,
            });
        }

        if self.valid_until.is_some_and(|ends_at| ctx.now > ends_at) {
            return Err(CouponError::Expired(code()));
        }

        if self
            .usage_limit
            .is_some_and(|limit| self.usage_count >= limit)
        {
            return Err(CouponError::UsageLimitReached(code()));
        }

        if self
            .restrictions
            .per_user_limit
            .is_some_and(|limit| ctx.user_redemptions >= limit)
        {
            return Err(CouponError::UserLimitReached(code()));
        }

        let subtotal: Decimal = ctx.items.iter().map(|item| item.subtotal).sum();

        if let Some(minimum) = self.restrictions.minimum_purchase
            && subtotal < minimum
        {
            return Err(CouponError::MinimumNotMet {
                code: code(),
                minimum,
            });
        }

        if self.restrictions.is_targeted()
            && !ctx
                .items
                .iter()
                .any(|item| self.restrictions.applies_to(item))
        {
            return Err(CouponError::NoEligibleItems(code()));
        }

        Ok(())
    }

    /// Snapshot of the coupon as stored on a cart.
    pub fn applied(&self, now: Timestamp) -> AppliedCoupon {
        AppliedCoupon {
            code: self.code.clone(),
            discount_type: self.discount_type,
            value: self.value,
            max_discount: self.max_discount,
            restrictions: self.restrictions.clone(),
            applied_at: now,
        }
    }
}

/// Coupon terms frozen onto a cart when applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedCoupon {
    /// Coupon code
    pub code: String,

    /// Discount kind
    pub discount_type: DiscountType,

    /// Percent or fixed amount
    pub value: Decimal,

    /// Cap on a percentage discount
    pub max_discount: Option<Decimal>,

    /// Eligibility restrictions
    pub restrictions: CouponRestrictions,

    /// Time of application
    pub applied_at: Timestamp,
}

impl AppliedCoupon {
    /// Discount off the given eligible subtotal.
    ///
    /// Percentage discounts respect the cap; every discount is clipped to the
    /// subtotal and never negative. Free shipping contributes nothing here.
    pub fn discount_for(&self, eligible_subtotal: Decimal) -> Decimal {
        let subtotal = clamp_non_negative(eligible_subtotal);

        let raw = match self.discount_type {
            DiscountType::Percentage => {
                let discount = round_money(subtotal * self.value / Decimal::ONE_HUNDRED);

                self.max_discount.map_or(discount, |cap| discount.min(cap))
            }
            DiscountType::Fixed => self.value,
            DiscountType::FreeShipping => Decimal::ZERO,
        };

        round_money(clamp_non_negative(raw).min(subtotal))
    }

    /// Whether shipping is waived.
    pub fn is_free_shipping(&self) -> bool {
        self.discount_type == DiscountType::FreeShipping
    }
}


#[cfg(test)]
mod tests {
    use jiff::SignedDuration;

    use crate::{
        carts::test_support::item,
        products::test_support::product,
    };

    use super::{test_support::coupon, *};

    fn ctx(items: &[CartItem]) -> CouponContext<'_> {
        CouponContext {
            now: Timestamp::UNIX_EPOCH + SignedDuration::from_hours(1_000),
            items,
            user_redemptions: 0,
        }
    }

    #[test]
    fn percentage_discount_respects_cap() {
        let mut ten_percent = coupon("TEN", DiscountType::Percentage, 10);
        ten_percent.max_discount = Some(Decimal::new(80, 0));

        let applied = ten_percent.applied(Timestamp::UNIX_EPOCH);

        assert_eq!(applied.discount_for(Decimal::new(1000, 0)), Decimal::new(80, 0));
        assert_eq!(applied.discount_for(Decimal::new(500, 0)), Decimal::new(50, 0));
    }

    #[test]
    fn fixed_discount_is_clipped_to_subtotal() {
        let applied = coupon("FIXED", DiscountType::Fixed, 300).applied(Timestamp::UNIX_EPOCH);

        assert_eq!(applied.discount_for(Decimal::new(120, 0)), Decimal::new(120, 0));
        assert_eq!(applied.discount_for(Decimal::new(1000, 0)), Decimal::new(300, 0));
    }

    #[test]
    fn free_shipping_has_no_line_discount() {
        let applied = coupon("SHIP", DiscountType::FreeShipping, 0).applied(Timestamp::UNIX_EPOCH);

        assert_eq!(applied.discount_for(Decimal::new(1000, 0)), Decimal::ZERO);
        assert!(applied.is_free_shipping());
    }

    #[test]
    fn inactive_coupon_is_rejected() {
        let mut welcome = coupon("WELCOME", DiscountType::Fixed, 50);
        welcome.active = false;

        let items = [item(&product("Mug", 100, 5), 1)];

        assert_eq!(
            welcome.validate(&ctx(&items)),
            Err(CouponError::Inactive("WELCOME".to_string()))
        );
    }

    #[test]
    fn validity_window_is_enforced() {
        let items = [item(&product("Mug", 100, 5), 1)];
        let context = ctx(&items);

        let mut early = coupon("EARLY", DiscountType::Fixed, 50);
        early.valid_from = Some(context.now + SignedDuration::from_hours(1));

        let mut late = coupon("LATE", DiscountType::Fixed, 50);
        late.valid_until = Some(context.now - SignedDuration::from_hours(1));

        assert!(matches!(
            early.validate(&context),
            Err(CouponError::NotYetValid { .. })
        ));
        assert_eq!(
            late.validate(&context),
            Err(CouponError::Expired("LATE".to_string()))
        );
    }

    #[test]
    fn usage_limits_are_enforced() {
        let items = [item(&product("Mug", 100, 5), 1)];

        let mut limited = coupon("LIMITED", DiscountType::Fixed, 10);
        limited.usage_limit = Some(3);
        limited.usage_count = 3;

        assert_eq!(
            limited.validate(&ctx(&items)),
            Err(CouponError::UsageLimitReached("LIMITED".to_string()))
        );

        let mut once = coupon("ONCE", DiscountType::Fixed, 10);
        once.restrictions.per_user_limit = Some(1);

        let context = CouponContext {
            user_redemptions: 1,
            ..ctx(&items)
        };

        assert_eq!(
            once.validate(&context),
            Err(CouponError::UserLimitReached("ONCE".to_string()))
        );
    }

    #[test]
    fn minimum_purchase_is_enforced() {
        let items = [item(&product("Mug", 100, 5), 2)];

        let mut big_spender = coupon("BIG", DiscountType::Fixed, 10);
        big_spender.restrictions.minimum_purchase = Some(Decimal::new(500, 0));

        assert_eq!(
            big_spender.validate(&ctx(&items)),
            Err(CouponError::MinimumNotMet {
                code: "BIG".to_string(),
                minimum: Decimal::new(500, 0),
            })
        );
    }

    #[test]
    fn category_allow_list_requires_a_matching_item() {
        let items = [item(&product("Mug", 100, 5), 1)];

        let mut shoes_only = coupon("SHOES", DiscountType::Percentage, 20);
        shoes_only.restrictions.categories = vec!["shoes".to_string()];

        assert_eq!(
            shoes_only.validate(&ctx(&items)),
            Err(CouponError::NoEligibleItems("SHOES".to_string()))
        );

        shoes_only.restrictions.categories = vec!["GENERAL".to_string()];

        assert_eq!(shoes_only.validate(&ctx(&items)), Ok(()));
    }

    #[test]
    fn percentage_over_one_hundred_is_invalid() {
        let greedy = coupon("GREEDY", DiscountType::Percentage, 150);

        assert_eq!(
            greedy.validate_value(),
            Err(CouponError::InvalidValue(Decimal::new(150, 0)))
        );
    }

    #[test]
    fn codes_match_case_insensitively() {
        let welcome = coupon("WELCOME", DiscountType::Fixed, 50);

        assert!(welcome.matches_code(" welcome "));
        assert_eq!(normalize_code(" welcome "), "WELCOME");
    }
}
