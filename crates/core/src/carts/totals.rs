//! Cart Totals

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    carts::CartItem,
    coupons::AppliedCoupon,
    money::{clamp_non_negative, find_currency, round_money},
};

/// Errors building a pricing policy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingPolicyError {
    /// A rate or amount was negative.
    #[error("{0} cannot be negative")]
    Negative(&'static str),

    /// The currency code is not a known ISO-4217 currency.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Store-wide pricing settings applied to every cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// ISO-4217 currency code
    pub currency: String,

    /// Tax rate as a fraction, e.g. `0.16`
    pub tax_rate: Decimal,

    /// Flat shipping cost
    pub shipping_cost: Decimal,

    /// Subtotal at which shipping becomes free
    pub free_shipping_threshold: Option<Decimal>,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            currency: "MXN".to_string(),
            tax_rate: Decimal::new(16, 2),
            shipping_cost: Decimal::new(99, 0),
            free_shipping_threshold: None,
        }
    }
}

impl PricingPolicy {
    /// Build a validated policy.
    ///
    /// # Errors
    ///
    /// Returns [`PricingPolicyError`] for negative values or an unknown currency.
    pub fn new(
        currency: &str,
        tax_rate: Decimal,
        shipping_cost: Decimal,
        free_shipping_threshold: Option<Decimal>,
    ) -> Result<Self, PricingPolicyError> {
        let currency = find_currency(currency)
            .map_err(|error| PricingPolicyError::UnknownCurrency(error.to_string()))?;

        if tax_rate.is_sign_negative() {
            return Err(PricingPolicyError::Negative("tax rate"));
        }

        if shipping_cost.is_sign_negative() {
            return Err(PricingPolicyError::Negative("shipping cost"));
        }

        if free_shipping_threshold.is_some_and(|threshold| threshold.is_sign_negative()) {
            return Err(PricingPolicyError::Negative("free shipping threshold"));
        }

        Ok(Self {
            currency: currency.iso_alpha_code.to_string(),
            tax_rate,
            shipping_cost,
            free_shipping_threshold,
        })
    }
}

/// Computed cart amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    /// Σ line subtotals
    pub subtotal: Decimal,

    /// Σ compare-at savings
    pub items_discount: Decimal,

    /// Coupon discount
    pub coupon_discount: Decimal,

    /// Amount tax is charged on
    pub taxable_amount: Decimal,

    /// Tax
    pub tax: Decimal,

    /// Shipping after coupon and threshold
    pub shipping: Decimal,

    /// Amount due, never negative
    pub total: Decimal,
}

impl CartTotals {
    /// Everything the customer saves: markdowns, coupon and waived shipping.
    pub fn savings(&self, policy: &PricingPolicy) -> Decimal {
        let waived_shipping = if self.subtotal > Decimal::ZERO {
            clamp_non_negative(policy.shipping_cost - self.shipping)
        } else {
            Decimal::ZERO
        };

        self.items_discount + self.coupon_discount + waived_shipping
    }
}

/// Compute all cart amounts in a single pass.
///
/// Empty carts cost nothing, including shipping. The coupon discount is taken
/// off the subtotal of the lines it applies to, clipped to that subtotal, and
/// tax is charged on what remains.
pub fn calculate_totals(
    items: &[CartItem],
    coupon: Option<&AppliedCoupon>,
    policy: &PricingPolicy,
) -> CartTotals {
    if items.is_empty() {
        return CartTotals::default();
    }

    let subtotal = round_money(items.iter().map(|item| item.subtotal).sum());
    let items_discount = round_money(items.iter().map(|item| item.discount).sum());

    let coupon_discount = coupon.map_or(Decimal::ZERO, |coupon| {
        coupon
            .discount_for(coupon.restrictions.eligible_subtotal(items))
            .min(subtotal)
    });

    let taxable_amount = clamp_non_negative(subtotal - coupon_discount);
    let tax = round_money(taxable_amount * policy.tax_rate);

    let free_by_coupon = coupon.is_some_and(AppliedCoupon::is_free_shipping);
    let free_by_threshold = policy
        .free_shipping_threshold
        .is_some_and(|threshold| subtotal >= threshold);

    let shipping = if free_by_coupon || free_by_threshold {
        Decimal::ZERO
    } else {
        clamp_non_negative(policy.shipping_cost)
    };

    let total = round_money(clamp_non_negative(taxable_amount + tax + shipping));

    CartTotals {
        subtotal,
        items_discount,
        coupon_discount,
        taxable_amount,
        tax,
        shipping,
        total,
    }
}
