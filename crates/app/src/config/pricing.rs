//! Pricing Config

use clap::Args;
use rust_decimal::Decimal;
use storefront::carts::{PricingPolicy, PricingPolicyError};

/// Tax and shipping settings applied to every cart.
#[derive(Debug, Clone, Args)]
pub struct PricingConfig {
    /// ISO-4217 currency code
    #[arg(long, env = "STOREFRONT_CURRENCY", default_value = "MXN")]
    pub currency: String,

    /// Tax rate as a fraction, e.g. 0.16
    #[arg(long, env = "STOREFRONT_TAX_RATE", default_value = "0.16")]
    pub tax_rate: Decimal,

    /// Flat shipping cost
    #[arg(long, env = "STOREFRONT_SHIPPING_COST", default_value = "99")]
    pub shipping_cost: Decimal,

    /// Subtotal at which shipping becomes free
    #[arg(long, env = "STOREFRONT_FREE_SHIPPING_THRESHOLD")]
    pub free_shipping_threshold: Option<Decimal>,
}

impl PricingConfig {
    /// Build the validated pricing policy.
    ///
    /// # Errors
    ///
    /// Returns an error for negative amounts or an unknown currency.
    pub fn policy(&self) -> Result<PricingPolicy, PricingPolicyError> {
        PricingPolicy::new(
            &self.currency,
            self.tax_rate,
            self.shipping_cost,
            self.free_shipping_threshold,
        )
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        let policy = PricingPolicy::default();

        Self {
            currency: policy.currency,
            tax_rate: policy.tax_rate,
            shipping_cost: policy.shipping_cost,
            free_shipping_threshold: policy.free_shipping_threshold,
        }
    }
}
