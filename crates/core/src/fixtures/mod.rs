//! Fixtures
//!
//! Sample catalog and coupon data in YAML, used to seed the mock backend.

use std::{fs, path::Path};

use jiff::Timestamp;
use rusty_money::iso::Currency;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    coupons::{Coupon, CouponError},
    money::find_currency,
    products::Product,
};

pub mod products;

use products::ProductFixture;

/// Sample data shipped with the crate.
pub const SAMPLE_FIXTURE: &str = include_str!("../../fixtures/catalog.yml");

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Coupon with an out-of-range value
    #[error("Invalid coupon: {0}")]
    InvalidCoupon(#[from] CouponError),
}

#[derive(Debug, Deserialize)]
struct FixtureFile {
    currency: String,

    #[serde(default)]
    products: rustc_hash::FxHashMap<String, ProductFixture>,

    #[serde(default)]
    coupons: Vec<Coupon>,
}

/// Loaded fixture set.
#[derive(Debug, Clone)]
pub struct Fixture {
    currency: &'static Currency,
    products: Vec<Product>,
    coupons: Vec<Coupon>,
}

impl Fixture {
    /// Load the bundled sample fixture.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled YAML is invalid.
    pub fn sample(created_at: Timestamp) -> Result<Self, FixtureError> {
        Self::from_yaml(SAMPLE_FIXTURE, created_at)
    }

    /// Load a fixture from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>, created_at: Timestamp) -> Result<Self, FixtureError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents, created_at)
    }

    /// Parse a fixture from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed, a price is invalid or a coupon
    /// value is out of range.
    pub fn from_yaml(yaml: &str, created_at: Timestamp) -> Result<Self, FixtureError> {
        let file: FixtureFile = serde_norway::from_str(yaml)?;

        let currency = find_currency(&file.currency)
            .map_err(|_err| FixtureError::UnknownCurrency(file.currency.clone()))?;

        let mut products = file
            .products
            .into_iter()
            .map(|(slug, fixture)| fixture.into_product(&slug, currency, created_at))
            .collect::<Result<Vec<_>, _>>()?;

        products.sort_by(|a, b| a.slug.cmp(&b.slug));

        let coupons = file
            .coupons
            .into_iter()
            .map(|mut coupon| {
                coupon.code = crate::coupons::normalize_code(&coupon.code);
                coupon.validate_value().map(|()| coupon)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            currency,
            products,
            coupons,
        })
    }

    /// Fixture currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Products sorted by slug.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Coupons.
    pub fn coupons(&self) -> &[Coupon] {
        &self.coupons
    }

    /// Find a product by slug.
    pub fn product(&self, slug: &str) -> Option<&Product> {
        self.products.iter().find(|product| product.slug == slug)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::coupons::DiscountType;

    use super::*;

    #[test]
    fn sample_fixture_loads() -> TestResult {
        let fixture = Fixture::sample(Timestamp::UNIX_EPOCH)?;

        assert_eq!(fixture.currency().iso_alpha_code, "MXN");
        assert!(!fixture.products().is_empty());
        assert!(!fixture.coupons().is_empty());

        let shirt = fixture
            .product("basic-tee")
            .ok_or("basic-tee should be in the sample fixture")?;

        assert_eq!(shirt.variants.len(), 3);

        Ok(())
    }

    #[test]
    fn coupon_codes_are_normalised() -> TestResult {
        let yaml = r"
currency: MXN
coupons:
  - code: welcome10
    discount_type: percentage
    value: 10
    active: true
";

        let fixture = Fixture::from_yaml(yaml, Timestamp::UNIX_EPOCH)?;
        let coupon = fixture.coupons().first().ok_or("coupon should load")?;

        assert_eq!(coupon.code, "WELCOME10");
        assert_eq!(coupon.discount_type, DiscountType::Percentage);
        assert_eq!(coupon.value, Decimal::new(10, 0));

        Ok(())
    }

    #[test]
    fn invalid_coupon_value_is_rejected() {
        let yaml = r"
currency: MXN
coupons:
  - code: HUGE
    discount_type: percentage
    value: 150
    active: true
";

        let result = Fixture::from_yaml(yaml, Timestamp::UNIX_EPOCH);

        assert!(matches!(result, Err(FixtureError::InvalidCoupon(_))));
    }

    #[test]
    fn product_prices_must_share_currency() {
        let yaml = r#"
currency: MXN
products:
  mug:
    name: Mug
    category: home
    price: "10.00 USD"
"#;

        let result = Fixture::from_yaml(yaml, Timestamp::UNIX_EPOCH);

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(_, _))));
    }
}
