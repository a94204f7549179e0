//! Product Fixtures

use jiff::Timestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    fixtures::FixtureError,
    money::find_currency,
    products::{Product, ProductStatus, ProductUuid, ProductVariant, VariantAttribute, VariantUuid},
    reviews::RatingSummary,
};

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Category slug
    pub category: String,

    /// Brand name
    #[serde(default)]
    pub brand: Option<String>,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Product price (e.g., "299.00 MXN")
    pub price: String,

    /// Compare-at price (e.g., "349.00 MXN")
    #[serde(default)]
    pub compare_at: Option<String>,

    /// Units in stock
    #[serde(default)]
    pub stock: u32,

    /// Image URLs
    #[serde(default)]
    pub images: Vec<String>,

    /// Catalog status, active when omitted
    #[serde(default)]
    pub status: Option<ProductStatus>,

    /// Review count and average
    #[serde(default)]
    pub rating: Option<RatingSummary>,

    /// Variants
    #[serde(default)]
    pub variants: Vec<VariantFixture>,
}

/// Variant Fixture
#[derive(Debug, Deserialize)]
pub struct VariantFixture {
    /// Stock keeping unit
    pub sku: String,

    /// Display name
    pub name: String,

    /// Attributes, e.g. `{ size: M }`
    #[serde(default)]
    pub attributes: FxHashMap<String, String>,

    /// Price override
    #[serde(default)]
    pub price: Option<String>,

    /// Units in stock
    #[serde(default)]
    pub stock: u32,
}

impl ProductFixture {
    /// Convert into a catalog product.
    ///
    /// UUIDs are derived from the slug and SKU so reloading the fixture yields
    /// the same identifiers.
    ///
    /// # Errors
    ///
    /// Returns an error if a price is malformed or uses a different currency.
    pub fn into_product(
        self,
        slug: &str,
        currency: &'static Currency,
        created_at: Timestamp,
    ) -> Result<Product, FixtureError> {
        let price = parse_price_in(&self.price, currency)?;

        let compare_at_price = self
            .compare_at
            .as_deref()
            .map(|s| parse_price_in(s, currency))
            .transpose()?;

        let variants = self
            .variants
            .into_iter()
            .map(|variant| variant.into_variant(slug, currency))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Product {
            uuid: ProductUuid::from_uuid(stable_uuid(&["product", slug])),
            name: self.name,
            slug: slug.to_string(),
            description: self.description,
            category: self.category,
            brand: self.brand,
            price,
            compare_at_price,
            images: self.images,
            variants,
            stock: self.stock,
            status: self.status.unwrap_or(ProductStatus::Active),
            rating: self.rating.unwrap_or_default(),
            created_at,
        })
    }
}

impl VariantFixture {
    fn into_variant(
        self,
        slug: &str,
        currency: &'static Currency,
    ) -> Result<ProductVariant, FixtureError> {
        let price = self
            .price
            .as_deref()
            .map(|s| parse_price_in(s, currency))
            .transpose()?;

        let mut attributes: Vec<VariantAttribute> = self
            .attributes
            .into_iter()
            .map(|(name, value)| VariantAttribute { name, value })
            .collect();

        attributes.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(ProductVariant {
            uuid: VariantUuid::from_uuid(stable_uuid(&["variant", slug, &self.sku])),
            sku: self.sku,
            name: self.name,
            attributes,
            price,
            compare_at_price: None,
            stock: self.stock,
        })
    }
}

/// Parse price string (e.g., "299.00 MXN") into an amount and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(Decimal, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    if amount.is_sign_negative() {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    }

    let currency =
        find_currency(code).map_err(|_err| FixtureError::UnknownCurrency(code.to_string()))?;

    Ok((amount, currency))
}

/// Parse a price and check it uses the expected currency.
fn parse_price_in(s: &str, expected: &'static Currency) -> Result<Decimal, FixtureError> {
    let (amount, currency) = parse_price(s)?;

    if currency != expected {
        return Err(FixtureError::CurrencyMismatch(
            expected.iso_alpha_code.to_string(),
            currency.iso_alpha_code.to_string(),
        ));
    }

    Ok(amount)
}

fn stable_uuid(parts: &[&str]) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, parts.join(":").as_bytes())
}
