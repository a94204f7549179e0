//! Products

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{reviews::RatingSummary, uuids::TypedUuid};

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Product Variant UUID
pub type VariantUuid = TypedUuid<ProductVariant>;

/// Catalog visibility of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Listed and purchasable.
    Active,

    /// Not yet published.
    Draft,

    /// Retired from the catalog.
    Archived,
}

/// Named attribute on a variant, e.g. `size = M`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantAttribute {
    /// Attribute name
    pub name: String,

    /// Attribute value
    pub value: String,
}

/// Product Variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant UUID
    pub uuid: VariantUuid,

    /// Stock keeping unit
    pub sku: String,

    /// Display name, e.g. "Blue / M"
    pub name: String,

    /// Distinguishing attributes
    #[serde(default)]
    pub attributes: Vec<VariantAttribute>,

    /// Price override; the product price applies when absent
    #[serde(default)]
    pub price: Option<Decimal>,

    /// Compare-at price override
    #[serde(default)]
    pub compare_at_price: Option<Decimal>,

    /// Units in stock
    pub stock: u32,
}

/// Product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product UUID
    pub uuid: ProductUuid,

    /// Product name
    pub name: String,

    /// URL slug
    pub slug: String,

    /// Long description
    #[serde(default)]
    pub description: String,

    /// Category slug
    pub category: String,

    /// Brand name
    #[serde(default)]
    pub brand: Option<String>,

    /// Selling price
    pub price: Decimal,

    /// "Was" price shown crossed out when higher than `price`
    #[serde(default)]
    pub compare_at_price: Option<Decimal>,

    /// Image URLs, primary first
    #[serde(default)]
    pub images: Vec<String>,

    /// Purchasable variants; empty for single-variant products
    #[serde(default)]
    pub variants: Vec<ProductVariant>,

    /// Units in stock for products without variants
    pub stock: u32,

    /// Catalog status
    pub status: ProductStatus,

    /// Review aggregate
    #[serde(default)]
    pub rating: RatingSummary,

    /// Creation time
    pub created_at: Timestamp,
}

impl Product {
    /// Find a variant by UUID.
    pub fn variant(&self, uuid: VariantUuid) -> Option<&ProductVariant> {
        self.variants.iter().find(|variant| variant.uuid == uuid)
    }

    /// Find a variant by SKU (case-insensitive).
    pub fn variant_by_sku(&self, sku: &str) -> Option<&ProductVariant> {
        self.variants
            .iter()
            .find(|variant| variant.sku.eq_ignore_ascii_case(sku))
    }

    /// Whether the product is listed.
    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }

    /// Whether the product (or chosen variant) can be added to a cart.
    pub fn is_purchasable(&self, variant: Option<&ProductVariant>) -> bool {
        self.is_active() && self.available_stock(variant) > 0
    }

    /// Price charged per unit for the given variant.
    pub fn effective_price(&self, variant: Option<&ProductVariant>) -> Decimal {
        variant.and_then(|v| v.price).unwrap_or(self.price)
    }

    /// Compare-at price for the given variant.
    pub fn effective_compare_at(&self, variant: Option<&ProductVariant>) -> Option<Decimal> {
        variant
            .and_then(|v| v.compare_at_price)
            .or(self.compare_at_price)
    }

    /// Units available for the given variant.
    pub fn available_stock(&self, variant: Option<&ProductVariant>) -> u32 {
        variant.map_or(self.stock, |v| v.stock)
    }

    /// Total stock across variants (or the product stock when it has none).
    pub fn total_stock(&self) -> u32 {
        if self.variants.is_empty() {
            self.stock
        } else {
            self.variants.iter().map(|v| v.stock).sum()
        }
    }

    /// Whether the product is currently marked down.
    pub fn is_on_sale(&self) -> bool {
        self.compare_at_price
            .is_some_and(|compare_at| compare_at > self.price)
    }

    /// Primary image, if any.
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Product display data frozen onto a cart item so the cart survives catalog changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    /// Product name
    pub name: String,

    /// URL slug
    pub slug: String,

    /// Primary image
    pub image: Option<String>,

    /// Category slug
    pub category: String,

    /// Brand name
    pub brand: Option<String>,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            slug: product.slug.clone(),
            image: product.primary_image().map(str::to_string),
            category: product.category.clone(),
            brand: product.brand.clone(),
        }
    }
}

/// Variant display data frozen onto a cart item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSnapshot {
    /// Stock keeping unit
    pub sku: String,

    /// Display name
    pub name: String,

    /// Distinguishing attributes
    pub attributes: Vec<VariantAttribute>,
}

impl From<&ProductVariant> for VariantSnapshot {
    fn from(variant: &ProductVariant) -> Self {
        Self {
            sku: variant.sku.clone(),
            name: variant.name.clone(),
            attributes: variant.attributes.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub(crate) fn product(name: &str, price: i64, stock: u32) -> Product {
        Product {
            uuid: ProductUuid::new(),
            name: name.to_string(),
            slug: name.to_ascii_lowercase().replace(' ', "-"),
            description: String::new(),
            category: "general".to_string(),
            brand: None,
            price: Decimal::new(price, 0),
            compare_at_price: None,
            images: vec![format!("https://cdn.example.com/{name}.jpg")],
            variants: Vec::new(),
            stock,
            status: ProductStatus::Active,
            rating: RatingSummary::default(),
            created_at: Timestamp::UNIX_EPOCH,
        }
    }

    pub(crate) fn variant(sku: &str, price: Option<i64>, stock: u32) -> ProductVariant {
        ProductVariant {
            uuid: VariantUuid::new(),
            sku: sku.to_string(),
            name: sku.to_string(),
            attributes: vec![VariantAttribute {
                name: "size".to_string(),
                value: sku.to_string(),
            }],
            price: price.map(|p| Decimal::new(p, 0)),
            compare_at_price: None,
            stock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{test_support::*, *};

    #[test]
    fn variant_price_overrides_product_price() {
        let mut shirt = product("Shirt", 300, 5);
        shirt.variants.push(variant("M", Some(350), 2));
        shirt.variants.push(variant("S", None, 0));

        let medium = shirt.variant_by_sku("m");
        let small = shirt.variant_by_sku("S");

        assert_eq!(shirt.effective_price(medium), Decimal::new(350, 0));
        assert_eq!(shirt.effective_price(small), Decimal::new(300, 0));
        assert_eq!(shirt.total_stock(), 2);
        assert!(shirt.is_purchasable(medium));
        assert!(!shirt.is_purchasable(small));
    }

    #[test]
    fn archived_products_are_not_purchasable() {
        let mut mug = product("Mug", 120, 10);
        mug.status = ProductStatus::Archived;

        assert!(!mug.is_purchasable(None));
    }

    #[test]
    fn snapshot_copies_display_fields() {
        let mug = product("Mug", 120, 10);
        let snapshot = ProductSnapshot::from(&mug);

        assert_eq!(snapshot.name, "Mug");
        assert_eq!(snapshot.slug, "mug");
        assert_eq!(snapshot.image.as_deref(), mug.primary_image());
    }

    #[test]
    fn on_sale_requires_higher_compare_at() {
        let mut mug = product("Mug", 120, 10);
        assert!(!mug.is_on_sale());

        mug.compare_at_price = Some(Decimal::new(100, 0));
        assert!(!mug.is_on_sale());

        mug.compare_at_price = Some(Decimal::new(150, 0));
        assert!(mug.is_on_sale());
    }
}
