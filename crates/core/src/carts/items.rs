//! Cart Items

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    money::round_money,
    products::{Product, ProductSnapshot, ProductUuid, ProductVariant, VariantSnapshot, VariantUuid},
    uuids::TypedUuid,
};

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItem>;

/// A line in the cart.
///
/// Product and variant display data are snapshotted when the line is created
/// so the cart still renders if the catalog entry changes or disappears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Line UUID
    pub uuid: CartItemUuid,

    /// Product being bought
    pub product_uuid: ProductUuid,

    /// Chosen variant
    pub variant_uuid: Option<VariantUuid>,

    /// Product display snapshot
    pub product: ProductSnapshot,

    /// Variant display snapshot
    pub variant: Option<VariantSnapshot>,

    /// Units
    pub quantity: u32,

    /// Price charged per unit
    pub unit_price: Decimal,

    /// "Was" price per unit
    pub compare_at_price: Option<Decimal>,

    /// `unit_price × quantity`
    pub subtotal: Decimal,

    /// Savings against the compare-at price
    pub discount: Decimal,

    /// Amount charged for the line
    pub total: Decimal,

    /// Stock was available when last checked
    pub in_stock: bool,

    /// Units available when last checked
    pub max_quantity: u32,

    /// Time the line was created
    pub added_at: Timestamp,
}

impl CartItem {
    /// Whether this line holds the given product/variant pair.
    pub fn is_same_purchasable(
        &self,
        product: ProductUuid,
        variant: Option<VariantUuid>,
    ) -> bool {
        self.product_uuid == product && self.variant_uuid == variant
    }

    /// Recompute subtotal, discount and total from price and quantity.
    pub fn recalculate(&mut self) {
        let quantity = Decimal::from(self.quantity);

        self.subtotal = round_money(self.unit_price * quantity);

        self.discount = self
            .compare_at_price
            .filter(|compare_at| *compare_at > self.unit_price)
            .map_or(Decimal::ZERO, |compare_at| {
                round_money((compare_at - self.unit_price) * quantity)
            });

        self.total = self.subtotal;
    }

    /// Display name including the variant, e.g. "T-Shirt (Blue / M)".
    pub fn display_name(&self) -> String {
        match &self.variant {
            Some(variant) => format!("{} ({})", self.product.name, variant.name),
            None => self.product.name.clone(),
        }
    }
}

/// Data for a new cart line, taken from the catalog at add time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartItem {
    /// Product being bought
    pub product_uuid: ProductUuid,

    /// Chosen variant
    pub variant_uuid: Option<VariantUuid>,

    /// Product display snapshot
    pub product: ProductSnapshot,

    /// Variant display snapshot
    pub variant: Option<VariantSnapshot>,

    /// Units to add
    pub quantity: u32,

    /// Price charged per unit
    pub unit_price: Decimal,

    /// "Was" price per unit
    pub compare_at_price: Option<Decimal>,

    /// Units available
    pub available: u32,

    /// Product is listed
    pub purchasable: bool,
}

impl NewCartItem {
    /// Build a new line from a catalog product and optional variant.
    pub fn from_product(product: &Product, variant: Option<&ProductVariant>, quantity: u32) -> Self {
        Self {
            product_uuid: product.uuid,
            variant_uuid: variant.map(|v| v.uuid),
            product: ProductSnapshot::from(product),
            variant: variant.map(VariantSnapshot::from),
            quantity,
            unit_price: product.effective_price(variant),
            compare_at_price: product.effective_compare_at(variant),
            available: product.available_stock(variant),
            purchasable: product.is_active(),
        }
    }

    pub(crate) fn into_item(self, now: Timestamp) -> CartItem {
        let mut item = CartItem {
            uuid: CartItemUuid::new(),
            product_uuid: self.product_uuid,
            variant_uuid: self.variant_uuid,
            product: self.product,
            variant: self.variant,
            quantity: self.quantity,
            unit_price: self.unit_price,
            compare_at_price: self.compare_at_price,
            subtotal: Decimal::ZERO,
            discount: Decimal::ZERO,
            total: Decimal::ZERO,
            in_stock: self.available > 0,
            max_quantity: self.available,
            added_at: now,
        };

        item.recalculate();

        item
    }
}
