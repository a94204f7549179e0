//! Orders

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    carts::{Cart, CartTotals, CartUuid},
    payments::Payment,
    products::{ProductSnapshot, ProductUuid, VariantSnapshot, VariantUuid},
    users::{Address, UserUuid},
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// Errors creating an order.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// The cart has no lines.
    #[error("cannot place an order for an empty cart")]
    EmptyCart,

    /// The payment did not go through.
    #[error("payment {0} was not successful")]
    PaymentNotSuccessful(String),
}

impl OrderError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyCart => "cart_empty",
            Self::PaymentNotSuccessful(_) => "payment_declined",
        }
    }
}

/// Order lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created, payment pending
    Pending,

    /// Payment received
    Paid,

    /// Handed to the carrier
    Shipped,

    /// Received by the customer
    Delivered,

    /// Cancelled
    Cancelled,
}

/// Line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product bought
    pub product_uuid: ProductUuid,

    /// Variant bought
    pub variant_uuid: Option<VariantUuid>,

    /// Product display data
    pub product: ProductSnapshot,

    /// Variant display data
    pub variant: Option<VariantSnapshot>,

    /// Units
    pub quantity: u32,

    /// Price per unit
    pub unit_price: Decimal,

    /// Amount charged for the line
    pub total: Decimal,
}

/// Placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order UUID
    pub uuid: OrderUuid,

    /// Human-friendly order number
    pub number: String,

    /// Source cart
    pub cart_uuid: CartUuid,

    /// Buyer
    pub user_uuid: Option<UserUuid>,

    /// Lines
    pub items: Vec<OrderItem>,

    /// Amounts at placement time
    pub totals: CartTotals,

    /// Applied coupon code
    pub coupon_code: Option<String>,

    /// Destination
    pub shipping_address: Address,

    /// Payment taken
    pub payment: Payment,

    /// Lifecycle state
    pub status: OrderStatus,

    /// Placement time
    pub placed_at: Timestamp,
}

impl Order {
    /// Build an order from a cart and a successful payment.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError`] when the cart is empty or the payment failed.
    pub fn from_cart(
        cart: &Cart,
        shipping_address: Address,
        payment: Payment,
        now: Timestamp,
    ) -> Result<Self, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        if !payment.is_successful() {
            return Err(OrderError::PaymentNotSuccessful(payment.reference));
        }

        let uuid = OrderUuid::new();

        let items = cart
            .items
            .iter()
            .map(|item| OrderItem {
                product_uuid: item.product_uuid,
                variant_uuid: item.variant_uuid,
                product: item.product.clone(),
                variant: item.variant.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                total: item.total,
            })
            .collect();

        Ok(Self {
            uuid,
            number: order_number(uuid, now),
            cart_uuid: cart.uuid,
            user_uuid: cart.user_uuid,
            items,
            totals: cart.totals,
            coupon_code: cart.coupon.as_ref().map(|coupon| coupon.code.clone()),
            shipping_address,
            payment,
            status: OrderStatus::Paid,
            placed_at: now,
        })
    }

    /// Whether the order may still be cancelled.
    pub fn can_cancel(&self) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Paid)
    }

    /// Units across all lines.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// `ORD-YYYYMMDD-XXXXXXXX`, the suffix taken from the order UUID.
fn order_number(uuid: OrderUuid, now: Timestamp) -> String {
    let date = now.strftime("%Y%m%d");
    let suffix: String = uuid
        .into_uuid()
        .simple()
        .to_string()
        .to_ascii_uppercase()
        .chars()
        .skip(24)
        .collect();

    format!("ORD-{date}-{suffix}")
}
