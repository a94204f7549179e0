//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    carts::{
        CART_EXPIRY_DAYS, Cart, CartError, CartItem, CartItemUuid, CartReceipt, CartStatus,
        CartTotals, CartUuid, NewCartItem, PricingPolicy, PricingPolicyError, ReceiptError,
        calculate_totals,
    },
    checkout::{CheckoutProgress, CheckoutStep, CheckoutStepError},
    coupons::{
        AppliedCoupon, Coupon, CouponContext, CouponError, CouponRestrictions, DiscountType,
        normalize_code,
    },
    fixtures::{Fixture, FixtureError},
    money::{MoneyFormatError, format_price, round_money},
    orders::{Order, OrderError, OrderItem, OrderStatus, OrderUuid},
    payments::{Payment, PaymentMethod, PaymentStatus, PaymentUuid},
    products::{
        Product, ProductSnapshot, ProductStatus, ProductUuid, ProductVariant, VariantAttribute,
        VariantSnapshot, VariantUuid,
    },
    reviews::{NewReview, RatingSummary, Review, ReviewError, ReviewUuid},
    users::{Address, AddressError, AddressUuid, AuthUser, User, UserRole, UserUuid},
    uuids::TypedUuid,
};
