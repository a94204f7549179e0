//! Checkout errors.

use storefront::{
    carts::CartError,
    checkout::{CheckoutStep, CheckoutStepError},
    orders::{OrderError, OrderUuid},
    users::AddressError,
};
use thiserror::Error;

use crate::{
    domain::{carts::CartsServiceError, checkout::payments::PaymentError},
    storage::StorageError,
};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Step(#[from] CheckoutStepError),

    #[error("complete the {0} step before placing the order")]
    NotReady(CheckoutStep),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("invalid payment method: {0}")]
    InvalidPaymentMethod(String),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Carts(#[from] CartsServiceError),

    #[error("order {0} not found")]
    OrderNotFound(OrderUuid),

    #[error("storage error")]
    Storage(#[from] StorageError),
}

impl CheckoutError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Step(error) => error.code(),
            Self::NotReady(_) => "checkout_step_incomplete",
            Self::Address(error) => error.code(),
            Self::InvalidPaymentMethod(_) => "payment_method_invalid",
            Self::Payment(error) => error.code(),
            Self::Order(error) => error.code(),
            Self::Cart(error) => error.code(),
            Self::Carts(error) => error.code(),
            Self::OrderNotFound(_) => "order_not_found",
            Self::Storage(error) => error.code(),
        }
    }
}
