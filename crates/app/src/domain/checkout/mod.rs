//! Checkout, payments and orders

pub mod errors;
pub mod orders;
pub mod payments;
pub mod service;

pub use errors::CheckoutError;
pub use orders::{MockOrdersRepository, OrdersRepository, RemoteOrdersRepository};
pub use payments::{
    DECLINED_TOKEN, MockPaymentGateway, PaymentError, PaymentGateway, SimulatedPaymentGateway,
};
pub use service::*;
