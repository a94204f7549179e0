//! Application services over the storefront domain.

pub mod auth;
pub mod carts;
pub mod catalog;
pub mod checkout;
pub mod coupons;
pub mod profile;
