//! Storefront
//!
//! Domain model for an online store: catalog products, carts with coupons and
//! tax-inclusive totals, the checkout step machine, users and addresses, orders,
//! payments and reviews. Everything here is synchronous and free of I/O; the
//! `storefront-app` crate layers repositories and services on top.

pub mod carts;
pub mod checkout;
pub mod coupons;
pub mod fixtures;
pub mod money;
pub mod orders;
pub mod payments;
pub mod prelude;
pub mod products;
pub mod reviews;
pub mod users;
pub mod uuids;
