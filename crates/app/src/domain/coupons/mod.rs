//! Coupons

pub mod repository;

pub use repository::{CouponsRepository, MockCouponsRepository, RemoteCouponsRepository};
