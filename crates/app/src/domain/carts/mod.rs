//! Carts

pub mod errors;
pub mod repositories;
pub mod service;

pub use errors::CartsServiceError;
pub use repositories::{
    CartsRepository, LocalCartsRepository, MockCartsRepository, RemoteCartsRepository,
};
pub use service::*;
