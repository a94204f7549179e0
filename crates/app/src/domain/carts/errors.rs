//! Carts service errors.

use storefront::{
    carts::CartError,
    products::{ProductUuid, VariantUuid},
};
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("product {0} not found")]
    ProductNotFound(ProductUuid),

    #[error("variant {0} not found")]
    VariantNotFound(VariantUuid),

    #[error("choose an option before adding {0} to the cart")]
    VariantRequired(String),

    #[error("storage error")]
    Storage(#[from] StorageError),
}

impl CartsServiceError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Cart(error) => error.code(),
            Self::ProductNotFound(_) | Self::VariantNotFound(_) => "product_not_found",
            Self::VariantRequired(_) => "variant_required",
            Self::Storage(error) => error.code(),
        }
    }
}
