//! Catalog service errors.

use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum CatalogServiceError {
    #[error("product {0} not found")]
    NotFound(String),

    #[error("storage error")]
    Storage(#[from] StorageError),
}

impl CatalogServiceError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "product_not_found",
            Self::Storage(error) => error.code(),
        }
    }
}
