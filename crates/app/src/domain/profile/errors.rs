//! Profile errors.

use storefront::users::{AddressError, AddressUuid, UserUuid};
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("not allowed to change this profile")]
    Forbidden,

    #[error("user {0} not found")]
    NotFound(UserUuid),

    #[error("address {0} not found")]
    AddressNotFound(AddressUuid),

    #[error("display name cannot be empty")]
    EmptyDisplayName,

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("storage error")]
    Storage(#[from] StorageError),
}

impl ProfileError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Forbidden => "auth_forbidden",
            Self::NotFound(_) => "user_not_found",
            Self::AddressNotFound(_) => "address_not_found",
            Self::EmptyDisplayName => "profile_invalid",
            Self::Address(error) => error.code(),
            Self::Storage(error) => error.code(),
        }
    }
}
