//! Auth errors.

use storefront::users::UserRole;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email or password is incorrect")]
    InvalidCredentials,

    #[error("an account already exists for {0}")]
    EmailTaken(String),

    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("{0} is not a valid email address")]
    InvalidEmail(String),

    #[error("sign in required")]
    NotSignedIn,

    #[error("requires {required:?} access")]
    Forbidden { required: UserRole },

    #[error("user {0} not found")]
    UserNotFound(String),

    #[error("storage error")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "auth_invalid_credentials",
            Self::EmailTaken(_) => "auth_email_taken",
            Self::WeakPassword { .. } => "auth_weak_password",
            Self::InvalidEmail(_) => "auth_invalid_email",
            Self::NotSignedIn => "auth_required",
            Self::Forbidden { .. } => "auth_forbidden",
            Self::UserNotFound(_) => "user_not_found",
            Self::Storage(error) => error.code(),
        }
    }
}
