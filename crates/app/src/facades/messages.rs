//! Readable error messages

use storefront::carts::CartError;

use crate::{
    domain::{
        auth::AuthError,
        carts::CartsServiceError,
        catalog::CatalogServiceError,
        checkout::{CheckoutError, PaymentError},
        profile::ProfileError,
    },
    storage::StorageError,
};

const STORAGE_MESSAGE: &str = "We couldn't save or load your data. Please try again.";

/// Errors that can be shown to the shopper.
pub trait UserFacingError: std::error::Error {
    /// Stable error code.
    fn error_code(&self) -> &'static str;

    /// Message suitable for display.
    fn user_message(&self) -> String {
        self.to_string()
    }
}

impl UserFacingError for StorageError {
    fn error_code(&self) -> &'static str {
        self.code()
    }

    fn user_message(&self) -> String {
        STORAGE_MESSAGE.to_string()
    }
}

impl UserFacingError for CartError {
    fn error_code(&self) -> &'static str {
        self.code()
    }
}

impl UserFacingError for CartsServiceError {
    fn error_code(&self) -> &'static str {
        self.code()
    }

    fn user_message(&self) -> String {
        match self {
            Self::ProductNotFound(_) | Self::VariantNotFound(_) => {
                "That product is no longer available.".to_string()
            }
            Self::Storage(error) => error.user_message(),
            _ => self.to_string(),
        }
    }
}

impl UserFacingError for CatalogServiceError {
    fn error_code(&self) -> &'static str {
        self.code()
    }

    fn user_message(&self) -> String {
        match self {
            Self::NotFound(_) => "That product could not be found.".to_string(),
            Self::Storage(error) => error.user_message(),
        }
    }
}

impl UserFacingError for CheckoutError {
    fn error_code(&self) -> &'static str {
        self.code()
    }

    fn user_message(&self) -> String {
        match self {
            Self::Payment(PaymentError::Declined(_)) => {
                "Your payment was declined. Please try another card.".to_string()
            }
            Self::Carts(error) => error.user_message(),
            Self::Storage(error) => error.user_message(),
            _ => self.to_string(),
        }
    }
}

impl UserFacingError for AuthError {
    fn error_code(&self) -> &'static str {
        self.code()
    }

    fn user_message(&self) -> String {
        match self {
            Self::Storage(error) => error.user_message(),
            _ => self.to_string(),
        }
    }
}

impl UserFacingError for ProfileError {
    fn error_code(&self) -> &'static str {
        self.code()
    }

    fn user_message(&self) -> String {
        match self {
            Self::Storage(error) => error.user_message(),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use storefront::{coupons::CouponError, products::ProductUuid};

    use super::*;

    #[test]
    fn storage_details_are_not_shown() {
        let error = CartsServiceError::Storage(StorageError::LockPoisoned);

        assert_eq!(error.user_message(), STORAGE_MESSAGE);
        assert_eq!(error.error_code(), "storage_unavailable");
    }

    #[test]
    fn domain_errors_keep_their_message() {
        let error = CheckoutError::Carts(CartsServiceError::Cart(CartError::Coupon(
            CouponError::NotFound("BOGUS".to_string()),
        )));

        assert_eq!(error.user_message(), error.to_string());
        assert_eq!(error.error_code(), "coupon_invalid");
    }

    #[test]
    fn missing_products_read_naturally() {
        let error = CartsServiceError::ProductNotFound(ProductUuid::new());

        assert_eq!(error.user_message(), "That product is no longer available.");
    }
}
