//! Users

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::uuids::TypedUuid;

/// User UUID
pub type UserUuid = TypedUuid<User>;

/// Address UUID
pub type AddressUuid = TypedUuid<Address>;

/// Access level, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular customer
    User,

    /// Store administrator
    Admin,

    /// Unrestricted administrator
    Superadmin,
}

/// Address validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// A required field was blank.
    #[error("address field `{0}` is required")]
    MissingField(&'static str),
}

impl AddressError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "address_invalid",
        }
    }
}

/// Postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Address UUID
    pub uuid: AddressUuid,

    /// Label such as "Home"
    pub label: String,

    /// Recipient full name
    pub recipient: String,

    /// Street and number
    pub line1: String,

    /// Apartment, suite
    #[serde(default)]
    pub line2: Option<String>,

    /// City
    pub city: String,

    /// State or province
    pub state: String,

    /// Postal code
    pub postal_code: String,

    /// ISO country code
    pub country: String,

    /// Contact phone
    #[serde(default)]
    pub phone: Option<String>,
}

impl Address {
    /// Check that all required fields are present.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::MissingField`] naming the first blank field.
    pub fn validate(&self) -> Result<(), AddressError> {
        let required = [
            ("recipient", &self.recipient),
            ("line1", &self.line1),
            ("city", &self.city),
            ("state", &self.state),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AddressError::MissingField(field));
            }
        }

        Ok(())
    }

    /// Single-line rendering for summaries.
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.line1.as_str()];

        if let Some(line2) = self.line2.as_deref().filter(|l| !l.is_empty()) {
            parts.push(line2);
        }

        parts.extend([
            self.city.as_str(),
            self.state.as_str(),
            self.postal_code.as_str(),
            self.country.as_str(),
        ]);

        parts.join(", ")
    }
}

/// Stored customer profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User UUID
    pub uuid: UserUuid,

    /// Login email
    pub email: String,

    /// Name shown in the storefront
    pub display_name: String,

    /// Contact phone
    #[serde(default)]
    pub phone: Option<String>,

    /// Access level
    pub role: UserRole,

    /// Email ownership confirmed
    pub email_verified: bool,

    /// Saved addresses
    #[serde(default)]
    pub addresses: Vec<Address>,

    /// Default shipping address
    #[serde(default)]
    pub default_address: Option<AddressUuid>,

    /// Registration time
    pub created_at: Timestamp,
}

impl User {
    /// The signed-in identity for this user.
    pub fn auth_user(&self) -> AuthUser {
        AuthUser {
            uuid: self.uuid,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
            email_verified: self.email_verified,
        }
    }

    /// Find a saved address.
    pub fn address(&self, uuid: AddressUuid) -> Option<&Address> {
        self.addresses.iter().find(|address| address.uuid == uuid)
    }

    /// The default address, falling back to the first saved one.
    pub fn preferred_address(&self) -> Option<&Address> {
        self.default_address
            .and_then(|uuid| self.address(uuid))
            .or_else(|| self.addresses.first())
    }
}

/// Authenticated session identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// User UUID
    pub uuid: UserUuid,

    /// Login email
    pub email: String,

    /// Display name
    pub display_name: String,

    /// Access level
    pub role: UserRole,

    /// Email ownership confirmed
    pub email_verified: bool,
}

impl AuthUser {
    /// Whether the user has at least the given role.
    pub fn has_role(&self, role: UserRole) -> bool {
        self.role >= role
    }

    /// Admin or superadmin.
    pub fn is_admin(&self) -> bool {
        self.has_role(UserRole::Admin)
    }

    /// Users may access their own data; admins may access anyone's.
    pub fn can_access_user(&self, user: UserUuid) -> bool {
        self.uuid == user || self.is_admin()
    }
}
