//! Profile service.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use storefront::users::{Address, AddressUuid, AuthUser, User, UserUuid};
use tracing::{info, instrument};

use crate::domain::{auth::UsersRepository, profile::errors::ProfileError};

/// Editable profile fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,

    /// An empty string clears the phone number.
    pub phone: Option<String>,
}

/// Profile and address book operations. Only the owner or an admin may act
/// on a profile.
#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UsersRepository>,
}

impl std::fmt::Debug for ProfileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileService").finish_non_exhaustive()
    }
}

impl ProfileService {
    #[must_use]
    pub fn new(users: Arc<dyn UsersRepository>) -> Self {
        Self { users }
    }

    /// # Errors
    ///
    /// Returns [`ProfileError::Forbidden`] if `actor` may not see the profile.
    #[instrument(skip(self, actor), fields(actor = %actor.uuid))]
    pub async fn get_profile(&self, actor: &AuthUser, user: UserUuid) -> Result<User, ProfileError> {
        self.load(actor, user).await
    }

    /// # Errors
    ///
    /// Returns an error if the actor is not allowed or the display name is
    /// blank.
    #[instrument(skip(self, actor), fields(actor = %actor.uuid))]
    pub async fn update_profile(
        &self,
        actor: &AuthUser,
        user: UserUuid,
        update: ProfileUpdate,
    ) -> Result<User, ProfileError> {
        let mut profile = self.load(actor, user).await?;

        if let Some(name) = update.display_name {
            let name = name.trim();

            if name.is_empty() {
                return Err(ProfileError::EmptyDisplayName);
            }

            profile.display_name = name.to_string();
        }

        if let Some(phone) = update.phone {
            let phone = phone.trim();
            profile.phone = (!phone.is_empty()).then(|| phone.to_string());
        }

        self.users.save(&profile).await?;

        Ok(profile)
    }

    /// Save a validated address. The first address becomes the default.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Address`] naming the first blank required
    /// field.
    #[instrument(skip(self, actor, address), fields(actor = %actor.uuid))]
    pub async fn add_address(
        &self,
        actor: &AuthUser,
        user: UserUuid,
        address: Address,
    ) -> Result<User, ProfileError> {
        address.validate()?;

        let mut profile = self.load(actor, user).await?;

        if profile.default_address.is_none() {
            profile.default_address = Some(address.uuid);
        }

        info!(address = %address.uuid, "added address");

        profile.addresses.push(address);
        self.users.save(&profile).await?;

        Ok(profile)
    }

    /// Remove an address. Removing the default promotes the first remaining
    /// one.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::AddressNotFound`] for an unknown address.
    #[instrument(skip(self, actor), fields(actor = %actor.uuid))]
    pub async fn remove_address(
        &self,
        actor: &AuthUser,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<User, ProfileError> {
        let mut profile = self.load(actor, user).await?;

        let index = profile
            .addresses
            .iter()
            .position(|a| a.uuid == address)
            .ok_or(ProfileError::AddressNotFound(address))?;

        profile.addresses.remove(index);

        if profile.default_address == Some(address) {
            profile.default_address = profile.addresses.first().map(|a| a.uuid);
        }

        self.users.save(&profile).await?;

        Ok(profile)
    }

    /// # Errors
    ///
    /// Returns [`ProfileError::AddressNotFound`] for an unknown address.
    #[instrument(skip(self, actor), fields(actor = %actor.uuid))]
    pub async fn set_default_address(
        &self,
        actor: &AuthUser,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<User, ProfileError> {
        let mut profile = self.load(actor, user).await?;

        if profile.address(address).is_none() {
            return Err(ProfileError::AddressNotFound(address));
        }

        profile.default_address = Some(address);
        self.users.save(&profile).await?;

        Ok(profile)
    }

    async fn load(&self, actor: &AuthUser, user: UserUuid) -> Result<User, ProfileError> {
        if !actor.can_access_user(user) {
            return Err(ProfileError::Forbidden);
        }

        self.users
            .get(user)
            .await?
            .ok_or(ProfileError::NotFound(user))
    }
}
