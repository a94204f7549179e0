//! Account facade: session and profile.

use std::{future::Future, sync::Arc};

use storefront::users::{Address, AddressUuid, AuthUser, User};
use tokio::sync::watch;

use crate::{
    domain::{
        auth::{AuthService, NewUser},
        profile::{ProfileError, ProfileService, ProfileUpdate},
    },
    facades::{
        cart::CartFacade,
        notifications::Notifier,
        state::{ViewState, ViewStore},
    },
};

pub struct AuthFacade {
    auth: Arc<AuthService>,
    profiles: ProfileService,
    cart: Arc<CartFacade>,
    account: ViewStore<AuthUser>,
    profile: ViewStore<User>,
}

impl std::fmt::Debug for AuthFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthFacade")
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl AuthFacade {
    #[must_use]
    pub fn new(
        auth: Arc<AuthService>,
        profiles: ProfileService,
        cart: Arc<CartFacade>,
        notifier: Notifier,
    ) -> Self {
        Self {
            auth,
            profiles,
            cart,
            account: ViewStore::new(notifier.clone()),
            profile: ViewStore::new(notifier),
        }
    }

    /// Sign-in form state.
    pub fn account(&self) -> watch::Receiver<ViewState<AuthUser>> {
        self.account.subscribe()
    }

    pub fn profile(&self) -> watch::Receiver<ViewState<User>> {
        self.profile.subscribe()
    }

    /// Signed-in user.
    pub fn session(&self) -> watch::Receiver<Option<AuthUser>> {
        self.auth.subscribe()
    }

    /// Sign in and take over the guest cart.
    pub async fn sign_in(&self, email: &str, password: &str) -> Option<AuthUser> {
        self.account.loading();

        let result = self.auth.sign_in(email, password).await;
        let user = self.account.settle(result, Some("Welcome back"))?;

        self.cart.claim_guest_cart(user.uuid).await;

        Some(user)
    }

    /// Register and take over the guest cart.
    pub async fn sign_up(&self, new_user: NewUser) -> Option<AuthUser> {
        self.account.loading();

        let result = self.auth.sign_up(new_user).await;
        let user = self.account.settle(result, Some("Account created"))?;

        self.cart.claim_guest_cart(user.uuid).await;

        Some(user)
    }

    /// Sign out and fall back to a guest cart.
    pub async fn sign_out(&self) {
        if let Err(error) = self.auth.sign_out().await {
            self.account.fail(&error);
        } else {
            self.account.reset();
        }

        self.profile.reset();
        self.cart.load().await;
    }

    pub async fn load_profile(&self) -> Option<User> {
        self.with_user(|profiles, user| async move {
            profiles.get_profile(&user, user.uuid).await
        })
        .await
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> Option<User> {
        self.with_user(|profiles, user| async move {
            profiles.update_profile(&user, user.uuid, update).await
        })
        .await
    }

    pub async fn add_address(&self, address: Address) -> Option<User> {
        self.with_user(|profiles, user| async move {
            profiles.add_address(&user, user.uuid, address).await
        })
        .await
    }

    pub async fn remove_address(&self, address: AddressUuid) -> Option<User> {
        self.with_user(|profiles, user| async move {
            profiles.remove_address(&user, user.uuid, address).await
        })
        .await
    }

    pub async fn set_default_address(&self, address: AddressUuid) -> Option<User> {
        self.with_user(|profiles, user| async move {
            profiles.set_default_address(&user, user.uuid, address).await
        })
        .await
    }

    async fn with_user<F, Fut>(&self, operation: F) -> Option<User>
    where
        F: FnOnce(ProfileService, AuthUser) -> Fut,
        Fut: Future<Output = Result<User, ProfileError>>,
    {
        let user = match self.auth.require_user() {
            Ok(user) => user,
            Err(error) => {
                self.profile.fail(&error);
                return None;
            }
        };

        self.profile.loading();

        let result = operation(self.profiles.clone(), user).await;

        self.profile.settle(result, None)
    }
}
