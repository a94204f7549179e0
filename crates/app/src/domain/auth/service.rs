//! Auth service.

use std::sync::Arc;

use storefront::users::{AuthUser, UserRole};
use tokio::sync::watch;
use tracing::instrument;

use crate::domain::auth::{errors::AuthError, models::NewUser, provider::AuthProvider};

/// Session holder over an [`AuthProvider`].
///
/// The signed-in user is published on a watch channel so facades can react to
/// sign-in and sign-out.
pub struct AuthService {
    provider: Arc<dyn AuthProvider>,
    session: watch::Sender<Option<AuthUser>>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("session", &*self.session.borrow())
            .finish_non_exhaustive()
    }
}

impl AuthService {
    #[must_use]
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self {
            provider,
            session: watch::Sender::new(None),
        }
    }

    /// Pick up a session the provider already holds.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails.
    pub async fn restore(&self) -> Result<Option<AuthUser>, AuthError> {
        let user = self.provider.current_user().await?;

        self.session.send_replace(user.clone());

        Ok(user)
    }

    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown email or wrong
    /// password.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let user = self.provider.sign_in(email, password).await?;

        self.session.send_replace(Some(user.clone()));

        Ok(user)
    }

    /// # Errors
    ///
    /// Returns an error if the email is invalid or taken, or the password is
    /// too short.
    #[instrument(skip_all)]
    pub async fn sign_up(&self, new_user: NewUser) -> Result<AuthUser, AuthError> {
        let user = self.provider.sign_up(new_user).await?;

        self.session.send_replace(Some(user.clone()));

        Ok(user)
    }

    /// # Errors
    ///
    /// Returns an error if the provider fails; the local session is cleared
    /// regardless.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.session.send_replace(None);

        self.provider.sign_out().await
    }

    /// The signed-in user.
    pub fn current(&self) -> Option<AuthUser> {
        self.session.borrow().clone()
    }

    /// Receive session changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.session.subscribe()
    }

    /// # Errors
    ///
    /// Returns [`AuthError::NotSignedIn`] without a session.
    pub fn require_user(&self) -> Result<AuthUser, AuthError> {
        self.current().ok_or(AuthError::NotSignedIn)
    }

    /// The signed-in user, if they hold at least `role`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotSignedIn`] without a session and
    /// [`AuthError::Forbidden`] when the role is insufficient.
    pub fn require_role(&self, role: UserRole) -> Result<AuthUser, AuthError> {
        let user = self.require_user()?;

        if user.has_role(role) {
            Ok(user)
        } else {
            Err(AuthError::Forbidden { required: role })
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{domain::auth::provider::MockAuthProvider, test::helpers::customer};

    use super::*;

    #[tokio::test]
    async fn session_follows_sign_in_and_sign_out() -> TestResult {
        let user = customer("ana@example.mx").auth_user();
        let signed_in = user.clone();

        let mut provider = MockAuthProvider::new();
        provider
            .expect_sign_in()
            .times(1)
            .returning(move |_, _| Ok(signed_in.clone()));
        provider.expect_sign_out().times(1).returning(|| Ok(()));

        let service = AuthService::new(Arc::new(provider));
        let mut session = service.subscribe();

        assert!(matches!(service.require_user(), Err(AuthError::NotSignedIn)));

        service.sign_in("ana@example.mx", "correct horse").await?;

        session.changed().await?;
        assert_eq!(session.borrow_and_update().as_ref(), Some(&user));
        assert_eq!(service.require_user()?, user);

        service.sign_out().await?;

        session.changed().await?;
        assert_eq!(*session.borrow_and_update(), None);

        Ok(())
    }

    #[tokio::test]
    async fn failed_sign_in_leaves_no_session() {
        let mut provider = MockAuthProvider::new();
        provider
            .expect_sign_in()
            .returning(|_, _| Err(AuthError::InvalidCredentials));

        let service = AuthService::new(Arc::new(provider));
        let result = service.sign_in("ana@example.mx", "nope").await;

        assert!(
            matches!(result, Err(AuthError::InvalidCredentials)),
            "expected InvalidCredentials, got {result:?}"
        );
        assert_eq!(service.current(), None);
    }

    #[tokio::test]
    async fn roles_are_checked_against_the_session() -> TestResult {
        let mut admin = customer("root@example.mx");
        admin.role = UserRole::Admin;
        let admin = admin.auth_user();
        let restored = admin.clone();

        let mut provider = MockAuthProvider::new();
        provider
            .expect_current_user()
            .returning(move || Ok(Some(restored.clone())));

        let service = AuthService::new(Arc::new(provider));

        service.restore().await?;

        assert_eq!(service.require_role(UserRole::Admin)?, admin);

        let result = service.require_role(UserRole::Superadmin);
        assert!(
            matches!(
                result,
                Err(AuthError::Forbidden {
                    required: UserRole::Superadmin
                })
            ),
            "expected Forbidden, got {result:?}"
        );

        Ok(())
    }
}
