//! Auth provider port and the document-store backed adapter.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use storefront::users::{AuthUser, User, UserRole, UserUuid};
use tracing::{debug, info, warn};

use crate::{
    domain::auth::{
        errors::AuthError,
        models::{NewUser, is_valid_email, normalize_email},
        repository::UsersRepository,
    },
    storage::{
        DocumentStore, StorageError,
        documents::{get_document, set_document},
    },
};

/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 8;

const CREDENTIALS: &str = "credentials";

#[automock]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Check credentials and start a session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    /// Register an account and start a session.
    async fn sign_up(&self, new_user: NewUser) -> Result<AuthUser, AuthError>;

    /// End the session.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// The signed-in user, if any.
    async fn current_user(&self) -> Result<Option<AuthUser>, AuthError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Credentials {
    user_uuid: UserUuid,
    password_hash: String,
}

fn hash_password(user: UserUuid, password: &str) -> String {
    format!("{:x}", Sha256::digest(format!("{user}:{password}").as_bytes()))
}

/// Accounts kept in the mocked backend: profiles in the users repository,
/// salted SHA-256 password hashes in a `credentials` collection keyed by
/// email.
pub struct LocalAuthProvider {
    users: Arc<dyn UsersRepository>,
    store: Arc<dyn DocumentStore>,
    session: Mutex<Option<AuthUser>>,
}

impl std::fmt::Debug for LocalAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalAuthProvider").finish_non_exhaustive()
    }
}

impl LocalAuthProvider {
    #[must_use]
    pub fn new(users: Arc<dyn UsersRepository>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            users,
            store,
            session: Mutex::new(None),
        }
    }

    /// Store an existing user with a password, e.g. to seed administrators.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is taken, the password is too short or
    /// storage fails.
    pub async fn register(&self, user: &User, password: &str) -> Result<(), AuthError> {
        let email = normalize_email(&user.email);

        if !is_valid_email(&email) {
            return Err(AuthError::InvalidEmail(user.email.clone()));
        }

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword {
                min: MIN_PASSWORD_LEN,
            });
        }

        if self.credentials(&email).await?.is_some() {
            return Err(AuthError::EmailTaken(email));
        }

        set_document(
            self.store.as_ref(),
            CREDENTIALS,
            &email,
            &Credentials {
                user_uuid: user.uuid,
                password_hash: hash_password(user.uuid, password),
            },
        )
        .await?;

        // Credentials without a profile would hold the email forever.
        if let Err(error) = self.users.save(user).await {
            if let Err(cleanup) = self.store.delete(CREDENTIALS, &email).await {
                warn!(%email, error = %cleanup, "could not remove credentials of a failed registration");
            }

            return Err(error.into());
        }

        debug!(user = %user.uuid, "registered user");

        Ok(())
    }

    async fn credentials(&self, email: &str) -> Result<Option<Credentials>, StorageError> {
        get_document(self.store.as_ref(), CREDENTIALS, email).await
    }

    fn set_session(&self, user: Option<AuthUser>) {
        match self.session.lock() {
            Ok(mut session) => *session = user,
            Err(poisoned) => *poisoned.into_inner() = user,
        }
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let email = normalize_email(email);

        let Some(credentials) = self.credentials(&email).await? else {
            warn!("sign in for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if hash_password(credentials.user_uuid, password) != credentials.password_hash {
            warn!(user = %credentials.user_uuid, "sign in with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .users
            .get(credentials.user_uuid)
            .await?
            .ok_or(AuthError::InvalidCredentials)?
            .auth_user();

        self.set_session(Some(user.clone()));

        info!(user = %user.uuid, "signed in");

        Ok(user)
    }

    async fn sign_up(&self, new_user: NewUser) -> Result<AuthUser, AuthError> {
        let email = normalize_email(&new_user.email);

        let display_name = new_user
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

        let user = User {
            uuid: UserUuid::new(),
            email,
            display_name,
            phone: None,
            role: UserRole::User,
            email_verified: false,
            addresses: Vec::new(),
            default_address: None,
            created_at: Timestamp::now(),
        };

        self.register(&user, &new_user.password).await?;

        let user = user.auth_user();

        self.set_session(Some(user.clone()));

        info!(user = %user.uuid, "signed up");

        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.set_session(None);

        debug!("signed out");

        Ok(())
    }

    async fn current_user(&self) -> Result<Option<AuthUser>, AuthError> {
        let session = match self.session.lock() {
            Ok(session) => session.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::auth::repository::{MockUsersRepository, RemoteUsersRepository},
        storage::MemoryDocumentStore,
        test::helpers::customer,
    };

    use super::*;

    fn provider() -> LocalAuthProvider {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());

        LocalAuthProvider::new(Arc::new(RemoteUsersRepository::new(store.clone())), store)
    }

    fn registration(email: &str, password: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password: password.to_string(),
            display_name: None,
        }
    }

    #[tokio::test]
    async fn sign_up_starts_a_session() -> TestResult {
        let provider = provider();

        let user = provider
            .sign_up(registration(" Ana@Example.mx", "correct horse"))
            .await?;

        assert_eq!(user.email, "ana@example.mx");
        assert_eq!(user.display_name, "ana");
        assert_eq!(user.role, UserRole::User);
        assert_eq!(provider.current_user().await?, Some(user));

        provider.sign_out().await?;
        assert_eq!(provider.current_user().await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn sign_up_rejects_bad_input() -> TestResult {
        let provider = provider();

        let weak = provider.sign_up(registration("ana@example.mx", "short")).await;
        assert!(
            matches!(weak, Err(AuthError::WeakPassword { min: MIN_PASSWORD_LEN })),
            "expected WeakPassword, got {weak:?}"
        );

        let invalid = provider.sign_up(registration("ana", "long enough")).await;
        assert!(
            matches!(invalid, Err(AuthError::InvalidEmail(_))),
            "expected InvalidEmail, got {invalid:?}"
        );

        provider.sign_up(registration("ana@example.mx", "long enough")).await?;

        let taken = provider.sign_up(registration("ANA@example.mx", "other password")).await;
        assert!(
            matches!(taken, Err(AuthError::EmailTaken(_))),
            "expected EmailTaken, got {taken:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn failed_profile_write_leaves_no_credentials() -> TestResult {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());

        let mut users = MockUsersRepository::new();
        users
            .expect_save()
            .times(1)
            .returning(|_| Err(StorageError::LockPoisoned));

        let provider = LocalAuthProvider::new(Arc::new(users), store.clone());
        let user = customer("ana@example.mx");

        let result = provider.register(&user, "correct horse").await;

        assert!(
            matches!(result, Err(AuthError::Storage(StorageError::LockPoisoned))),
            "expected a storage error, got {result:?}"
        );

        let credentials: Option<Credentials> =
            get_document(store.as_ref(), CREDENTIALS, "ana@example.mx").await?;
        assert!(credentials.is_none());

        let retry = LocalAuthProvider::new(Arc::new(RemoteUsersRepository::new(store.clone())), store);
        retry.register(&user, "correct horse").await?;

        Ok(())
    }

    #[tokio::test]
    async fn sign_in_checks_the_password() -> TestResult {
        let provider = provider();
        let user = customer("ana@example.mx");

        provider.register(&user, "correct horse").await?;

        let wrong = provider.sign_in("ana@example.mx", "wrong horse").await;
        assert!(
            matches!(wrong, Err(AuthError::InvalidCredentials)),
            "expected InvalidCredentials, got {wrong:?}"
        );

        let unknown = provider.sign_in("bob@example.mx", "correct horse").await;
        assert!(
            matches!(unknown, Err(AuthError::InvalidCredentials)),
            "expected InvalidCredentials, got {unknown:?}"
        );

        assert_eq!(provider.current_user().await?, None);

        let signed_in = provider.sign_in("ANA@example.mx", "correct horse").await?;

        assert_eq!(signed_in.uuid, user.uuid);
        assert_eq!(provider.current_user().await?.map(|u| u.uuid), Some(user.uuid));

        Ok(())
    }

    #[test]
    fn password_hashes_are_salted_with_the_user() {
        let first = UserUuid::new();
        let second = UserUuid::new();

        assert_eq!(hash_password(first, "secret"), hash_password(first, "secret"));
        assert_ne!(hash_password(first, "secret"), hash_password(second, "secret"));
        assert_eq!(hash_password(first, "secret").len(), 64);
    }
}
