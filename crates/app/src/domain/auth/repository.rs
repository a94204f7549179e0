//! Users Repository

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use storefront::users::{User, UserUuid};

use crate::storage::{
    DocumentStore, StorageError,
    documents::{get_document, list_documents, set_document},
};

const COLLECTION: &str = "users";

#[automock]
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Find a user by UUID.
    async fn get(&self, uuid: UserUuid) -> Result<Option<User>, StorageError>;

    /// Find a user by email, ignoring case.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    /// Create or replace a user.
    async fn save(&self, user: &User) -> Result<(), StorageError>;
}

/// Users stored in the remote document store.
#[derive(Clone)]
pub struct RemoteUsersRepository {
    store: Arc<dyn DocumentStore>,
}

impl std::fmt::Debug for RemoteUsersRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteUsersRepository").finish_non_exhaustive()
    }
}

impl RemoteUsersRepository {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UsersRepository for RemoteUsersRepository {
    async fn get(&self, uuid: UserUuid) -> Result<Option<User>, StorageError> {
        get_document(self.store.as_ref(), COLLECTION, &uuid.to_string()).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let users: Vec<User> = list_documents(self.store.as_ref(), COLLECTION).await?;

        Ok(users
            .into_iter()
            .find(|user| user.email.eq_ignore_ascii_case(email.trim())))
    }

    async fn save(&self, user: &User) -> Result<(), StorageError> {
        set_document(self.store.as_ref(), COLLECTION, &user.uuid.to_string(), user).await
    }
}
