//! Document store cart repository.

use std::sync::Arc;

use async_trait::async_trait;
use storefront::{
    carts::{Cart, CartUuid},
    users::UserUuid,
};

use crate::{
    domain::carts::repositories::CartsRepository,
    storage::{
        DocumentStore, StorageError,
        documents::{list_documents, set_document},
    },
};

const COLLECTION: &str = "carts";

/// Carts stored in the remote document store, keyed by cart UUID.
///
/// `load` returns the most recently updated active cart of the user.
#[derive(Clone)]
pub struct RemoteCartsRepository {
    store: Arc<dyn DocumentStore>,
}

impl std::fmt::Debug for RemoteCartsRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCartsRepository").finish_non_exhaustive()
    }
}

impl RemoteCartsRepository {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CartsRepository for RemoteCartsRepository {
    async fn load(&self, user: Option<UserUuid>) -> Result<Option<Cart>, StorageError> {
        let carts: Vec<Cart> = list_documents(self.store.as_ref(), COLLECTION).await?;

        Ok(carts
            .into_iter()
            .filter(|cart| cart.user_uuid == user && cart.is_active())
            .max_by_key(|cart| cart.updated_at))
    }

    async fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        set_document(self.store.as_ref(), COLLECTION, &cart.uuid.to_string(), cart).await
    }

    async fn delete(&self, cart: CartUuid) -> Result<bool, StorageError> {
        self.store.delete(COLLECTION, &cart.to_string()).await
    }
}
