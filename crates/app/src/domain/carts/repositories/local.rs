//! Local storage cart repository.

use std::sync::Arc;

use async_trait::async_trait;
use storefront::{
    carts::{Cart, CartUuid},
    users::UserUuid,
};

use crate::{
    domain::carts::repositories::CartsRepository,
    storage::{KeyValueStore, StorageError, read_json, write_json},
};

/// Local storage key holding the cart.
pub const CART_KEY: &str = "storefront.cart";

/// Keeps a single cart in local storage.
///
/// A stored cart belonging to a different user is not returned.
#[derive(Clone)]
pub struct LocalCartsRepository {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for LocalCartsRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalCartsRepository").finish_non_exhaustive()
    }
}

impl LocalCartsRepository {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CartsRepository for LocalCartsRepository {
    async fn load(&self, user: Option<UserUuid>) -> Result<Option<Cart>, StorageError> {
        let cart: Option<Cart> = read_json(self.store.as_ref(), CART_KEY)?;

        Ok(cart.filter(|cart| cart.user_uuid.is_none() || cart.user_uuid == user))
    }

    async fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        write_json(self.store.as_ref(), CART_KEY, cart)
    }

    async fn delete(&self, cart: CartUuid) -> Result<bool, StorageError> {
        let stored: Option<Cart> = read_json(self.store.as_ref(), CART_KEY)?;

        if stored.is_some_and(|stored| stored.uuid == cart) {
            return self.store.remove_item(CART_KEY);
        }

        Ok(false)
    }
}
