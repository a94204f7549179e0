//! Cart Repositories

use async_trait::async_trait;
use mockall::automock;
use storefront::{
    carts::{Cart, CartUuid},
    users::UserUuid,
};

use crate::storage::StorageError;

mod local;
mod remote;

pub use local::{CART_KEY, LocalCartsRepository};
pub use remote::RemoteCartsRepository;

#[automock]
#[async_trait]
pub trait CartsRepository: Send + Sync {
    /// The current cart for a user, or the guest cart when `user` is `None`.
    async fn load(&self, user: Option<UserUuid>) -> Result<Option<Cart>, StorageError>;

    /// Create or replace a cart.
    async fn save(&self, cart: &Cart) -> Result<(), StorageError>;

    /// Delete a cart. Returns `true` if it existed.
    async fn delete(&self, cart: CartUuid) -> Result<bool, StorageError>;
}
