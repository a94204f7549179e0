//! Orders Repository

use std::{cmp::Reverse, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use storefront::{
    orders::{Order, OrderUuid},
    users::UserUuid,
};

use crate::storage::{
    DocumentStore, StorageError,
    documents::{get_document, list_documents, set_document},
};

const COLLECTION: &str = "orders";

#[automock]
#[async_trait]
pub trait OrdersRepository: Send + Sync {
    /// Create or replace an order.
    async fn save(&self, order: &Order) -> Result<(), StorageError>;

    /// Find an order by UUID.
    async fn get(&self, uuid: OrderUuid) -> Result<Option<Order>, StorageError>;

    /// A user's orders, newest first.
    async fn list_for_user(&self, user: UserUuid) -> Result<Vec<Order>, StorageError>;
}

/// Orders stored in the remote document store.
#[derive(Clone)]
pub struct RemoteOrdersRepository {
    store: Arc<dyn DocumentStore>,
}

impl std::fmt::Debug for RemoteOrdersRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteOrdersRepository").finish_non_exhaustive()
    }
}

impl RemoteOrdersRepository {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OrdersRepository for RemoteOrdersRepository {
    async fn save(&self, order: &Order) -> Result<(), StorageError> {
        set_document(self.store.as_ref(), COLLECTION, &order.uuid.to_string(), order).await
    }

    async fn get(&self, uuid: OrderUuid) -> Result<Option<Order>, StorageError> {
        get_document(self.store.as_ref(), COLLECTION, &uuid.to_string()).await
    }

    async fn list_for_user(&self, user: UserUuid) -> Result<Vec<Order>, StorageError> {
        let mut orders: Vec<Order> = list_documents(self.store.as_ref(), COLLECTION)
            .await?
            .into_iter()
            .filter(|order: &Order| order.user_uuid == Some(user))
            .collect();

        orders.sort_by_key(|order| Reverse(order.placed_at));

        Ok(orders)
    }
}
