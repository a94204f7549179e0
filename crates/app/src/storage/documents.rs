//! Document store
//!
//! JSON documents grouped in collections and addressed by id, with change
//! notifications per document.

use std::{collections::BTreeMap, sync::Mutex, time::Duration};

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::sync::watch;
use tracing::trace;

use crate::storage::StorageError;

/// Remote document database.
#[automock]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StorageError>;

    /// Create or replace a document.
    async fn set(&self, collection: &str, id: &str, document: Value) -> Result<(), StorageError>;

    /// Delete a document. Returns `true` if it existed.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StorageError>;

    /// All documents in a collection, ordered by id.
    async fn list(&self, collection: &str) -> Result<Vec<Value>, StorageError>;

    /// Subscribe to a document. The receiver holds the current value and sees
    /// every later write or delete.
    fn watch(&self, collection: &str, id: &str) -> watch::Receiver<Option<Value>>;
}

/// Fetch and deserialise a document.
///
/// # Errors
///
/// Returns an error if the store fails or the document does not match `T`.
pub async fn get_document<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
) -> Result<Option<T>, StorageError> {
    store
        .get(collection, id)
        .await?
        .map(serde_json::from_value)
        .transpose()
        .map_err(StorageError::from)
}

/// Serialise and store a document.
///
/// # Errors
///
/// Returns an error if serialisation or the store fails.
pub async fn set_document<T: Serialize + ?Sized>(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
    document: &T,
) -> Result<(), StorageError> {
    let value = serde_json::to_value(document)?;

    store.set(collection, id, value).await
}

/// Fetch and deserialise every document in a collection.
///
/// # Errors
///
/// Returns an error if the store fails or any document does not match `T`.
pub async fn list_documents<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
) -> Result<Vec<T>, StorageError> {
    store
        .list(collection)
        .await?
        .into_iter()
        .map(|value| serde_json::from_value(value).map_err(StorageError::from))
        .collect()
}

type DocumentKey = (String, String);

#[derive(Debug, Default)]
struct Collections {
    documents: FxHashMap<String, BTreeMap<String, Value>>,
    watchers: FxHashMap<DocumentKey, watch::Sender<Option<Value>>>,
}

impl Collections {
    fn notify(&mut self, collection: &str, id: &str, value: Option<Value>) {
        let key = (collection.to_string(), id.to_string());

        if let Some(sender) = self.watchers.get(&key) {
            if sender.receiver_count() == 0 {
                self.watchers.remove(&key);
            } else {
                sender.send_replace(value);
            }
        }
    }
}

/// In-process document store with optional artificial latency.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    latency: Duration,
    collections: Mutex<Collections>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every async call by `latency`.
    #[must_use]
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StorageError> {
        self.simulate_latency().await;

        let collections = self
            .collections
            .lock()
            .map_err(|_err| StorageError::LockPoisoned)?;

        Ok(collections
            .documents
            .get(collection)
            .and_then(|documents| documents.get(id))
            .cloned())
    }

    async fn set(&self, collection: &str, id: &str, document: Value) -> Result<(), StorageError> {
        self.simulate_latency().await;

        trace!(collection, id, "set document");

        let mut collections = self
            .collections
            .lock()
            .map_err(|_err| StorageError::LockPoisoned)?;

        collections
            .documents
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document.clone());

        collections.notify(collection, id, Some(document));

        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StorageError> {
        self.simulate_latency().await;

        trace!(collection, id, "delete document");

        let mut collections = self
            .collections
            .lock()
            .map_err(|_err| StorageError::LockPoisoned)?;

        let removed = collections
            .documents
            .get_mut(collection)
            .and_then(|documents| documents.remove(id))
            .is_some();

        if removed {
            collections.notify(collection, id, None);
        }

        Ok(removed)
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StorageError> {
        self.simulate_latency().await;

        let collections = self
            .collections
            .lock()
            .map_err(|_err| StorageError::LockPoisoned)?;

        Ok(collections
            .documents
            .get(collection)
            .map(|documents| documents.values().cloned().collect())
            .unwrap_or_default())
    }

    fn watch(&self, collection: &str, id: &str) -> watch::Receiver<Option<Value>> {
        let Ok(mut collections) = self.collections.lock() else {
            // A poisoned store never changes again; hand out a closed channel.
            return watch::channel(None).1;
        };

        let current = collections
            .documents
            .get(collection)
            .and_then(|documents| documents.get(id))
            .cloned();

        collections
            .watchers
            .entry((collection.to_string(), id.to_string()))
            .or_insert_with(|| watch::channel(current).0)
            .subscribe()
    }
}
