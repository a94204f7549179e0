//! Storage
//!
//! Two persistence ports: a synchronous key/value store standing in for
//! browser local storage, and an asynchronous document store standing in for
//! the remote backend.

pub mod documents;
pub mod errors;
pub mod local;

pub use documents::{DocumentStore, MemoryDocumentStore, MockDocumentStore};
pub use errors::StorageError;
pub use local::{FileStorage, KeyValueStore, MemoryStorage, MockKeyValueStore, read_json, write_json};
