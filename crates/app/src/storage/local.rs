//! Local key/value storage.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

use mockall::automock;
use rustc_hash::FxHashMap;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::storage::StorageError;

const FILE_EXTENSION: &str = "json";

/// String key/value store with local-storage semantics.
#[automock]
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Returns `true` if it existed.
    fn remove_item(&self, key: &str) -> Result<bool, StorageError>;

    /// All stored keys, sorted.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Read and deserialise a JSON value.
///
/// # Errors
///
/// Returns an error if the store fails or the stored value is not valid JSON for `T`.
pub fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    store
        .get_item(key)?
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(StorageError::from)
}

/// Serialise and write a JSON value.
///
/// # Errors
///
/// Returns an error if serialisation or the store fails.
pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;

    store.set_item(key, &raw)
}

/// Volatile store.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<FxHashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.lock().map_err(|_err| StorageError::LockPoisoned)?;

        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_err| StorageError::LockPoisoned)?;

        items.insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<bool, StorageError> {
        let mut items = self.items.lock().map_err(|_err| StorageError::LockPoisoned)?;

        Ok(items.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let items = self.items.lock().map_err(|_err| StorageError::LockPoisoned)?;

        let mut keys: Vec<String> = items.keys().cloned().collect();
        keys.sort();

        Ok(keys)
    }
}

/// Persistent store keeping one `<key>.json` file per key in a directory.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();

        fs::create_dir_all(&dir)?;

        debug!(dir = %dir.display(), "opened file storage");

        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    /// Storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));

        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.dir.join(format!("{key}.{FILE_EXTENSION}")))
    }
}

impl KeyValueStore for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        let _guard = self.lock.lock().map_err(|_err| StorageError::LockPoisoned)?;

        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let _guard = self.lock.lock().map_err(|_err| StorageError::LockPoisoned)?;

        // Write-then-rename so readers never see a partial file.
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;

        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.path_for(key)?;
        let _guard = self.lock.lock().map_err(|_err| StorageError::LockPoisoned)?;

        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
            Err(error) => Err(error.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let _guard = self.lock.lock().map_err(|_err| StorageError::LockPoisoned)?;

        let mut keys = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();

            if path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }

            match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(stem) => keys.push(stem.to_string()),
                None => warn!(path = %path.display(), "skipping non UTF-8 storage file"),
            }
        }

        keys.sort();

        Ok(keys)
    }
}
