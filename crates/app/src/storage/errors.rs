//! Storage errors.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed")]
    Io(#[from] io::Error),

    #[error("stored data could not be (de)serialised")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    #[error("storage lock poisoned")]
    LockPoisoned,
}

impl StorageError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) | Self::LockPoisoned => "storage_unavailable",
            Self::Serialization(_) => "storage_corrupt",
            Self::InvalidKey(_) => "storage_invalid_key",
        }
    }
}
