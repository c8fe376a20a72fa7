// Storage abstraction - allows both file-based (native) and localStorage (WASM)

use crate::error::CoreError;
use serde::{Serialize, de::DeserializeOwned};
use std::rc::Rc;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, CoreError>;

/// Abstract key-value storage backend.
/// Native implementations can use files, WASM can use localStorage.
///
/// Writes are synchronous: both backends complete a write before returning,
/// so every mutation is durable as soon as the call succeeds.
pub trait StorageBackend {
    /// Read the raw string stored under `key`
    fn get_raw(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store a raw string under `key`, replacing any previous value
    fn set_raw(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove data by key
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Save data with a key, serialized as JSON
    fn save<T: Serialize + ?Sized>(&self, key: &str, data: &T) -> StorageResult<()> {
        let json = serde_json::to_string(data)?;
        self.set_raw(key, &json)
    }

    /// Load JSON data by key
    fn load<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        match self.get_raw(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

impl<T: StorageBackend> StorageBackend for Rc<T> {
    fn get_raw(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get_raw(key)
    }

    fn set_raw(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set_raw(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

/// Standard storage keys used across the application
pub mod keys {
    pub const WALLETS: &str = "wallets";
    pub const THEME: &str = "theme";
}
