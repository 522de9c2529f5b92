//! Key/value persistence slot for the cart.

use std::collections::HashMap;

use thiserror::Error;

/// Failure reading or writing a storage slot.
#[derive(Debug, Error)]
pub enum CartStorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable client-side string storage, one value per key.
///
/// Mirrors what a browser offers as local storage: values are opaque strings
/// and survive restarts on the same device only.
pub trait CartStorage {
    /// Read the value stored under `key`, `None` if nothing was saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot exists but cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, CartStorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written.
    fn save(&mut self, key: &str, value: &str) -> Result<(), CartStorageError>;
}

/// Storage kept in a `HashMap`; lost when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryCartStorage {
    slots: HashMap<String, String>,
}

impl MemoryCartStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage with `value` already saved under `key`.
    #[must_use]
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        storage.slots.insert(key.to_owned(), value.to_owned());
        storage
    }

    /// Raw value under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(String::as_str)
    }
}

impl CartStorage for MemoryCartStorage {
    fn load(&self, key: &str) -> Result<Option<String>, CartStorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), CartStorageError> {
        self.slots.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
