//! Cart storage in a local directory.
//!
//! Each key becomes `<dir>/<key>.json`. The directory is created on first
//! save.

use std::io::ErrorKind;
use std::path::PathBuf;

use online_shop_core::cart::{CartStorage, CartStorageError};

/// Default cart directory, relative to the working directory.
pub const DEFAULT_CART_DIR: &str = ".shop-cart";

/// File-backed [`CartStorage`].
#[derive(Debug, Clone)]
pub struct FileCartStorage {
    dir: PathBuf,
}

impl FileCartStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> Result<PathBuf, CartStorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(CartStorageError::Unavailable(format!(
                "invalid storage key: {key:?}"
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl CartStorage for FileCartStorage {
    fn load(&self, key: &str) -> Result<Option<String>, CartStorageError> {
        match std::fs::read_to_string(self.path(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), CartStorageError> {
        let path = self.path(key)?;
        std::fs::create_dir_all(&self.dir)?;

        // Write then rename so a crash never leaves half a cart behind.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use online_shop_core::cart::{CART_STORAGE_KEY, CartSession};

    use super::*;

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileCartStorage::new(dir.path().join("cart"));
        assert!(storage.load(CART_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileCartStorage::new(dir.path().join("nested/cart"));
        storage.save(CART_STORAGE_KEY, "[]").unwrap();
        assert_eq!(storage.load(CART_STORAGE_KEY).unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("nested/cart/cartItems.json").exists());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileCartStorage::new(dir.path());
        assert!(storage.save("../escape", "x").is_err());
        assert!(storage.load("").is_err());
    }

    #[test]
    fn test_corrupt_file_loads_empty_cart() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cartItems.json"), "{not json").unwrap();
        let cart = CartSession::load(FileCartStorage::new(dir.path()));
        assert!(cart.is_empty());
    }
}
