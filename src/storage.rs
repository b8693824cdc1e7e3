//! Durable key/value storage for persisted app state
//!
//! Every piece of persisted state (the verse cache, the selected translation,
//! recent searches, favorites) is stored as one whole value under one key.
//! Values are read and replaced as a unit; there are no partial writes.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

/// Errors raised by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading, writing or removing the underlying file failed
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded for storage
    #[error("Failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A durable mapping from storage key to raw bytes
pub trait Storage: Send + Sync {
    /// Returns the bytes stored under `key`, or `None` if nothing is stored
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replaces whatever is stored under `key` with `value`
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Removes the value stored under `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Stores each key as a `<key>.json` file inside a directory
///
/// The directory is created lazily on the first write, so constructing a
/// `FileStorage` never touches the filesystem.
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Directory where value files are stored
    dir: PathBuf,
}

impl FileStorage {
    /// Creates a FileStorage rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory this storage writes to
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Returns the path to the file backing the given key
    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process storage, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    /// Creates an empty MemoryStorage
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (FileStorage, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let storage = FileStorage::new(temp_dir.path());
        (storage, temp_dir)
    }

    #[test]
    fn test_file_get_returns_none_for_missing_key() {
        let (storage, _temp_dir) = create_test_storage();
        assert!(storage.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_file_set_creates_json_file() {
        let (storage, temp_dir) = create_test_storage();
        storage.set("verseCache", b"{}").expect("Write should succeed");

        let expected_path = temp_dir.path().join("verseCache.json");
        assert!(expected_path.exists(), "Value file should exist");
        assert_eq!(storage.get("verseCache").unwrap().as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn test_file_set_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("data");
        let storage = FileStorage::new(nested_path.clone());

        storage.set("key", b"value").expect("Write should succeed");

        assert!(nested_path.join("key.json").exists());
    }

    #[test]
    fn test_file_set_overwrites_previous_value() {
        let (storage, _temp_dir) = create_test_storage();
        storage.set("key", b"first").unwrap();
        storage.set("key", b"second").unwrap();

        assert_eq!(storage.get("key").unwrap().as_deref(), Some(&b"second"[..]));
    }

    #[test]
    fn test_file_remove_missing_key_is_ok() {
        let (storage, _temp_dir) = create_test_storage();
        assert!(storage.remove("never_written").is_ok());
    }

    #[test]
    fn test_file_remove_deletes_value() {
        let (storage, _temp_dir) = create_test_storage();
        storage.set("key", b"value").unwrap();
        storage.remove("key").unwrap();

        assert!(storage.get("key").unwrap().is_none());
    }

    #[test]
    fn test_memory_storage_roundtrip_and_remove() {
        let storage = MemoryStorage::new();
        assert!(storage.get("key").unwrap().is_none());

        storage.set("key", b"value").unwrap();
        assert_eq!(storage.get("key").unwrap().as_deref(), Some(&b"value"[..]));

        storage.remove("key").unwrap();
        assert!(storage.get("key").unwrap().is_none());
    }
}
