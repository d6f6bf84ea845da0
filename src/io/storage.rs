//! Durable key-value slots.
//!
//! The persistence layer only needs "read the document under this key" and
//! "replace the document under this key". `FileStorage` keeps one JSON file
//! per key in the data directory; `MemoryStorage` backs tests and can be told
//! to reject writes.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::io::recovery::atomic_write;

/// Reasons the storage backend refused a read or write
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("storage quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// The slot holds bytes that are not UTF-8; carries a lossy decoding
    #[error("stored document is not valid UTF-8")]
    NotText(String),
}

/// A durable slot store keyed by namespace strings
pub trait Storage {
    /// Read the value under `key`. `Ok(None)` means nothing was ever stored.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key`.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One `<key>.json` file per slot inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    quota_bytes: u64,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>, quota_bytes: u64) -> Self {
        FileStorage {
            dir: dir.into(),
            quota_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn slot_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::Unavailable(format!(
                "invalid storage key '{}'",
                key
            )));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(content) => Ok(Some(content)),
                Err(e) => Err(StorageError::NotText(
                    String::from_utf8_lossy(e.as_bytes()).into_owned(),
                )),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_to_storage_error(&path, e)),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        let needed = value.len() as u64;
        if needed > self.quota_bytes {
            return Err(StorageError::QuotaExceeded(format!(
                "{} bytes needed, limit is {}",
                needed, self.quota_bytes
            )));
        }
        fs::create_dir_all(&self.dir).map_err(|e| io_to_storage_error(&self.dir, e))?;
        atomic_write(&path, value.as_bytes()).map_err(|e| io_to_storage_error(&path, e))?;
        tracing::debug!(path = %path.display(), bytes = needed, "wrote storage slot");
        Ok(())
    }
}

fn io_to_storage_error(path: &Path, e: std::io::Error) -> StorageError {
    match e.kind() {
        ErrorKind::StorageFull => {
            StorageError::QuotaExceeded(format!("{}: {}", path.display(), e))
        }
        _ => StorageError::Unavailable(format!("{}: {}", path.display(), e)),
    }
}

/// In-process storage with write counting and failure injection
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
    writes: usize,
    fail_with: Option<StorageError>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with one slot
    pub fn with_slot(key: &str, value: &str) -> Self {
        let mut storage = Self::default();
        storage.slots.insert(key.to_string(), value.to_string());
        storage
    }

    /// Number of successful writes so far
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn slot(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(String::as_str)
    }

    /// Make every following write fail with `error` (None restores writes)
    pub fn set_failure(&mut self, error: Option<StorageError>) {
        self.fail_with = error;
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        self.slots.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_storage_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut storage = FileStorage::new(dir.path(), 1024);
        assert_eq!(storage.read("slot").unwrap(), None);

        storage.write("slot", "{\"a\":1}").unwrap();
        assert_eq!(storage.read("slot").unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(dir.path().join("slot.json").exists());
    }

    #[test]
    fn test_file_storage_reports_non_utf8_slot() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("slot.json"), b"caf\xe9").unwrap();
        let storage = FileStorage::new(dir.path(), 1024);
        assert_eq!(
            storage.read("slot"),
            Err(StorageError::NotText("caf\u{FFFD}".into()))
        );
    }

    #[test]
    fn test_file_storage_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b");
        let mut storage = FileStorage::new(&nested, 1024);
        storage.write("slot", "x").unwrap();
        assert_eq!(fs::read_to_string(nested.join("slot.json")).unwrap(), "x");
    }

    #[test]
    fn test_file_storage_enforces_quota() {
        let dir = TempDir::new().unwrap();
        let mut storage = FileStorage::new(dir.path(), 4);
        let err = storage.write("slot", "too long").unwrap_err();
        assert_eq!(
            err,
            StorageError::QuotaExceeded("8 bytes needed, limit is 4".into())
        );
        assert_eq!(storage.read("slot").unwrap(), None);
    }

    #[test]
    fn test_file_storage_unavailable_when_dir_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let mut storage = FileStorage::new(&blocker, 1024);
        assert!(matches!(
            storage.write("slot", "x"),
            Err(StorageError::Unavailable(_))
        ));
    }

    #[test]
    fn test_file_storage_rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path(), 1024);
        assert!(storage.slot_path("../escape").is_err());
        assert!(storage.slot_path("").is_err());
        assert!(storage.slot_path(".hidden").is_err());
        assert!(storage.slot_path("eisenhower_matrix_v1").is_ok());
    }

    #[test]
    fn test_memory_storage_counts_and_fails() {
        let mut storage = MemoryStorage::new();
        storage.write("k", "v").unwrap();
        assert_eq!(storage.writes(), 1);

        storage.set_failure(Some(StorageError::Unavailable("disabled".into())));
        assert!(storage.write("k", "w").is_err());
        assert_eq!(storage.writes(), 1);
        assert_eq!(storage.slot("k"), Some("v"));
    }
}
