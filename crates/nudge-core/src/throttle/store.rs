use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::storage::{data_dir, THROTTLE_FILE};

/// Durable string key/value store holding the throttle record.
pub trait ThrottleStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-process store. Lives as long as the value does.
#[derive(Debug, Clone, Default)]
pub struct MemoryThrottleStore {
    entries: HashMap<String, String>,
}

impl MemoryThrottleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ThrottleStore for MemoryThrottleStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// JSON-file store, durable across process restarts.
///
/// The file holds a flat `{ "key": "value" }` object. A missing file reads as
/// empty; a corrupt one is reported on `get` and replaced on `set`.
#[derive(Debug, Clone)]
pub struct FileThrottleStore {
    path: PathBuf,
}

impl FileThrottleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<data_dir>/throttle.json`.
    pub fn open_default() -> Result<Self, StorageError> {
        Ok(Self::new(data_dir()?.join(THROTTLE_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&content).map_err(|source| StorageError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source: std::io::Error| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(map).map_err(|source| StorageError::Json {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, content).map_err(io_err)
    }

    fn read_map_or_reset(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match self.read_map() {
            Err(StorageError::Json { path, source }) => {
                tracing::warn!(path = %path.display(), error = %source, "discarding corrupt throttle store");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }
}

impl ThrottleStore for FileThrottleStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_map()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.read_map_or_reset()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut map = self.read_map_or_reset()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_remove() {
        let mut store = MemoryThrottleStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "1").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("1"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("throttle.json");

        let mut store = FileThrottleStore::new(&path);
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "42").unwrap();

        let reopened = FileThrottleStore::new(&path);
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("42"));
    }

    #[test]
    fn file_store_reports_then_replaces_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("throttle.json");
        std::fs::write(&path, "not json").unwrap();

        let mut store = FileThrottleStore::new(&path);
        assert!(matches!(store.get("k"), Err(StorageError::Json { .. })));

        store.set("k", "7").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("7"));
    }

    #[test]
    fn file_store_remove_missing_key_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileThrottleStore::new(dir.path().join("throttle.json"));
        store.remove("absent").unwrap();
        assert!(!store.path().exists());
    }
}
