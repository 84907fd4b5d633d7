//! Key/value storage backing the session (`token`, `user`, `language`).

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::SessionError;

/// Minimal string key/value store, shaped like browser local storage.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove_item(&self, key: &str) -> Result<(), SessionError>;
}

// ═══════════════════════════════════════════════════════════
// MemoryStorage
// ═══════════════════════════════════════════════════════════

#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, SessionError> {
        let items = self.items.lock().map_err(|_| SessionError::LockPoisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut items = self.items.lock().map_err(|_| SessionError::LockPoisoned)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), SessionError> {
        let mut items = self.items.lock().map_err(|_| SessionError::LockPoisoned)?;
        items.remove(key);
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// FileStorage
// ═══════════════════════════════════════════════════════════

/// JSON object persisted at `<data_dir>/storage.json`.
///
/// Every call re-reads the file so separate CLI invocations share state.
/// Writes go to a temp file in the same directory, then rename over the
/// original.
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, SessionError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(SessionError::Io(e)),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| SessionError::CorruptStore(e.to_string()))
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), SessionError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let body = serde_json::to_vec_pretty(map)
            .map_err(|e| SessionError::CorruptStore(e.to_string()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&body)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| SessionError::Io(e.error))?;
        Ok(())
    }

    fn update<F>(&self, f: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.write_lock.lock().map_err(|_| SessionError::LockPoisoned)?;
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(SessionError::CorruptStore(reason)) => {
                tracing::warn!(path = %self.path.display(), %reason, "Storage file unreadable, starting fresh");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        f(&mut map);
        self.write_map(&map)
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.update(|map| {
            map.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), SessionError> {
        self.update(|map| {
            map.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("token").unwrap(), None);
        storage.set_item("token", "abc").unwrap();
        assert_eq!(storage.get_item("token").unwrap().as_deref(), Some("abc"));
        storage.remove_item("token").unwrap();
        assert_eq!(storage.get_item("token").unwrap(), None);
    }

    #[test]
    fn file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let first = FileStorage::new(&path);
        first.set_item("language", "fr").unwrap();
        first.set_item("token", "t-1").unwrap();

        let second = FileStorage::new(&path);
        assert_eq!(second.get_item("language").unwrap().as_deref(), Some("fr"));
        second.remove_item("token").unwrap();
        assert_eq!(first.get_item("token").unwrap(), None);
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("storage.json"));
        assert_eq!(storage.get_item("user").unwrap(), None);
        storage.remove_item("user").unwrap();
    }

    #[test]
    fn garbage_file_is_reported_then_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();
        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.get_item("token"),
            Err(SessionError::CorruptStore(_))
        ));
        storage.set_item("language", "ar").unwrap();
        assert_eq!(storage.get_item("language").unwrap().as_deref(), Some("ar"));
    }
}
