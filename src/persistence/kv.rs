use super::error::{StorageError, StorageResult};
use super::files::{atomic_write, read_file, remove_file};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Arc, Mutex};

/// Key holding the JSON task list
pub const TASKS_KEY: &str = "tasks";
/// Key holding the JSON session object
pub const USER_KEY: &str = "user";

/// Durable string-keyed storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&mut self, key: &str) -> StorageResult<()>;
}

/// Read and decode a JSON value; a missing key is `Ok(None)`
pub fn load_json<T, S>(store: &S, key: &str) -> StorageResult<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key)? {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Decode {
                key: key.to_string(),
                source,
            }),
    }
}

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// File backing a key, e.g. tasks.json
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(read_file(self.path_for(key))?)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        Ok(atomic_write(self.path_for(key), value)?)
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        Ok(remove_file(self.path_for(key))?)
    }
}

/// In-memory store; clones share the same map
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Backend(anyhow::anyhow!("Memory store lock poisoned")))
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Named {
        username: String,
    }

    #[test]
    fn test_file_store_set_get_remove() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path());

        assert!(store.get(TASKS_KEY).unwrap().is_none());

        store.set(TASKS_KEY, "[]").unwrap();
        assert_eq!(store.get(TASKS_KEY).unwrap().as_deref(), Some("[]"));
        assert!(temp_dir.path().join("tasks.json").exists());

        store.remove(TASKS_KEY).unwrap();
        assert!(store.get(TASKS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_file_store_remove_missing_key() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path());
        store.remove(USER_KEY).unwrap();
    }

    #[test]
    fn test_memory_store_clones_share_entries() {
        let mut store = MemoryStore::new();
        let observer = store.clone();

        store.set(USER_KEY, r#"{"username":"ada"}"#).unwrap();
        assert_eq!(
            observer.get(USER_KEY).unwrap().as_deref(),
            Some(r#"{"username":"ada"}"#)
        );

        store.remove(USER_KEY).unwrap();
        assert!(observer.get(USER_KEY).unwrap().is_none());
    }

    #[test]
    fn test_load_json_missing_and_present() {
        let mut store = MemoryStore::new();
        let missing: Option<Named> = load_json(&store, USER_KEY).unwrap();
        assert!(missing.is_none());

        store.set(USER_KEY, r#"{"username":"ada"}"#).unwrap();
        let loaded: Option<Named> = load_json(&store, USER_KEY).unwrap();
        assert_eq!(loaded, Some(Named { username: "ada".to_string() }));
    }

    #[test]
    fn test_load_json_decode_error_names_key() {
        let mut store = MemoryStore::new();
        store.set(USER_KEY, "not json").unwrap();

        let err = load_json::<Named, _>(&store, USER_KEY).unwrap_err();
        assert!(matches!(err, StorageError::Decode { ref key, .. } if key == USER_KEY));
    }
}
