//! Persisted key/value preference storage.

use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Durable string-by-key storage that survives process restarts.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl StoreError {
    /// Whether retrying the same operation could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Io { .. } | StoreError::Unavailable(_))
    }
}

/// In-process store. Clones share the same map, so a clone handed to a
/// second manager models a restarted process reading the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// Writes go to a sibling temp file that is then renamed over the original,
/// so a process killed mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_slice(&contents).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let contents = serde_json::to_vec_pretty(entries).map_err(StoreError::Encode)?;
        let tmp_path = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp_path, contents).await.map_err(io_err)?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(io_err)?;

        debug!("Saved {} preference(s) to {}", entries.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load().await?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        if entries.remove(key).is_some() {
            self.save(&entries).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("app_language").await.unwrap(), None);

        store.set("app_language", "ar").await.unwrap();
        assert_eq!(
            store.get("app_language").await.unwrap(),
            Some("ar".to_string())
        );

        store.remove("app_language").await.unwrap();
        assert_eq!(store.get("app_language").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let clone = store.clone();

        store.set("key", "value").await.unwrap();
        assert_eq!(clone.get("key").await.unwrap(), Some("value".to_string()));
    }

    #[tokio::test]
    async fn test_file_store_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("prefs.json"));

        assert_eq!(store.get("app_language").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        FileStore::new(&path).set("app_language", "ar").await.unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get("app_language").await.unwrap(),
            Some("ar".to_string())
        );
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_overwrite_and_remove() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("prefs.json"));

        store.set("app_language", "ar").await.unwrap();
        store.set("app_language", "en").await.unwrap();
        store.set("rtl_fix_attempted", "2026-01-01T00:00:00Z").await.unwrap();
        store.remove("rtl_fix_attempted").await.unwrap();
        store.remove("never_set").await.unwrap();

        assert_eq!(
            store.get("app_language").await.unwrap(),
            Some("en".to_string())
        );
        assert_eq!(store.get("rtl_fix_attempted").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileStore::new(&path).get("app_language").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_transient_classification() {
        assert!(StoreError::Unavailable("busy".to_string()).is_transient());
        assert!(StoreError::Io {
            path: PathBuf::from("prefs.json"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        }
        .is_transient());
    }
}
