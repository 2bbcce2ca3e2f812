use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value as Json;
use tokio::fs;
use tracing::debug;

use crate::config::WriteMode;
use crate::error::{StorageError, StorageResult};
use crate::path::KeyPath;
use crate::traits::KeyValueStore;

/// File-backed key-value store.
///
/// Each key maps to `<root>/<segments...>.json`, holding the bare JSON
/// document with no envelope. Every call touches disk; there is no caching,
/// no write queue and no file locking.
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
    write_mode: WriteMode,
}

impl FileStore {
    /// Create a store rooted at `root`. Nothing is created until the first
    /// write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_mode: WriteMode::default(),
        }
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    /// Location of the file backing `key`.
    pub fn key_path(&self, key: &KeyPath) -> StorageResult<PathBuf> {
        if key.is_empty() {
            return Err(StorageError::invalid_segment("", "key must have at least one segment"));
        }
        Ok(key.file_path(&self.root))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &KeyPath) -> StorageResult<Option<Json>> {
        let path = self.key_path(key)?;
        let read = fs::read_to_string(&path).await;
        let text = match read {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(%key, "key not present");
                return Ok(None);
            }
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        let value = serde_json::from_str(&text).map_err(|source| StorageError::Corrupt {
            path: path.clone(),
            source,
        })?;
        debug!(%key, "read value");
        Ok(Some(value))
    }

    async fn set(&self, key: &KeyPath, value: &Json) -> StorageResult<()> {
        let path = self.key_path(key)?;
        let text = serde_json::to_string(value)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        match self.write_mode {
            WriteMode::Overwrite => write_file(&path, &text).await?,
            WriteMode::Atomic => {
                let tmp = temp_sibling(&path);
                if let Err(e) = write_file(&tmp, &text).await {
                    let _ = fs::remove_file(&tmp).await;
                    return Err(e);
                }
                if let Err(source) = fs::rename(&tmp, &path).await {
                    let _ = fs::remove_file(&tmp).await;
                    return Err(StorageError::Io { path, source });
                }
            }
        }

        debug!(%key, bytes = text.len(), mode = ?self.write_mode, "wrote value");
        Ok(())
    }
}

async fn write_file(path: &Path, text: &str) -> StorageResult<()> {
    fs::write(path, text).await.map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Per-process sequence making every temporary name unique.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// `count.json` -> `.count.json.<pid>.<seq>.tmp` in the same directory, so
/// the rename never crosses filesystems and concurrent writers never share a
/// temporary file.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{name}.{}.{seq}.tmp", std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(text: &str) -> KeyPath {
        KeyPath::parse(text).unwrap()
    }

    fn temp_store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let (_dir, store) = temp_store();
        assert_eq!(store.get(&key("global/missing")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_writes_bare_json_file() {
        let (dir, store) = temp_store();
        store.set(&key("global/count"), &json!(5)).await.unwrap();

        let text = std::fs::read_to_string(dir.path().join("global").join("count.json")).unwrap();
        assert_eq!(text, "5");
        assert_eq!(store.get(&key("global/count")).await.unwrap(), Some(json!(5)));
    }

    #[tokio::test]
    async fn set_creates_nested_directories() {
        let (dir, store) = temp_store();
        store
            .set(&key("instance/lamp-1/state/power"), &json!({"on": true}))
            .await
            .unwrap();
        assert!(dir.path().join("instance/lamp-1/state/power.json").is_file());
    }

    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let (_dir, store) = temp_store();
        let k = key("global/name");
        store.set(&k, &json!("a much longer first value")).await.unwrap();
        store.set(&k, &json!("short")).await.unwrap();
        assert_eq!(store.get(&k).await.unwrap(), Some(json!("short")));
    }

    #[tokio::test]
    async fn null_is_stored_as_null() {
        let (dir, store) = temp_store();
        store.set(&key("global/nothing"), &Json::Null).await.unwrap();
        let text = std::fs::read_to_string(dir.path().join("global/nothing.json")).unwrap();
        assert_eq!(text, "null");
        assert_eq!(store.get(&key("global/nothing")).await.unwrap(), Some(Json::Null));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let (dir, store) = temp_store();
        std::fs::create_dir_all(dir.path().join("global")).unwrap();
        std::fs::write(dir.path().join("global/broken.json"), "{\"trunc").unwrap();

        let err = store.get(&key("global/broken")).await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn unreadable_path_is_io_error() {
        let (dir, store) = temp_store();
        // A directory where the value file should be.
        std::fs::create_dir_all(dir.path().join("global/dir.json")).unwrap();

        let err = store.get(&key("global/dir")).await.unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }

    #[tokio::test]
    async fn parent_blocked_by_file_is_create_dir_error() {
        let (dir, store) = temp_store();
        std::fs::write(dir.path().join("global"), "not a directory").unwrap();

        let err = store.set(&key("global/x"), &json!(1)).await.unwrap_err();
        assert!(matches!(err, StorageError::CreateDir { .. }));
    }

    #[tokio::test]
    async fn empty_key_is_rejected() {
        let (_dir, store) = temp_store();
        assert!(store.get(&KeyPath::root()).await.is_err());
        assert!(store.set(&KeyPath::root(), &json!(1)).await.is_err());
    }

    #[tokio::test]
    async fn atomic_mode_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).with_write_mode(WriteMode::Atomic);
        store.set(&key("global/count"), &json!(1)).await.unwrap();
        store.set(&key("global/count"), &json!(2)).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path().join("global"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["count.json".to_string()]);
        assert_eq!(store.get(&key("global/count")).await.unwrap(), Some(json!(2)));
    }

    #[test]
    fn temp_sibling_stays_in_directory() {
        let tmp = temp_sibling(Path::new("/data/global/count.json"));
        assert_eq!(tmp.parent(), Some(Path::new("/data/global")));
        assert!(tmp.file_name().unwrap().to_string_lossy().starts_with(".count.json."));
    }

    #[test]
    fn temp_siblings_are_unique() {
        let path = Path::new("/data/global/count.json");
        assert_ne!(temp_sibling(path), temp_sibling(path));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_atomic_sets_all_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).with_write_mode(WriteMode::Atomic);
        let big = "x".repeat(200 * 1024);

        let mut tasks = Vec::new();
        for writer in 0..8 {
            let store = store.clone();
            let big = big.clone();
            tasks.push(tokio::spawn(async move {
                let k = key("global/count");
                for round in 0..25 {
                    store
                        .set(&k, &json!({"writer": writer, "round": round, "pad": big}))
                        .await
                        .unwrap();
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let stored = store.get(&key("global/count")).await.unwrap().unwrap();
        assert_eq!(stored["round"], json!(24));
        assert_eq!(stored["pad"].as_str().map(str::len), Some(200 * 1024));

        let names: Vec<String> = std::fs::read_dir(dir.path().join("global"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["count.json".to_string()]);
    }

    #[tokio::test]
    async fn failed_atomic_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).with_write_mode(WriteMode::Atomic);
        // A directory where the value file should be, so the final rename fails.
        std::fs::create_dir_all(dir.path().join("global/count.json/inner")).unwrap();

        let err = store.set(&key("global/count"), &json!(1)).await.unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));

        let leftovers: Vec<String> = std::fs::read_dir(dir.path().join("global"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "temp files left: {leftovers:?}");
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let (_dir, store) = temp_store();
        store.set(&key("global/a"), &json!(1)).await.unwrap();
        store.set(&key("global/b"), &json!(2)).await.unwrap();
        assert_eq!(store.get(&key("global/a")).await.unwrap(), Some(json!(1)));
        assert_eq!(store.get(&key("global/b")).await.unwrap(), Some(json!(2)));
    }
}
