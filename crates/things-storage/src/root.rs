use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::info;

use crate::config::{StorageConfig, WriteMode};
use crate::data_dir::{data_dir, ensure_dir, DataDirResolver};
use crate::error::StorageResult;
use crate::file::FileStore;
use crate::path::KeyPath;
use crate::sub::SubStorage;
use crate::traits::KeyValueStore;

/// Name of the directory under the data directory holding all values.
pub const STORAGE_DIR: &str = "storage";

const GLOBAL_NAMESPACE: &str = "global";
const INSTANCE_NAMESPACE: &str = "instance";

/// The storage root: one backing store shared by every namespaced view.
///
/// Construct one at startup with [`Storage::open`] and hand clones to the
/// components that need it, or use the lazily created process-wide handle
/// from [`Storage::shared`].
#[derive(Clone)]
pub struct Storage {
    data_dir: PathBuf,
    store: Arc<dyn KeyValueStore>,
}

impl Storage {
    /// Resolve the data directory for `config` and open a [`FileStore`] at
    /// `<data dir>/storage`, creating both directories if needed.
    pub fn open(config: StorageConfig) -> StorageResult<Self> {
        let write_mode = config.write_mode;
        let resolver = DataDirResolver::new(config);
        let data_dir = resolver.resolve()?.to_path_buf();
        Self::open_in(data_dir, write_mode)
    }

    fn open_in(data_dir: PathBuf, write_mode: WriteMode) -> StorageResult<Self> {
        let root = data_dir.join(STORAGE_DIR);
        ensure_dir(&root)?;
        info!(root = %root.display(), ?write_mode, "opened storage");

        let store = FileStore::new(root).with_write_mode(write_mode);
        Ok(Self {
            data_dir,
            store: Arc::new(store),
        })
    }

    /// Use an arbitrary backing store, e.g. an [`InMemoryStore`](crate::InMemoryStore).
    pub fn with_store(data_dir: impl Into<PathBuf>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            data_dir: data_dir.into(),
            store,
        }
    }

    /// The process-wide storage root, configured from the environment.
    ///
    /// The first successful call opens the root; later calls return the same
    /// instance. A failed first attempt is retried on the next call.
    pub fn shared() -> StorageResult<&'static Storage> {
        static SHARED: OnceCell<Storage> = OnceCell::new();
        SHARED.get_or_try_init(|| -> StorageResult<Storage> {
            let config = StorageConfig::from_env();
            Self::open_in(data_dir()?.to_path_buf(), config.write_mode)
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The backing store shared by all views.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// A view at an arbitrary namespace.
    pub fn namespace(&self, namespace: KeyPath) -> SubStorage {
        SubStorage::new(Arc::clone(&self.store), namespace)
    }

    /// Application-wide values, under `global`.
    pub fn global(&self) -> SubStorage {
        self.namespace(KeyPath::from_trusted(&[GLOBAL_NAMESPACE]))
    }

    /// Values for one managed instance, under `instance/<id>`.
    pub fn instance(&self, id: &str) -> StorageResult<SubStorage> {
        let namespace = KeyPath::from_trusted(&[INSTANCE_NAMESPACE]).join(id)?;
        Ok(self.namespace(namespace))
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("data_dir", &self.data_dir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use things_values::{Value, ValueType};

    use super::*;
    use crate::error::StorageError;
    use crate::memory::InMemoryStore;

    fn temp_storage() -> (tempfile::TempDir, Storage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(StorageConfig::default().with_data_dir(dir.path())).unwrap();
        (dir, storage)
    }

    #[test]
    fn open_creates_storage_directory() {
        let (dir, storage) = temp_storage();
        assert_eq!(storage.data_dir(), dir.path());
        assert!(dir.path().join("storage").is_dir());
    }

    #[tokio::test]
    async fn end_to_end_global_count() {
        let (dir, storage) = temp_storage();
        let global = storage.global();

        global.set("count", &Value::Integer(5), ValueType::Number).await.unwrap();

        let file = dir.path().join("storage").join("global").join("count.json");
        assert_eq!(std::fs::read_to_string(file).unwrap(), "5");
        assert_eq!(
            global.get("count", ValueType::Number).await.unwrap(),
            Some(Value::Number(5.0))
        );
        assert_eq!(global.get("missing", ValueType::Number).await.unwrap(), None);
    }

    #[tokio::test]
    async fn instances_are_isolated_from_global() {
        let (dir, storage) = temp_storage();
        storage.global().set_mixed("x", 1).await.unwrap();
        storage.instance("A").unwrap().set_mixed("x", 2).await.unwrap();

        assert!(dir.path().join("storage/global/x.json").is_file());
        assert!(dir.path().join("storage/instance/A/x.json").is_file());
        assert_eq!(
            storage.instance("B").unwrap().get_mixed("x").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn reopened_storage_sees_previous_writes() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig::default().with_data_dir(dir.path());
        Storage::open(config.clone())
            .unwrap()
            .instance("lamp")
            .unwrap()
            .set_mixed("state", json!({"power": true}))
            .await
            .unwrap();

        let reopened = Storage::open(config).unwrap();
        assert_eq!(
            reopened.instance("lamp").unwrap().get_mixed("state").await.unwrap(),
            Some(Value::Mixed(json!({"power": true})))
        );
    }

    #[tokio::test]
    async fn atomic_write_mode_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig::default()
            .with_data_dir(dir.path())
            .with_write_mode(WriteMode::Atomic);
        let storage = Storage::open(config).unwrap();
        storage.global().set_mixed("k", "v").await.unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("storage/global/k.json")).unwrap(),
            "\"v\""
        );
    }

    #[test]
    fn instance_id_is_validated() {
        let storage = Storage::with_store("/unused", Arc::new(InMemoryStore::new()));
        assert!(matches!(
            storage.instance("a/b"),
            Err(StorageError::InvalidSegment { .. })
        ));
        assert_eq!(storage.instance("hub:1").unwrap().to_string(), "Storage[instance/hub:1]");
        assert_eq!(storage.global().to_string(), "Storage[global]");
    }

    #[tokio::test]
    async fn clones_share_the_backing_store() {
        let storage = Storage::with_store("/unused", Arc::new(InMemoryStore::new()));
        let copy = storage.clone();
        storage.global().set_mixed("k", true).await.unwrap();
        assert_eq!(
            copy.global().get_mixed("k").await.unwrap(),
            Some(Value::Mixed(json!(true)))
        );
    }
}
