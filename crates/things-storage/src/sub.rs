use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use things_values::{from_json, to_json, Value, ValueType};
use tracing::debug;

use crate::error::StorageResult;
use crate::path::KeyPath;
use crate::traits::KeyValueStore;

/// A namespaced view over a shared [`KeyValueStore`].
///
/// Every key is stored under the view's namespace, so `global` and
/// `instance/<id>` never collide. Views are cheap to clone and own nothing
/// but the namespace; two views with the same namespace see the same data.
#[derive(Clone)]
pub struct SubStorage {
    store: Arc<dyn KeyValueStore>,
    namespace: KeyPath,
}

impl SubStorage {
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: KeyPath) -> Self {
        Self { store, namespace }
    }

    pub fn namespace(&self) -> &KeyPath {
        &self.namespace
    }

    /// A nested view at `<namespace>/<key>`. No I/O.
    pub fn sub(&self, key: &str) -> StorageResult<SubStorage> {
        Ok(Self {
            store: Arc::clone(&self.store),
            namespace: self.namespace.join(key)?,
        })
    }

    /// Read `key` and narrow it to `kind`.
    ///
    /// Returns `Ok(None)` when nothing is stored under `key`.
    pub async fn get(&self, key: &str, kind: ValueType) -> StorageResult<Option<Value>> {
        let full = self.namespace.join(key)?;
        let raw = self.store.get(&full).await?;
        let value = from_json(kind, raw)?;
        debug!(key = %full, %kind, found = value.is_some(), "storage get");
        Ok(value)
    }

    /// Encode `value` as `kind` and store it under `key`.
    pub async fn set(&self, key: &str, value: &Value, kind: ValueType) -> StorageResult<()> {
        let full = self.namespace.join(key)?;
        let json = to_json(kind, value)?;
        self.store.set(&full, &json).await?;
        debug!(key = %full, %kind, "storage set");
        Ok(())
    }

    /// [`SubStorage::get`] with the untyped `mixed` tag.
    pub async fn get_mixed(&self, key: &str) -> StorageResult<Option<Value>> {
        self.get(key, ValueType::Mixed).await
    }

    /// [`SubStorage::set`] with the untyped `mixed` tag.
    pub async fn set_mixed(&self, key: &str, value: impl Into<Value>) -> StorageResult<()> {
        self.set(key, &value.into(), ValueType::Mixed).await
    }

    /// Read `key` and deserialize it into `T`.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let full = self.namespace.join(key)?;
        match self.store.get(&full).await? {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(json) => Ok(Some(serde_json::from_value(json)?)),
        }
    }

    /// Serialize `value` and store it under `key`.
    pub async fn set_as<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let full = self.namespace.join(key)?;
        let json = serde_json::to_value(value)?;
        self.store.set(&full, &json).await
    }
}

impl fmt::Display for SubStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Storage[{}]", self.namespace)
    }
}

impl fmt::Debug for SubStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubStorage")
            .field("namespace", &self.namespace.to_string())
            .finish()
    }
}
