use async_trait::async_trait;
use serde_json::Value as Json;

use crate::error::StorageResult;
use crate::path::KeyPath;

/// Flat key-value store holding one JSON document per key.
///
/// All implementations must satisfy these invariants:
/// - Reading a key that was never written returns `Ok(None)`, not an error.
/// - A write fully replaces the previous document for that key.
/// - Keys are independent: there is no cross-key locking or ordering, and
///   concurrent writers to the same key race (last completion wins).
/// - All I/O errors are propagated, never silently ignored.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the document stored at `key`.
    ///
    /// Returns `Ok(None)` if nothing has been stored there.
    /// Returns `Err` on I/O failure or a document that is not valid JSON.
    async fn get(&self, key: &KeyPath) -> StorageResult<Option<Json>>;

    /// Store `value` at `key`, replacing any previous document.
    async fn set(&self, key: &KeyPath, value: &Json) -> StorageResult<()>;
}
