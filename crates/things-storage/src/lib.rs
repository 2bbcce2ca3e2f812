//! Hierarchical, file-backed key-value storage for abstract-things.
//!
//! Values for the application and for each managed instance are kept as
//! small JSON files under a per-user data directory:
//!
//! ```text
//! <data dir>/storage/global/<key>.json
//! <data dir>/storage/instance/<id>/<key>.json
//! ```
//!
//! # Layers
//!
//! - [`data_dir()`] -- locates (and creates) the platform data directory,
//!   honoring the `THING_STORAGE` override
//! - [`KeyValueStore`] -- async get/set of JSON documents by [`KeyPath`]
//!   - [`FileStore`] -- one file per key
//!   - [`InMemoryStore`] -- `HashMap`-based store for tests and embedding
//! - [`Storage`] -- the storage root shared by all views
//! - [`SubStorage`] -- a namespaced view applying typed (de)serialization
//!
//! # Design Rules
//!
//! 1. Reading a key that was never written yields `Ok(None)`, never an error.
//! 2. There are no multi-key transactions, locks or write queues; concurrent
//!    writers to one key race and the last to finish wins.
//! 3. Key segments are validated, so a key always maps to exactly one file.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod config;
pub mod data_dir;
pub mod error;
pub mod file;
pub mod memory;
pub mod path;
pub mod root;
pub mod sub;
pub mod traits;

pub use config::{StorageConfig, WriteMode, APP_NAME, STORAGE_ENV};
pub use data_dir::{data_dir, platform_data_dir, DataDirResolver, Platform};
pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::InMemoryStore;
pub use path::KeyPath;
pub use root::Storage;
pub use sub::SubStorage;
pub use traits::KeyValueStore;

pub use things_values::{Value, ValueType};

/// The `global` view of the process-wide [`Storage::shared`] root.
pub fn global() -> StorageResult<SubStorage> {
    Ok(Storage::shared()?.global())
}

/// The `instance/<id>` view of the process-wide [`Storage::shared`] root.
pub fn instance(id: &str) -> StorageResult<SubStorage> {
    Storage::shared()?.instance(id)
}
