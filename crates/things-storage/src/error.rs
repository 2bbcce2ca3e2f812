use std::path::PathBuf;

use things_values::ValueError;

/// Errors from storage operations.
///
/// A key that was never written is not an error; reads report it as
/// `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A key or namespace segment cannot be mapped to a single path component.
    #[error("invalid key segment {segment:?}: {reason}")]
    InvalidSegment { segment: String, reason: String },

    /// No home directory could be determined and no override was given.
    #[error("cannot determine home directory; set {0} to choose a data directory")]
    NoHomeDir(&'static str),

    /// A directory could not be created.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading or writing a value file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value file exists but does not hold valid JSON.
    #[error("corrupt value file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded for storage.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A value did not match its declared type.
    #[error("value error: {0}")]
    Value(#[from] ValueError),
}

impl StorageError {
    pub(crate) fn invalid_segment(segment: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSegment {
            segment: segment.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
