//! Location of the persisted data directory.
//!
//! Resolution order:
//! 1. An explicit override (`THING_STORAGE` or [`StorageConfig::data_dir`]),
//!    used verbatim.
//! 2. The platform convention:
//!    - macOS: `~/Library/Application Support/<app>`
//!    - Windows: `%LOCALAPPDATA%\<app>\Data`, else `~\AppData\Local\<app>\Data`
//!    - other: `$XDG_DATA_HOME/<app>`, else `~/.local/share/<app>`
//!
//! The resolved directory is created before it is handed out and cached for
//! the lifetime of the resolver.

use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::config::{StorageConfig, STORAGE_ENV};
use crate::error::{StorageError, StorageResult};

/// Platform family deciding the data directory convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    /// Linux and every other Unix-like system.
    Unix,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }
}

/// Compute the conventional data directory for `app_name` on `platform`.
///
/// Pure: environment variables are read through `env` and nothing touches
/// the filesystem.
pub fn platform_data_dir(
    platform: Platform,
    app_name: &str,
    home: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> StorageResult<PathBuf> {
    let env_dir = |name: &str| env(name).filter(|v| !v.is_empty()).map(PathBuf::from);
    let home_dir = || home.map(Path::to_path_buf).ok_or(StorageError::NoHomeDir(STORAGE_ENV));

    let dir = match platform {
        Platform::MacOs => home_dir()?
            .join("Library")
            .join("Application Support")
            .join(app_name),
        Platform::Windows => {
            let base = match env_dir("LOCALAPPDATA") {
                Some(dir) => dir,
                None => home_dir()?.join("AppData").join("Local"),
            };
            base.join(app_name).join("Data")
        }
        Platform::Unix => {
            let base = match env_dir("XDG_DATA_HOME") {
                Some(dir) => dir,
                None => home_dir()?.join(".local").join("share"),
            };
            base.join(app_name)
        }
    };
    Ok(dir)
}

/// Idempotently create `dir` and any missing parents.
pub fn ensure_dir(dir: &Path) -> StorageResult<()> {
    std::fs::create_dir_all(dir).map_err(|source| StorageError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Resolves and memoizes the data directory for one [`StorageConfig`].
#[derive(Debug)]
pub struct DataDirResolver {
    config: StorageConfig,
    resolved: OnceCell<PathBuf>,
}

impl DataDirResolver {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            resolved: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// The data directory, created on first call.
    ///
    /// Later calls return the cached path without touching the filesystem.
    /// A failed resolution is not cached.
    pub fn resolve(&self) -> StorageResult<&Path> {
        self.resolved
            .get_or_try_init(|| -> StorageResult<PathBuf> {
                let dir = match &self.config.data_dir {
                    Some(dir) => dir.clone(),
                    None => platform_data_dir(
                        Platform::current(),
                        &self.config.app_name,
                        dirs::home_dir().as_deref(),
                        |name| std::env::var(name).ok(),
                    )?,
                };
                ensure_dir(&dir)?;
                debug!(path = %dir.display(), "resolved data directory");
                Ok(dir)
            })
            .map(PathBuf::as_path)
    }
}

static DATA_DIR: OnceCell<DataDirResolver> = OnceCell::new();

/// The process-wide data directory, configured from the environment.
pub fn data_dir() -> StorageResult<&'static Path> {
    DATA_DIR
        .get_or_init(|| DataDirResolver::new(StorageConfig::from_env()))
        .resolve()
}
