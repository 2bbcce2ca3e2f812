use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application name used for the platform data directory.
pub const APP_NAME: &str = "abstract-things";

/// Environment variable overriding the data directory.
pub const STORAGE_ENV: &str = "THING_STORAGE";

/// How value files are written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Truncate and rewrite the file in place. A crash mid-write can leave a
    /// truncated file that fails to decode on the next read.
    #[default]
    Overwrite,
    /// Write a sibling temporary file, then rename it over the target.
    Atomic,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory name under the platform data location.
    pub app_name: String,
    /// Use this directory verbatim instead of the platform convention.
    pub data_dir: Option<PathBuf>,
    pub write_mode: WriteMode,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            data_dir: None,
            write_mode: WriteMode::default(),
        }
    }
}

impl StorageConfig {
    /// Default config with the data directory taken from `THING_STORAGE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`StorageConfig::from_env`], reading variables through `lookup`.
    /// An empty value counts as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            data_dir: lookup(STORAGE_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            ..Self::default()
        }
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StorageConfig::default();
        assert_eq!(c.app_name, "abstract-things");
        assert!(c.data_dir.is_none());
        assert_eq!(c.write_mode, WriteMode::Overwrite);
    }

    #[test]
    fn lookup_reads_override() {
        let c = StorageConfig::from_lookup(|name| {
            (name == STORAGE_ENV).then(|| "/tmp/custom".to_string())
        });
        assert_eq!(c.data_dir, Some(PathBuf::from("/tmp/custom")));
    }

    #[test]
    fn empty_override_is_ignored() {
        let c = StorageConfig::from_lookup(|_| Some(String::new()));
        assert!(c.data_dir.is_none());
    }

    #[test]
    fn builders() {
        let c = StorageConfig::default()
            .with_data_dir("/srv/things")
            .with_write_mode(WriteMode::Atomic);
        assert_eq!(c.data_dir, Some(PathBuf::from("/srv/things")));
        assert_eq!(c.write_mode, WriteMode::Atomic);
    }

    #[test]
    fn serde_round_trip() {
        let c = StorageConfig::default().with_write_mode(WriteMode::Atomic);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["write_mode"], "atomic");
        let back: StorageConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, c);
    }
}
