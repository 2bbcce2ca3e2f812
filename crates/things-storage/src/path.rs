//! Structured key paths.
//!
//! A key is an ordered list of segments. It renders slash-joined
//! (`instance/lamp-1/power`) and maps to `<root>/instance/lamp-1/power.json`.
//!
//! Valid segments:
//! - Must be non-empty
//! - Must not contain `/`, `\` or NUL
//! - Must not be `.` or `..`

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{StorageError, StorageResult};

/// Separator used when rendering a key path as text.
pub const SEPARATOR: char = '/';

/// Characters that are forbidden anywhere in a segment.
const FORBIDDEN_CHARS: &[char] = &['/', '\\', '\0'];

/// Validate a single key segment, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use things_storage::path::validate_segment;
///
/// assert!(validate_segment("power").is_ok());
/// assert!(validate_segment("lamp-1").is_ok());
/// assert!(validate_segment("").is_err());
/// assert!(validate_segment("a/b").is_err());
/// ```
pub fn validate_segment(segment: &str) -> StorageResult<()> {
    if segment.is_empty() {
        return Err(StorageError::invalid_segment(segment, "segment must not be empty"));
    }

    for ch in FORBIDDEN_CHARS {
        if segment.contains(*ch) {
            return Err(StorageError::invalid_segment(
                segment,
                format!("contains forbidden character: {ch:?}"),
            ));
        }
    }

    if segment == "." || segment == ".." {
        return Err(StorageError::invalid_segment(
            segment,
            "must not be a relative path component",
        ));
    }

    Ok(())
}

/// An ordered, validated sequence of key segments.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// The empty path. Only useful as a starting point for [`KeyPath::join`].
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from segments, validating each one.
    pub fn new<I, S>(segments: I) -> StorageResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments = segments
            .into_iter()
            .map(|s| {
                let s = s.into();
                validate_segment(&s).map(|()| s)
            })
            .collect::<StorageResult<Vec<_>>>()?;
        Ok(Self { segments })
    }

    /// Build a path from segments known to be valid.
    pub(crate) fn from_trusted(segments: &[&str]) -> Self {
        debug_assert!(segments.iter().all(|s| validate_segment(s).is_ok()));
        Self {
            segments: segments.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Parse a slash-separated path such as `instance/lamp-1`.
    pub fn parse(text: &str) -> StorageResult<Self> {
        Self::new(text.split(SEPARATOR))
    }

    /// A new path with `segment` appended.
    pub fn join(&self, segment: &str) -> StorageResult<Self> {
        validate_segment(segment)?;
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// The last segment, if any.
    pub fn leaf(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Location of the JSON file holding this key under `root`.
    ///
    /// The leaf segment gets a `.json` suffix. An empty path maps to
    /// `root` itself and is rejected by the stores.
    pub fn file_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        if let Some((leaf, parents)) = self.segments.split_last() {
            for segment in parents {
                path.push(segment);
            }
            path.push(format!("{leaf}.json"));
        }
        path
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}
