//! Path utilities for emitted sources.

use crate::error::{GenfmtError, Result};
use std::path::{Path, PathBuf};

/// Extension given to emitted files.
pub const SOURCE_EXTENSION: &str = "json";

/// Split a namespaced identifier into its segments.
///
/// Every segment must be non-empty and free of path separators, so the
/// identifier can never name a path outside the base directory.
///
/// # Examples
///
/// ```
/// use genfmt::paths::identifier_segments;
///
/// assert_eq!(identifier_segments("com.example.Widget").unwrap(), ["com", "example", "Widget"]);
/// assert!(identifier_segments("com..Widget").is_err());
/// assert!(identifier_segments("../Widget").is_err());
/// ```
pub fn identifier_segments(identifier: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = identifier.split('.').collect();
    let valid = segments
        .iter()
        .all(|s| !s.is_empty() && !s.contains(['/', '\\']) && *s != "~");
    if valid {
        Ok(segments)
    } else {
        Err(GenfmtError::InvalidIdentifier(identifier.to_string()))
    }
}

/// Path of the file for `identifier` under `base_dir`, creating its parent
/// directories.
///
/// `com.example.Widget` becomes `<base_dir>/com/example/Widget.json`; an
/// identifier without a namespace lands directly in `base_dir`.
pub fn source_path(base_dir: &Path, identifier: &str) -> Result<PathBuf> {
    let segments = identifier_segments(identifier)?;
    if base_dir.exists() && !base_dir.is_dir() {
        return Err(GenfmtError::NotADirectory(base_dir.display().to_string()));
    }

    let (name, namespace) = segments
        .split_last()
        .ok_or_else(|| GenfmtError::InvalidIdentifier(identifier.to_string()))?;
    let mut dir = base_dir.to_path_buf();
    dir.extend(namespace);
    std::fs::create_dir_all(&dir)?;

    Ok(dir.join(format!("{}.{}", name, SOURCE_EXTENSION)))
}

/// Expands a leading `~` in a path to the user's home directory.
///
/// This handles the common case where shell tilde expansion doesn't occur,
/// such as when using `--out-dir=~/path` syntax instead of `--out-dir ~/path`.
pub fn expand_tilde<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    if let Ok(stripped) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    path.to_path_buf()
}
