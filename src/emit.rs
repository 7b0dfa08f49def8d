//! Formatting followed by output to a source tree or a writer.

use crate::error::Result;
use crate::paths::source_path;
use crate::strategy::Strategy;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Format `source` and write it to its place under `base_dir`.
///
/// Returns the written path. Nothing is left behind if the write fails.
pub fn format_and_emit(
    strategy: &Strategy,
    identifier: &str,
    source: &str,
    base_dir: &Path,
) -> Result<PathBuf> {
    let formatted = strategy.format(identifier, source)?;
    let path = source_path(base_dir, identifier)?;

    if let Err(e) = fs::write(&path, formatted.as_bytes()) {
        if path.is_file()
            && let Err(cleanup) = fs::remove_file(&path)
        {
            warn!(path = %path.display(), error = %cleanup, "Failed to remove partial output");
        }
        return Err(e.into());
    }

    debug!(path = %path.display(), bytes = formatted.len(), "Emitted formatted source");
    Ok(path)
}

/// Format `source` and write it to `writer`.
pub fn format_to_writer(
    strategy: &Strategy,
    identifier: &str,
    source: &str,
    writer: &mut impl Write,
) -> Result<()> {
    let formatted = strategy.format(identifier, source)?;
    writer.write_all(formatted.as_bytes())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenfmtError;
    use crate::strategy::DirectFormatter;
    use tempfile::TempDir;

    fn direct() -> Strategy {
        Strategy::Direct(DirectFormatter::default())
    }

    #[test]
    fn test_emit_writes_formatted_file() {
        let dir = TempDir::new().unwrap();
        let path = format_and_emit(&direct(), "com.example.Widget", "{\"a\":1}", dir.path()).unwrap();

        assert_eq!(path, dir.path().join("com/example/Widget.json"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"a\": 1}\n");
    }

    #[test]
    fn test_emit_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        format_and_emit(&direct(), "a.B", "[1]", dir.path()).unwrap();
        let path = format_and_emit(&direct(), "a.B", "[2]", dir.path()).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "[2]\n");
    }

    #[test]
    fn test_formatting_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let err = format_and_emit(&direct(), "a.Bad", "{", dir.path()).unwrap_err();
        assert!(err.is_formatting());
        assert!(!dir.path().join("a").exists());
    }

    #[test]
    fn test_base_dir_is_a_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, "").unwrap();
        let err = format_and_emit(&direct(), "a.B", "{}", &file).unwrap_err();
        assert!(matches!(err, GenfmtError::NotADirectory(_)));
    }

    #[test]
    fn test_target_is_a_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/B.json")).unwrap();
        let err = format_and_emit(&direct(), "a.B", "{}", dir.path()).unwrap_err();
        assert!(matches!(err, GenfmtError::Io(_)));
        assert!(dir.path().join("a/B.json").is_dir());
    }

    #[test]
    fn test_format_to_writer() {
        let mut buffer = Vec::new();
        format_to_writer(&direct(), "a.B", "{\"k\":[true]}", &mut buffer).unwrap();
        assert_eq!(buffer, b"{\"k\": [true]}\n");
    }
}
