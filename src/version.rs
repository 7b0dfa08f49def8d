//! Version strings for `genfmt --version`.
//!
//! Release builds may set `GENFMT_GIT_REV` at compile time to stamp the
//! revision they were built from.

use crate::strategy::selector::{HOST_RUNTIME_VERSION, ISOLATION_MIN_VERSION};
use std::sync::LazyLock;

/// The package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git revision stamped at build time (empty string if not set).
pub const GIT_REV: &str = match option_env!("GENFMT_GIT_REV") {
    Some(rev) => rev,
    None => "",
};

static FULL_VERSION: LazyLock<String> = LazyLock::new(|| {
    if GIT_REV.is_empty() {
        PKG_VERSION.to_string()
    } else {
        format!("{} ({})", PKG_VERSION, GIT_REV)
    }
});

static LONG_VERSION: LazyLock<String> = LazyLock::new(|| {
    format!(
        "{}\nhost runtime version: {} (engine isolation from {})",
        full_version(),
        HOST_RUNTIME_VERSION,
        ISOLATION_MIN_VERSION
    )
});

/// `"X.Y.Z (rev)"` when built with a revision, otherwise `"X.Y.Z"`.
///
/// # Examples
///
/// ```
/// use genfmt::version::full_version;
///
/// assert!(full_version().starts_with(env!("CARGO_PKG_VERSION")));
/// ```
pub fn full_version() -> String {
    FULL_VERSION.clone()
}

/// Long version for clap's `--version`, with the runtime the binary targets.
pub fn long_version() -> &'static str {
    LONG_VERSION.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_version_format() {
        let version = full_version();
        if GIT_REV.is_empty() {
            assert_eq!(version, PKG_VERSION);
        } else {
            assert!(version.contains(GIT_REV));
            assert!(version.ends_with(')'));
        }
    }

    #[test]
    fn test_long_version_mentions_runtime() {
        let long = long_version();
        assert!(long.starts_with(&full_version()));
        assert!(long.contains("host runtime version"));
    }
}
