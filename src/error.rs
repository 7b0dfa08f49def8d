//! Error types for genfmt.

use thiserror::Error;

/// Main error type for genfmt.
#[derive(Error, Debug)]
pub enum GenfmtError {
    /// The engine rejected the source. `message` is the complete, rendered report.
    #[error("{message}")]
    Formatting { identifier: String, message: String },

    /// The worker infrastructure could not run the request.
    #[error("Failed to bootstrap formatter worker for '{identifier}': {reason}")]
    Bootstrap { identifier: String, reason: String },

    #[error("Invalid identifier '{0}': expected dot-separated segments without path separators")]
    InvalidIdentifier(String),

    #[error("Output path {0} exists but is not a directory")]
    NotADirectory(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenfmtError {
    /// Create a formatting failure.
    pub fn formatting(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Formatting {
            identifier: identifier.into(),
            message: message.into(),
        }
    }

    /// Create a bootstrap failure. `reason` must carry the underlying cause.
    pub fn bootstrap(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Bootstrap {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Whether the source itself is at fault (as opposed to the infrastructure).
    pub fn is_formatting(&self) -> bool {
        matches!(self, Self::Formatting { .. })
    }

    /// Whether the worker infrastructure failed.
    pub fn is_bootstrap(&self) -> bool {
        matches!(self, Self::Bootstrap { .. })
    }
}

/// Result type alias for genfmt operations.
pub type Result<T> = std::result::Result<T, GenfmtError>;
