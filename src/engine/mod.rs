//! The formatting engine seam.
//!
//! Both execution strategies call into a [`FormatEngine`]. The engine is a pure
//! function from unformatted source to formatted source; malformed input is reported
//! as a list of [`Diagnostic`]s positioned in the *unformatted* text.

mod json;

pub use json::JsonEngine;

use crate::error::{GenfmtError, Result};

/// One engine-reported defect in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-indexed line in the unformatted source.
    pub line: usize,
    /// 1-indexed column in the unformatted source, counted from a leading
    /// position before the first character: the first character is column 2.
    pub column: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Failure reported by a [`FormatEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The input is malformed; the diagnostics say where.
    Diagnostics(Vec<Diagnostic>),
    /// The engine failed for a reason unrelated to source positions.
    Internal(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Diagnostics(diagnostics) => {
                write!(f, "{} diagnostic(s)", diagnostics.len())
            }
            Self::Internal(message) => write!(f, "{}", message),
        }
    }
}

/// A source formatter.
pub trait FormatEngine: Send + Sync {
    fn format(&self, source: &str) -> std::result::Result<String, EngineError>;
}

/// Smallest accepted line width.
pub const MIN_WIDTH: usize = 20;

/// Largest accepted indent width.
pub const MAX_INDENT: usize = 16;

/// Layout options shared by the parent process and its workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Maximum line width before a container is broken across lines.
    pub max_width: usize,
    /// Spaces per nesting level.
    pub indent: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_width: 100,
            indent: 2,
        }
    }
}

impl EngineOptions {
    /// Check that the options describe a usable layout.
    pub fn validate(&self) -> Result<()> {
        if self.max_width < MIN_WIDTH {
            return Err(GenfmtError::Config(format!(
                "max width {} is below the minimum of {}",
                self.max_width, MIN_WIDTH
            )));
        }
        if self.indent == 0 || self.indent > MAX_INDENT {
            return Err(GenfmtError::Config(format!(
                "indent {} must be between 1 and {}",
                self.indent, MAX_INDENT
            )));
        }
        Ok(())
    }
}
