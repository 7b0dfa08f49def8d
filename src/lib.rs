//! genfmt - canonical formatting for generated sources.
//!
//! Generated text is formatted by an engine that, on newer host runtimes, may
//! only be reached with explicit capability grants. This crate hides that
//! behind one call: it formats in-process when it can, and otherwise in a
//! bounded pool of short-lived worker processes started with the grants.
//!
//! ```no_run
//! let formatted = genfmt::format("com.example.Widget", "{\"name\":\"widget\"}")?;
//! assert_eq!(formatted, "{\"name\": \"widget\"}\n");
//! # Ok::<(), genfmt::GenfmtError>(())
//! ```

pub mod cli;
pub mod config;
pub mod emit;
pub mod engine;
pub mod error;
pub mod logging;
pub mod paths;
pub mod render;
pub mod strategy;
pub mod version;
pub mod worker;

pub use config::{FormatterConfig, StrategyPreference};
pub use engine::{Diagnostic, EngineOptions, FormatEngine, JsonEngine};
pub use error::{GenfmtError, Result};
pub use strategy::{Strategy, StrategyKind};

use std::path::{Path, PathBuf};

/// Format `source` with the process-wide strategy.
///
/// `identifier` names the source in failure messages. The strategy is chosen
/// on the first call (see [`strategy::global`]).
pub fn format(identifier: &str, source: &str) -> Result<String> {
    strategy::global().format(identifier, source)
}

/// Format `source` with the process-wide strategy and write it under
/// `base_dir`. Returns the written path.
pub fn format_and_emit(identifier: &str, source: &str, base_dir: &Path) -> Result<PathBuf> {
    emit::format_and_emit(strategy::global(), identifier, source, base_dir)
}

/// Format `source` with the process-wide strategy and write it to `writer`.
pub fn format_to_writer(identifier: &str, source: &str, writer: &mut impl std::io::Write) -> Result<()> {
    emit::format_to_writer(strategy::global(), identifier, source, writer)
}
