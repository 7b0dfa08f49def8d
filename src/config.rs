//! Formatter configuration.
//!
//! Defaults, then environment overrides, then command-line flags (applied by the
//! binary through the builder methods).
//!
//! # Environment Variables
//!
//! - `GENFMT_STRATEGY` - auto, direct or worker
//! - `GENFMT_MAX_WIDTH` - line width for the engine
//! - `GENFMT_INDENT` - spaces per nesting level
//! - `GENFMT_WORKER_EXE` - worker executable (default: the current genfmt, or one beside it or on PATH)
//! - `GENFMT_MAX_WORKERS` - fixed worker ceiling (default: 2 × available parallelism)

use crate::engine::EngineOptions;
use crate::error::{GenfmtError, Result};
use crate::worker::LaunchConfig;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

/// Default worker tickets per unit of available parallelism.
pub const DEFAULT_TICKET_MULTIPLIER: usize = 2;

/// Which strategy to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StrategyPreference {
    /// Decide from the capability probe.
    #[default]
    Auto,
    Direct,
    Worker,
}

impl FromStr for StrategyPreference {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "direct" | "in-process" => Ok(Self::Direct),
            "worker" | "process" => Ok(Self::Worker),
            _ => Err(format!(
                "Unknown strategy: '{}'. Valid options: auto, direct, worker",
                s
            )),
        }
    }
}

impl std::fmt::Display for StrategyPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Direct => write!(f, "direct"),
            Self::Worker => write!(f, "worker"),
        }
    }
}

/// Formatter configuration.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    pub strategy: StrategyPreference,
    pub engine: EngineOptions,
    /// Worker executable (None = located automatically).
    pub worker_program: Option<PathBuf>,
    /// Tickets per unit of available parallelism.
    pub ticket_multiplier: usize,
    /// Explicit worker ceiling; overrides the multiplier.
    pub max_workers: Option<usize>,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyPreference::Auto,
            engine: EngineOptions::default(),
            worker_program: None,
            ticket_multiplier: DEFAULT_TICKET_MULTIPLIER,
            max_workers: None,
        }
    }
}

impl FormatterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_strategy(mut self, strategy: StrategyPreference) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_engine(mut self, engine: EngineOptions) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_max_width(mut self, max_width: usize) -> Self {
        self.engine.max_width = max_width;
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.engine.indent = indent;
        self
    }

    pub fn with_worker_program(mut self, program: PathBuf) -> Self {
        self.worker_program = Some(program);
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = Some(max_workers);
        self
    }

    /// Apply environment variable overrides.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = lookup("GENFMT_STRATEGY") {
            match value.parse() {
                Ok(strategy) => self.strategy = strategy,
                Err(e) => warn!("Ignoring GENFMT_STRATEGY: {}", e),
            }
        }
        if let Some(value) = lookup("GENFMT_MAX_WIDTH") {
            match value.trim().parse() {
                Ok(width) => self.engine.max_width = width,
                Err(_) => warn!(value = %value, "Ignoring invalid GENFMT_MAX_WIDTH"),
            }
        }
        if let Some(value) = lookup("GENFMT_INDENT") {
            match value.trim().parse() {
                Ok(indent) => self.engine.indent = indent,
                Err(_) => warn!(value = %value, "Ignoring invalid GENFMT_INDENT"),
            }
        }
        if let Some(path) = lookup("GENFMT_WORKER_EXE")
            && !path.is_empty()
        {
            self.worker_program = Some(PathBuf::from(path));
        }
        if let Some(value) = lookup("GENFMT_MAX_WORKERS") {
            match value.trim().parse() {
                Ok(max) => self.max_workers = Some(max),
                Err(_) => warn!(value = %value, "Ignoring invalid GENFMT_MAX_WORKERS"),
            }
        }
        self
    }

    /// Check the configuration before it is used.
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        if self.ticket_multiplier == 0 {
            return Err(GenfmtError::Config(
                "ticket multiplier must be at least 1".to_string(),
            ));
        }
        if self.max_workers == Some(0) {
            return Err(GenfmtError::Config(
                "max workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Launch configuration for workers.
    pub fn launch_config(&self) -> LaunchConfig {
        LaunchConfig {
            program: self.worker_program.clone(),
            program_args: Vec::new(),
            engine: self.engine,
            current_dir: None,
        }
    }
}
