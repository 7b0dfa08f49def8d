//! Worker command line construction.
//!
//! A worker is the genfmt executable started in its hidden `worker` mode with
//! the capability grants it needs and the parent's engine options. The genfmt
//! binary uses itself; other programs linking the library use an installed one.

use crate::engine::EngineOptions;
use crate::error::{GenfmtError, Result};
use crate::strategy::selector::grant_args;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Subcommand that puts the binary into worker mode.
pub const WORKER_SUBCOMMAND: &str = "worker";

/// Name of the executable that provides worker mode.
pub const WORKER_BINARY: &str = "genfmt";

/// Find the worker binary for a process running `current`.
pub fn locate_worker(current: &Path, path_var: Option<&OsStr>) -> Option<PathBuf> {
    let file_name = format!("{}{}", WORKER_BINARY, std::env::consts::EXE_SUFFIX);
    if current.file_name() == Some(OsStr::new(&file_name)) {
        return Some(current.to_path_buf());
    }

    // Test and build-script binaries live one level below the bin directory.
    let beside = current.parent().into_iter().flat_map(|dir| [Some(dir), dir.parent()]);
    let on_path = path_var.into_iter().flat_map(|paths| std::env::split_paths(paths));
    beside
        .flatten()
        .map(Path::to_path_buf)
        .chain(on_path)
        .map(|dir| dir.join(&file_name))
        .find(|candidate| candidate.is_file())
}

/// Everything needed to start a worker, fixed when the launcher is built.
#[derive(Debug, Clone, Default)]
pub struct LaunchConfig {
    /// Worker executable. `None` means [`locate_worker`] decides.
    pub program: Option<PathBuf>,
    /// Arguments placed before the worker arguments, for wrapper programs.
    pub program_args: Vec<String>,
    /// Engine options forwarded so the worker lays out text like the parent would.
    pub engine: EngineOptions,
    /// Working directory for workers. `None` inherits the parent's.
    pub current_dir: Option<PathBuf>,
}

impl LaunchConfig {
    pub fn new(engine: EngineOptions) -> Self {
        Self {
            engine,
            ..Self::default()
        }
    }

    /// Use `program` instead of locating a worker.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = Some(program.into());
        self
    }

    /// Run the worker through a wrapper, e.g. `nice -n 10 <worker>`.
    pub fn with_program_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.program_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Resolve the worker executable.
    ///
    /// An explicit program wins. Otherwise the current executable is used when
    /// it is genfmt itself; a host binary that only links the library gets the
    /// `genfmt` found next to it, one directory up, or on `PATH`.
    pub fn resolve_program(&self, identifier: &str) -> Result<PathBuf> {
        if let Some(program) = &self.program {
            return Ok(program.clone());
        }
        let current = std::env::current_exe().map_err(|e| {
            GenfmtError::bootstrap(
                identifier,
                format!("failed to locate the current executable: {}", e),
            )
        })?;
        locate_worker(&current, std::env::var_os("PATH").as_deref()).ok_or_else(|| {
            GenfmtError::bootstrap(
                identifier,
                format!(
                    "no {} worker executable found next to {} or on PATH; set GENFMT_WORKER_EXE",
                    WORKER_BINARY,
                    current.display()
                ),
            )
        })
    }

    /// Arguments passed to the worker, in order: grants, engine options,
    /// entry point, identifier.
    pub fn worker_args(&self, identifier: &str) -> Vec<String> {
        let mut args = grant_args();
        args.push("--max-width".to_string());
        args.push(self.engine.max_width.to_string());
        args.push("--indent".to_string());
        args.push(self.engine.indent.to_string());
        args.push(WORKER_SUBCOMMAND.to_string());
        // `--` keeps identifiers that start with `-` positional.
        args.push("--".to_string());
        args.push(identifier.to_string());
        args
    }

    /// Build the command for one request.
    pub fn command(&self, identifier: &str) -> Result<Command> {
        let mut command = Command::new(self.resolve_program(identifier)?);
        command.args(&self.program_args);
        command.args(self.worker_args(identifier));
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        Ok(command)
    }
}
