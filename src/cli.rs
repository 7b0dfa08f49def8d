//! Command-line interface definitions using clap.

use crate::config::{FormatterConfig, StrategyPreference};
use crate::engine::EngineOptions;
use crate::version;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Canonical formatting for generated sources.
#[derive(Parser, Debug)]
#[command(name = "genfmt")]
#[command(author, version, long_version = version::long_version(), about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output.
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Formatting strategy: auto, direct or worker.
    #[arg(long, global = true)]
    pub strategy: Option<StrategyPreference>,

    /// Maximum line width.
    #[arg(long, global = true)]
    pub max_width: Option<usize>,

    /// Spaces per nesting level.
    #[arg(long, global = true)]
    pub indent: Option<usize>,

    /// Maximum number of concurrent worker processes.
    #[arg(long, global = true)]
    pub max_workers: Option<usize>,

    /// Capability grant (`<capability>=all`). Passed to workers by the launcher.
    ///
    /// Declared so the flag parses and shows up in logs. Grant checks read the
    /// raw launch arguments instead (see [`crate::strategy::selector::has_grant`]).
    #[arg(long = "grant", global = true, hide = true, action = clap::ArgAction::Append)]
    pub grants: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Format a source and print it.
    Format(FormatArgs),

    /// Format a source and write it under an output directory.
    Emit(EmitArgs),

    /// Show which formatting strategy this process selects.
    Strategy(StrategyArgs),

    /// Generate shell completions.
    Completions(CompletionsArgs),

    /// Format one source from stdin (internal worker mode).
    #[command(hide = true)]
    Worker(WorkerArgs),
}

/// Arguments for the format command.
#[derive(Parser, Debug)]
pub struct FormatArgs {
    /// Source file (reads stdin when omitted or `-`).
    pub file: Option<PathBuf>,

    /// Name used in error reports (default: the file stem, or `stdin`).
    #[arg(short, long)]
    pub identifier: Option<String>,
}

/// Arguments for the emit command.
#[derive(Parser, Debug)]
pub struct EmitArgs {
    /// Source file (reads stdin when omitted or `-`).
    pub file: Option<PathBuf>,

    /// Namespaced identifier, e.g. `com.example.Widget`.
    #[arg(short, long)]
    pub identifier: String,

    /// Root of the output source tree.
    #[arg(short, long)]
    pub out_dir: PathBuf,
}

/// Arguments for the strategy command.
#[derive(Parser, Debug)]
pub struct StrategyArgs {
    /// Print as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the hidden worker command.
#[derive(Parser, Debug)]
pub struct WorkerArgs {
    /// Identifier of the source on stdin.
    pub identifier: Option<String>,
}

/// Arguments for shell completions.
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate and print completions to stdout.
    pub fn generate(&self) {
        clap_complete::generate(
            self.shell,
            &mut Cli::command(),
            "genfmt",
            &mut std::io::stdout(),
        );
    }
}

impl Cli {
    /// Engine options from the flags alone. Workers use these so they never
    /// depend on the parent's environment.
    pub fn engine_options(&self) -> EngineOptions {
        let defaults = EngineOptions::default();
        EngineOptions {
            max_width: self.max_width.unwrap_or(defaults.max_width),
            indent: self.indent.unwrap_or(defaults.indent),
        }
    }

    /// Apply the flags on top of `config`.
    pub fn apply_to(&self, mut config: FormatterConfig) -> FormatterConfig {
        if let Some(strategy) = self.strategy {
            config = config.with_strategy(strategy);
        }
        if let Some(width) = self.max_width {
            config = config.with_max_width(width);
        }
        if let Some(indent) = self.indent {
            config = config.with_indent(indent);
        }
        if let Some(max) = self.max_workers {
            config = config.with_max_workers(max);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_format_command() {
        let args = Cli::try_parse_from(["genfmt", "format", "widget.json"]).unwrap();
        match args.command {
            Commands::Format(format) => {
                assert_eq!(format.file, Some(PathBuf::from("widget.json")));
                assert!(format.identifier.is_none());
            }
            _ => panic!("Expected Format command"),
        }
    }

    #[test]
    fn test_emit_command() {
        let args = Cli::try_parse_from([
            "genfmt",
            "emit",
            "--out-dir",
            "gen",
            "--identifier",
            "com.example.Widget",
        ])
        .unwrap();
        match args.command {
            Commands::Emit(emit) => {
                assert_eq!(emit.out_dir, PathBuf::from("gen"));
                assert_eq!(emit.identifier, "com.example.Widget");
                assert!(emit.file.is_none());
            }
            _ => panic!("Expected Emit command"),
        }
    }

    #[test]
    fn test_worker_command_line() {
        let args = Cli::try_parse_from([
            "genfmt",
            "--grant=engine.parse=all",
            "--grant",
            "engine.layout=all",
            "--max-width",
            "80",
            "--indent",
            "4",
            "worker",
            "--",
            "-odd.Name",
        ])
        .unwrap();
        assert_eq!(args.grants, ["engine.parse=all", "engine.layout=all"]);
        assert_eq!(args.engine_options(), EngineOptions { max_width: 80, indent: 4 });
        match args.command {
            Commands::Worker(worker) => assert_eq!(worker.identifier.as_deref(), Some("-odd.Name")),
            _ => panic!("Expected Worker command"),
        }
    }

    #[test]
    fn test_worker_without_identifier_parses() {
        let args = Cli::try_parse_from(["genfmt", "worker"]).unwrap();
        match args.command {
            Commands::Worker(worker) => assert!(worker.identifier.is_none()),
            _ => panic!("Expected Worker command"),
        }
    }

    #[test]
    fn test_flags_override_config() {
        let args = Cli::try_parse_from([
            "genfmt",
            "format",
            "--strategy",
            "direct",
            "--max-width",
            "60",
            "--max-workers",
            "2",
        ])
        .unwrap();
        let config = args.apply_to(FormatterConfig::default().with_indent(4));
        assert_eq!(config.strategy, StrategyPreference::Direct);
        assert_eq!(config.engine.max_width, 60);
        assert_eq!(config.engine.indent, 4);
        assert_eq!(config.max_workers, Some(2));
    }

    #[test]
    fn test_invalid_strategy_rejected() {
        assert!(Cli::try_parse_from(["genfmt", "--strategy", "threads", "strategy"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["genfmt", "-v", "-q", "strategy"]);
        assert!(result.is_err());
    }
}
