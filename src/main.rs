//! genfmt - canonical formatting for generated sources

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::{OwoColorize, Stream::Stderr};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use genfmt::cli::{Cli, Commands, EmitArgs, FormatArgs, StrategyArgs};
use genfmt::config::FormatterConfig;
use genfmt::logging::{self, LogConfig};
use genfmt::strategy::{self, RuntimeInfo, Strategy};
use genfmt::{emit, paths, worker};

/// Program entry point: parses CLI arguments, dispatches the selected command, and handles top-level errors.
///
/// Worker mode skips logging setup so that nothing but the worker's own report
/// can reach its stderr.
fn main() {
    let cli = Cli::parse();

    if !matches!(cli.command, Commands::Worker(_)) {
        if cli.no_color {
            owo_colors::set_override(false);
        }
        logging::init(
            LogConfig::from_verbosity(cli.verbose, cli.quiet)
                .with_ansi(!cli.no_color)
                .with_env_overrides(),
        );
    }

    let result = match &cli.command {
        Commands::Format(args) => cmd_format(&cli, args),
        Commands::Emit(args) => cmd_emit(&cli, args),
        Commands::Strategy(args) => cmd_strategy(&cli, args),
        Commands::Completions(args) => {
            args.generate();
            Ok(())
        }
        Commands::Worker(args) => {
            worker::run_worker_main(args.identifier.as_deref(), cli.engine_options())
        }
    };

    if let Err(e) = result {
        eprintln!(
            "{}: {}",
            "error"
                .if_supports_color(Stderr, |text| text.red())
                .if_supports_color(Stderr, |text| text.bold()),
            e
        );
        for cause in e.chain().skip(1) {
            eprintln!(
                "  {}: {}",
                "caused by".if_supports_color(Stderr, |text| text.yellow()),
                cause
            );
        }
        std::process::exit(1);
    }
}

/// Resolve configuration (defaults, environment, flags), then build and
/// install the process-wide strategy.
fn install_strategy(cli: &Cli) -> Result<&'static Strategy> {
    let config = cli.apply_to(FormatterConfig::from_env());
    debug!(grants = ?cli.grants, "Capability grants on the command line");
    let strategy = Strategy::from_config(&config, &RuntimeInfo::current())
        .context("Failed to configure the formatter")?;
    info!(strategy = %strategy.kind(), "Formatting strategy selected");

    if strategy::install(strategy).is_err() {
        debug!("Strategy already installed, keeping the existing one");
    }
    Ok(strategy::global())
}

/// Read `file`, or stdin when it is absent or `-`.
fn read_source(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read source from stdin")?;
            Ok(source)
        }
    }
}

fn default_identifier(file: Option<&Path>) -> String {
    file.filter(|path| *path != Path::new("-"))
        .and_then(|path| path.file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "stdin".to_string())
}

fn cmd_format(cli: &Cli, args: &FormatArgs) -> Result<()> {
    let file = args.file.as_deref();
    let identifier = args
        .identifier
        .clone()
        .unwrap_or_else(|| default_identifier(file));
    let source = read_source(file)?;
    let strategy = install_strategy(cli)?;

    let mut stdout = io::stdout().lock();
    emit::format_to_writer(strategy, &identifier, &source, &mut stdout)?;
    Ok(())
}

fn cmd_emit(cli: &Cli, args: &EmitArgs) -> Result<()> {
    let source = read_source(args.file.as_deref())?;
    let strategy = install_strategy(cli)?;
    let out_dir = paths::expand_tilde(&args.out_dir);

    let path = emit::format_and_emit(strategy, &args.identifier, &source, &out_dir)
        .with_context(|| format!("Failed to emit '{}'", args.identifier))?;
    if !cli.quiet {
        println!("{}", path.display());
    }
    Ok(())
}

#[derive(Serialize)]
struct StrategyReport {
    strategy: genfmt::StrategyKind,
    preference: String,
    runtime_version: u32,
    granted: bool,
    max_workers: Option<usize>,
    worker_program: Option<PathBuf>,
}

fn cmd_strategy(cli: &Cli, args: &StrategyArgs) -> Result<()> {
    let config = cli.apply_to(FormatterConfig::from_env());
    let runtime = RuntimeInfo::current();
    let strategy = Strategy::from_config(&config, &runtime)
        .context("Failed to configure the formatter")?;

    let report = StrategyReport {
        strategy: strategy.kind(),
        preference: config.strategy.to_string(),
        runtime_version: runtime.version,
        granted: strategy::selector::has_required_grants(&runtime.launch_args),
        max_workers: strategy.capacity(),
        worker_program: match &strategy {
            Strategy::Worker(launcher) => {
                Some(launcher.config().resolve_program("strategy")?)
            }
            Strategy::Direct(_) => None,
        },
    };

    let mut stdout = io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut stdout, &report)?;
        writeln!(stdout)?;
    } else {
        writeln!(stdout, "strategy:        {}", report.strategy)?;
        writeln!(stdout, "preference:      {}", report.preference)?;
        writeln!(stdout, "runtime version: {}", report.runtime_version)?;
        writeln!(stdout, "granted:         {}", report.granted)?;
        if let Some(max) = report.max_workers {
            writeln!(stdout, "max workers:     {}", max)?;
        }
        if let Some(program) = &report.worker_program {
            writeln!(stdout, "worker program:  {}", program.display())?;
        }
    }
    Ok(())
}
