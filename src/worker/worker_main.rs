//! Worker process entry point.
//!
//! This module runs when `genfmt worker <identifier>` is invoked by a parent's
//! launcher. The worker reads the whole source from stdin, formats it in-process
//! and answers on stdout (exit 0) or with a rendered message on stderr (exit 1).
//! Stderr is a protocol channel here, so nothing else may write to it.

use crate::engine::EngineOptions;
use crate::strategy::DirectFormatter;
use crate::strategy::selector::{REQUIRED_GRANTS, has_grant};
use std::io::{self, Read, Write};

/// Exit status for every worker-side failure.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Run one worker request against explicit streams. Returns the exit code.
pub fn run_worker(
    identifier: Option<&str>,
    launch_args: &[String],
    options: EngineOptions,
    input: &mut impl Read,
    output: &mut impl Write,
    errors: &mut impl Write,
) -> i32 {
    let Some(identifier) = identifier else {
        let _ = writeln!(errors, "Identifier argument is required");
        return FAILURE_EXIT_CODE;
    };

    let missing: Vec<&str> = REQUIRED_GRANTS
        .iter()
        .copied()
        .filter(|grant| !has_grant(launch_args, grant))
        .collect();
    if !missing.is_empty() {
        let _ = writeln!(
            errors,
            "Worker for '{}' launched without required capability grants: {}",
            identifier,
            missing.join(", ")
        );
        return FAILURE_EXIT_CODE;
    }

    if let Err(e) = options.validate() {
        let _ = writeln!(errors, "{}", e);
        return FAILURE_EXIT_CODE;
    }

    let mut raw = Vec::new();
    if let Err(e) = input.read_to_end(&mut raw) {
        let _ = writeln!(errors, "Failed to read source for '{}': {}", identifier, e);
        return FAILURE_EXIT_CODE;
    }
    let source = match String::from_utf8(raw) {
        Ok(source) => source,
        Err(e) => {
            let _ = writeln!(errors, "Source for '{}' is not valid UTF-8: {}", identifier, e);
            return FAILURE_EXIT_CODE;
        }
    };

    match DirectFormatter::new(options).format(identifier, &source) {
        Ok(formatted) => match output.write_all(formatted.as_bytes()).and_then(|()| output.flush()) {
            Ok(()) => 0,
            Err(e) => {
                let _ = writeln!(errors, "Failed to write formatted '{}': {}", identifier, e);
                FAILURE_EXIT_CODE
            }
        },
        Err(e) => {
            let _ = writeln!(errors, "{}", e);
            FAILURE_EXIT_CODE
        }
    }
}

/// Run the worker against the process's own standard streams and exit.
pub fn run_worker_main(identifier: Option<&str>, options: EngineOptions) -> ! {
    // A parent that goes away should surface as a write error, not kill us silently.
    unsafe {
        nix::sys::signal::signal(
            nix::sys::signal::Signal::SIGPIPE,
            nix::sys::signal::SigHandler::SigIgn,
        )
        .ok();
    }

    let launch_args: Vec<String> = std::env::args().skip(1).collect();
    let code = run_worker(
        identifier,
        &launch_args,
        options,
        &mut io::stdin().lock(),
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    );
    std::process::exit(code)
}
