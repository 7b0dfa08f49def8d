//! The per-request exchange with a worker process.
//!
//! A request is one full-duplex exchange over the worker's standard streams:
//!
//! ```text
//! Spawned ── write stdin, close ──► InputWritten ── drain stdout/stderr ──► OutputDrained
//!                                                                              │ wait
//!                                                      Formatted | Failed ◄── Reaped
//! ```
//!
//! Input is written on one scoped thread while stderr is drained on another and
//! stdout on the calling thread, so a worker that fills an output pipe before it
//! has consumed all of its input cannot stall either side.

use super::proc::{WorkerHandle, WorkerStdio};
use super::signals::TerminationReason;
use crate::error::{GenfmtError, Result};
use std::io::{self, Read, Write};
use std::thread;
use std::time::Instant;
use tracing::trace;

/// Everything observed from one worker after it has been reaped.
#[derive(Debug)]
pub struct Exchange {
    pub termination: TerminationReason,
    pub stdout: Vec<u8>,
    /// Captured error output, possibly ending in a read-failure marker.
    pub stderr: String,
    /// Failure while writing the source to the worker, if any.
    pub input_error: Option<io::Error>,
    /// Failure while draining the worker's standard output, if any.
    pub output_error: Option<io::Error>,
}

/// Drive `handle` through one request and reap it.
pub fn exchange(handle: &mut WorkerHandle, identifier: &str, source: &[u8]) -> Result<Exchange> {
    let start = Instant::now();
    let WorkerStdio {
        stdin,
        mut stdout,
        stderr,
    } = handle.take_stdio()?;

    let (input_error, stdout_bytes, output_error, stderr_text) = thread::scope(|s| {
        let writer = s.spawn(move || write_input(stdin, source));
        let error_reader = s.spawn(move || read_error_stream(stderr));

        let mut out = Vec::new();
        let output_error = stdout.read_to_end(&mut out).err();
        drop(stdout);

        let input_error = writer
            .join()
            .unwrap_or_else(|_| Some(io::Error::other("stdin writer thread panicked")));
        let stderr_text = error_reader.join().unwrap_or_else(|_| {
            "<failed to read process stream: stderr reader thread panicked>".to_string()
        });
        (input_error, out, output_error, stderr_text)
    });
    let drained = start.elapsed();

    let termination = handle.wait()?;
    trace!(
        identifier,
        input_bytes = source.len(),
        output_bytes = stdout_bytes.len(),
        stderr_bytes = stderr_text.len(),
        drain_ms = drained.as_millis(),
        total_ms = start.elapsed().as_millis(),
        termination = %termination,
        "Worker exchange complete"
    );

    Ok(Exchange {
        termination,
        stdout: stdout_bytes,
        stderr: stderr_text,
        input_error,
        output_error,
    })
}

/// Write the whole source, then close stdin to signal end of input.
fn write_input(mut stdin: impl Write, source: &[u8]) -> Option<io::Error> {
    let result = stdin.write_all(source).and_then(|()| stdin.flush());
    drop(stdin);
    result.err()
}

/// Drain an error stream. A read failure degrades the text instead of failing.
fn read_error_stream(mut stream: impl Read) -> String {
    let mut captured = Vec::new();
    if let Err(e) = stream.read_to_end(&mut captured) {
        captured.extend_from_slice(format!("<failed to read process stream: {}>", e).as_bytes());
    }
    String::from_utf8_lossy(&captured).into_owned()
}

impl Exchange {
    /// Turn the observations into the request's result.
    ///
    /// The exit status is judged first: a non-zero exit is a formatting failure
    /// carrying the worker's error output, and a stream error seen alongside it
    /// (typically a broken pipe because the worker stopped reading) does not
    /// replace that message.
    pub fn into_result(self, identifier: &str) -> Result<String> {
        match self.termination {
            TerminationReason::Exited(0) => {
                if let Some(e) = self.input_error {
                    return Err(GenfmtError::bootstrap(
                        identifier,
                        format!("failed to write source to worker: {}", e),
                    ));
                }
                if let Some(e) = self.output_error {
                    return Err(GenfmtError::bootstrap(
                        identifier,
                        format!("failed to read worker output: {}", e),
                    ));
                }
                String::from_utf8(self.stdout).map_err(|e| {
                    GenfmtError::bootstrap(
                        identifier,
                        format!("worker produced invalid UTF-8: {}", e),
                    )
                })
            }
            TerminationReason::Exited(code) => Err(GenfmtError::formatting(
                identifier,
                format!(
                    "Formatter exited non-zero ({}) formatting '{}':\n{}",
                    code,
                    identifier,
                    self.stderr.trim_end_matches('\n')
                ),
            )),
            other => {
                let mut reason = format!("worker {}", other);
                let stderr = self.stderr.trim_end_matches('\n');
                if !stderr.is_empty() {
                    reason.push_str(":\n");
                    reason.push_str(stderr);
                }
                Err(GenfmtError::bootstrap(identifier, reason))
            }
        }
    }
}
