//! Process handle for a single worker.

use super::signals::TerminationReason;
use crate::error::{GenfmtError, Result};
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, Stdio};
use std::time::Duration;
use tracing::{debug, warn};

/// How long a dropped, unreaped worker gets to handle SIGTERM before SIGKILL.
const TERMINATE_GRACE: Duration = Duration::from_millis(50);

/// The three standard streams of a worker, moved out of its handle.
pub struct WorkerStdio {
    pub stdin: ChildStdin,
    pub stdout: ChildStdout,
    pub stderr: ChildStderr,
}

/// Handle to one spawned worker process.
///
/// Owned by exactly one request. Dropping a handle that has not been reaped
/// terminates and reaps the process.
pub struct WorkerHandle {
    child: Child,
    identifier: String,
    reaped: bool,
}

impl WorkerHandle {
    /// Spawn `command` with all three standard streams piped.
    pub fn spawn(mut command: Command, identifier: &str) -> Result<Self> {
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let child = command.spawn().map_err(|e| {
            GenfmtError::bootstrap(
                identifier,
                format!(
                    "failed to start worker {}: {}",
                    command.get_program().to_string_lossy(),
                    e
                ),
            )
        })?;
        debug!(pid = child.id(), identifier, "Spawned formatter worker");

        Ok(Self {
            child,
            identifier: identifier.to_string(),
            reaped: false,
        })
    }

    /// Get the process ID.
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Take ownership of the worker's standard streams. Only possible once.
    pub fn take_stdio(&mut self) -> Result<WorkerStdio> {
        let missing = |stream: &str| {
            GenfmtError::bootstrap(&self.identifier, format!("worker {} not captured", stream))
        };
        let stdin = self.child.stdin.take().ok_or_else(|| missing("stdin"))?;
        let stdout = self.child.stdout.take().ok_or_else(|| missing("stdout"))?;
        let stderr = self.child.stderr.take().ok_or_else(|| missing("stderr"))?;
        Ok(WorkerStdio {
            stdin,
            stdout,
            stderr,
        })
    }

    /// Wait for the process to exit (blocking) and reap it.
    pub fn wait(&mut self) -> Result<TerminationReason> {
        if self.reaped {
            return Err(GenfmtError::bootstrap(
                &self.identifier,
                "worker process already reaped",
            ));
        }
        let status = self.child.wait().map_err(|e| {
            GenfmtError::bootstrap(&self.identifier, format!("waiting for worker failed: {}", e))
        })?;
        self.reaped = true;
        Ok(TerminationReason::from_exit_status(status))
    }

    /// Send SIGTERM to the process.
    fn terminate(&self) {
        if let Ok(raw) = i32::try_from(self.child.id()) {
            let _ = signal::kill(Pid::from_raw(raw), Signal::SIGTERM);
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }
        // Already exited: reap it without signalling.
        if let Ok(Some(_)) = self.child.try_wait() {
            self.reaped = true;
            return;
        }
        warn!(
            pid = self.child.id(),
            identifier = %self.identifier,
            "Cleaning up unreaped formatter worker"
        );

        // Try graceful termination
        self.terminate();
        std::thread::sleep(TERMINATE_GRACE);
        if let Ok(Some(_)) = self.child.try_wait() {
            self.reaped = true;
            return;
        }

        // Force kill
        let _ = self.child.kill();
        let _ = self.child.wait();
        self.reaped = true;
    }
}
