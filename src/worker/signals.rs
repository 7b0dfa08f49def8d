//! Termination analysis for worker processes.

use nix::sys::signal::Signal;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

/// Reason why a worker process terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// Normal exit with status code.
    Exited(i32),
    /// Killed by signal.
    Signaled(Signal),
    /// Likely out of memory (SIGKILL from OOM killer).
    OutOfMemory,
    /// Stack overflow (SIGSEGV on Linux).
    StackOverflow,
    /// Stack overflow (SIGBUS on macOS).
    StackOverflowMacOS,
    /// Killed by a signal number nix does not know.
    UnknownSignal(i32),
    /// Neither an exit code nor a signal was reported.
    Unknown,
}

impl TerminationReason {
    /// Classify a reaped child's exit status.
    pub fn from_exit_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self::Exited(code);
        }
        match status.signal() {
            Some(raw) => match Signal::try_from(raw) {
                // SIGKILL (9) - likely OOM killer
                Ok(Signal::SIGKILL) => Self::OutOfMemory,
                // SIGSEGV (11) - stack overflow on Linux
                Ok(Signal::SIGSEGV) => Self::StackOverflow,
                // SIGBUS (10) - stack overflow on macOS
                Ok(Signal::SIGBUS) => Self::StackOverflowMacOS,
                Ok(signal) => Self::Signaled(signal),
                Err(_) => Self::UnknownSignal(raw),
            },
            None => Self::Unknown,
        }
    }

    /// Check if this is a successful exit.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Exited(0))
    }

    /// Exit code, if the process exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Exited(code) => Some(*code),
            _ => None,
        }
    }

    /// Get a human-readable description.
    pub fn description(&self) -> String {
        match self {
            Self::Exited(code) => format!("exited with code {}", code),
            Self::Signaled(sig) => format!("killed by signal {:?}", sig),
            Self::OutOfMemory => "killed by signal SIGKILL (possibly out of memory)".to_string(),
            Self::StackOverflow => "killed by signal SIGSEGV (possibly stack overflow)".to_string(),
            Self::StackOverflowMacOS => {
                "killed by signal SIGBUS (possibly stack overflow)".to_string()
            }
            Self::UnknownSignal(raw) => format!("killed by signal {}", raw),
            Self::Unknown => "terminated for an unknown reason".to_string(),
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}
