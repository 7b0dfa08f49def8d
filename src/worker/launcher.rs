//! Bounded worker launcher.
//!
//! Every request takes a ticket, starts a fresh worker, runs one exchange and
//! reaps the worker before giving the ticket back.

use super::proc::WorkerHandle;
use super::protocol::exchange;
use super::spawn::LaunchConfig;
use super::tickets::TicketPool;
use crate::error::{GenfmtError, Result};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Formats by delegating each request to a short-lived worker process.
#[derive(Debug, Clone)]
pub struct Launcher {
    config: LaunchConfig,
    tickets: Arc<TicketPool>,
}

impl Launcher {
    pub fn new(config: LaunchConfig, tickets: Arc<TicketPool>) -> Self {
        Self { config, tickets }
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    pub fn tickets(&self) -> &TicketPool {
        &self.tickets
    }

    /// Format `source` in a worker. Blocks until a ticket is free, then for the
    /// whole exchange.
    #[instrument(level = "debug", skip(self, source), fields(bytes = source.len()))]
    pub fn format(&self, identifier: &str, source: &str) -> Result<String> {
        let _ticket = self.tickets.acquire().map_err(|e| {
            GenfmtError::bootstrap(identifier, format!("failed to acquire worker ticket: {}", e))
        })?;

        // Declared after the ticket so it is reaped before the ticket is released.
        let mut handle = WorkerHandle::spawn(self.config.command(identifier)?, identifier)?;
        let observed = exchange(&mut handle, identifier, source.as_bytes())?;
        debug!(
            pid = handle.pid(),
            termination = %observed.termination,
            "Formatter worker finished"
        );
        observed.into_result(identifier)
    }
}
