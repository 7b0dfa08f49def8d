//! Worker subprocesses for isolated formatting.
//!
//! When the engine is only reachable with capability grants, each request runs
//! in a fresh copy of this executable started with those grants. Concurrency is
//! bounded by a ticket pool sized from the machine's available parallelism.
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────┐
//!                     │ Parent Process  │
//!                     │   (Launcher)    │
//!                     └────────┬────────┘
//!                              │ one ticket per request
//!               ┌──────────────┼──────────────┐
//!               │              │              │
//!         ┌─────▼─────┐  ┌─────▼─────┐  ┌─────▼─────┐
//!         │ Worker 1  │  │ Worker 2  │  │ Worker N  │
//!         │ stdin  ─► │  │ stdin  ─► │  │ stdin  ─► │
//!         │ ◄─ stdout │  │ ◄─ stdout │  │ ◄─ stdout │
//!         │ ◄─ stderr │  │ ◄─ stderr │  │ ◄─ stderr │
//!         └───────────┘  └───────────┘  └───────────┘
//! ```
//!
//! # Features
//!
//! - **Bounded**: at most `capacity` workers alive at once
//! - **Deadlock-free**: all three pipes are serviced concurrently
//! - **Exit status first**: a non-zero exit is a formatting failure, a signal is a bootstrap failure
//! - **Always reaped**: a worker is waited on before its ticket is returned

mod launcher;
mod proc;
mod protocol;
mod signals;
mod spawn;
mod tickets;
pub mod worker_main;

pub use launcher::Launcher;
pub use proc::WorkerHandle;
pub use protocol::{Exchange, exchange};
pub use signals::TerminationReason;
pub use spawn::{LaunchConfig, WORKER_BINARY, WORKER_SUBCOMMAND, locate_worker};
pub use tickets::{AcquireError, Ticket, TicketPool};
pub use worker_main::{run_worker, run_worker_main};
