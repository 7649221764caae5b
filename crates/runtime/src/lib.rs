//! Tick-loop orchestration for the combat core.
//!
//! This crate owns a [`combat_core::CombatState`], feeds it the commands
//! queued for each tick and fires deferred actions afterwards, so every
//! ledger mutation of a tick settles before any wave of that tick runs.
//! Everything the engine reports lands in a [`CombatLog`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the tick loop and its builder
//! - [`command`] defines what callers can queue for the next tick
//! - [`oracle`] bundles loaded content into the core's oracle aggregate
//! - [`log`] keeps the per-tick event record
pub mod command;
pub mod error;
pub mod log;
pub mod oracle;
pub mod runtime;

pub use command::Command;
pub use error::{Result, RuntimeError};
pub use log::{CombatLog, LogEntry};
pub use oracle::OracleManager;
pub use runtime::{Runtime, RuntimeBuilder, TickReport};
