//! Cadence Core
//!
//! Core types for the Cadence supervised poller.
//!
//! This crate contains:
//! - Domain types: run log lines and run records
//! - History: rebuilding run records from a run log

pub mod domain;
pub mod history;

pub use domain::log::{LogEntry, LogLine, LogParseError};
pub use domain::run::{RunRecord, RunStatus};
pub use history::{RunStats, reconstruct};
