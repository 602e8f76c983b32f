//! Core domain types
//!
//! This module contains the structures shared by the runner (which writes
//! the run log) and the CLI (which reads it back).

pub mod log;
pub mod run;
