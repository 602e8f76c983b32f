//! Configuration module
//!
//! Handles CLI configuration, which is only the run log to read.

use std::path::PathBuf;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Run log written by cadence-runner
    pub log_file: PathBuf,
}
