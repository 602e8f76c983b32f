//! Setup errors
//!
//! Everything that can go wrong before the loop starts. These are the only
//! fatal errors of the runner; task failures are logged and retried.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the runner before the first iteration
#[derive(Debug, Error)]
pub enum SetupError {
    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Working directory missing or not enterable
    #[error("Cannot enter working directory {}: {source}", .path.display())]
    WorkingDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Runtime environment directory has no usable `bin/`
    #[error("Cannot activate runtime environment {}: no bin/ directory", .path.display())]
    RuntimeEnvironment { path: PathBuf },

    /// Run log cannot be opened for appending
    #[error("Cannot open log file {}: {source}", .path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
