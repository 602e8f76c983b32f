//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod history;
mod stats;

use anyhow::{Context, Result};
use cadence_core::{RunRecord, reconstruct};
use clap::Subcommand;
use std::path::Path;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List runs reconstructed from the log, oldest first
    History {
        /// Only show the most recent N runs
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Summarize successes and failures
    Stats {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let records = load_records(&config.log_file).await?;

    match command {
        Commands::History { limit, json } => history::show_history(&records, limit, json),
        Commands::Stats { json } => stats::show_stats(&records, json),
    }
}

/// Reads the run log and rebuilds its run records
///
/// Lines that are not valid UTF-8 are read lossily; task output can be
/// anything.
async fn load_records(path: &Path) -> Result<Vec<RunRecord>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read run log {}", path.display()))?;

    let content = String::from_utf8_lossy(&bytes);
    Ok(reconstruct(content.lines()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::RunStatus;

    #[tokio::test]
    async fn test_load_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cron.log");
        let content: &[u8] = b"[2025-04-01 10:00:00] Loop started (interval: 300s)\n\
            [2025-04-01 10:00:00] Executing task...\n\
            signals: 78\n\
            [2025-04-01 10:05:01] Executing task...\n\
            binary \xff output\n\
            [2025-04-01 10:05:01] ERROR during task execution\n\
            [2025-04-01 10:10:02] Executing task...\n";
        std::fs::write(&path, content).unwrap();

        let records = load_records(&path).await.unwrap();
        let statuses: Vec<_> = records.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![RunStatus::Succeeded, RunStatus::Failed, RunStatus::Started]
        );
        assert_eq!(records[1].output_lines, 1);
    }

    #[tokio::test]
    async fn test_missing_log_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_records(&dir.path().join("cron.log")).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read run log"));
    }
}
