//! Cadence CLI
//!
//! Command-line interface for reading a Cadence run log after the fact.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Inspect the run history of a Cadence supervised loop", long_about = None)]
struct Cli {
    /// Run log file
    #[arg(long, env = "CADENCE_LOG_FILE", default_value = "cron.log")]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        log_file: cli.log_file,
    };

    handle_command(cli.command, &config).await
}
