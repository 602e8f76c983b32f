//! Cadence Runner
//!
//! Runs one task on a fixed interval, forever, and keeps a plain-text run log.
//!
//! Architecture:
//! - Configuration: command line flags with environment fallbacks
//! - Preflight: working directory, runtime environment and run log checks
//! - Services: task invocation, clock, run log
//! - Scheduler: the supervised polling loop
//!
//! Only preflight failures stop the runner. A failing task is logged and
//! retried after the interval.

mod config;
mod error;
mod preflight;
mod scheduler;
mod service;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::scheduler::SupervisedPoller;
use crate::service::{ProcessTask, SystemClock};

#[derive(Parser, Debug)]
#[command(name = "cadence-runner")]
#[command(about = "Run a task on a fixed interval, forever", long_about = None)]
struct Cli {
    /// Directory to enter before the loop starts
    #[arg(long, env = "CADENCE_WORKDIR", default_value = ".")]
    workdir: PathBuf,

    /// Seconds to sleep after each task run
    #[arg(long, env = "CADENCE_INTERVAL", default_value_t = 300)]
    interval: u64,

    /// Run log file, relative to the working directory
    #[arg(long, env = "CADENCE_LOG_FILE", default_value = config::DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Environment directory to activate for the task (e.g. a Python venv)
    #[arg(long, env = "CADENCE_RUNTIME_ENV")]
    runtime_env: Option<PathBuf>,

    /// Stop after this many runs instead of looping forever
    #[arg(long, env = "CADENCE_MAX_ITERATIONS")]
    max_iterations: Option<u64>,

    /// Task to run (default: python3 worker_entrada.py)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

impl Cli {
    fn into_config(self) -> Config {
        Config::from_command(self.command)
            .with_workdir(self.workdir)
            .with_interval(Duration::from_secs(self.interval))
            .with_log_file(self.log_file)
            .with_runtime_env(self.runtime_env)
            .with_max_iterations(self.max_iterations)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadence_runner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Cadence Runner");

    let config = Cli::parse().into_config();
    info!(
        "Loaded configuration: task='{}', workdir={}, interval={:?}, log_file={}",
        config.command_line(),
        config.workdir.display(),
        config.interval,
        config.log_file.display()
    );

    let workspace = preflight::resolve(&config).context("Preflight failed")?;
    let log = preflight::enter(&workspace).context("Preflight failed")?;

    if let Some(env_dir) = &workspace.runtime_env {
        info!("Activating runtime environment {}", env_dir.display());
    }

    let task = ProcessTask::new(config.program.clone(), config.args.clone())
        .with_workdir(workspace.workdir.clone())
        .with_runtime_env(workspace.runtime_env.clone());

    let poller = SupervisedPoller::new(task, SystemClock, log, config.interval);

    info!("Runner initialized successfully");

    match config.max_iterations {
        Some(iterations) => {
            let records = poller.run_iterations(iterations).await;
            let failed = records.iter().filter(|r| r.is_failed()).count();
            info!(
                "Finished {} run(s): {} succeeded, {} failed",
                records.len(),
                records.len() - failed,
                failed
            );
            Ok(())
        }
        None => match poller.run().await {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let config = Cli::try_parse_from(["cadence-runner"]).unwrap().into_config();

        assert_eq!(config.workdir, PathBuf::from("."));
        assert_eq!(config.interval, Duration::from_secs(300));
        assert_eq!(config.log_file, PathBuf::from("cron.log"));
        assert_eq!(config.command_line(), "python3 worker_entrada.py");
        assert!(config.max_iterations.is_none());
    }

    #[test]
    fn test_cli_trailing_command() {
        let cli = Cli::try_parse_from([
            "cadence-runner",
            "--interval",
            "60",
            "--max-iterations",
            "2",
            "--",
            "python3",
            "worker_saida.py",
            "--verbose",
        ])
        .unwrap();
        let config = cli.into_config();

        assert_eq!(config.interval, Duration::from_secs(60));
        assert_eq!(config.max_iterations, Some(2));
        assert_eq!(config.program, "python3");
        assert_eq!(config.args, vec!["worker_saida.py", "--verbose"]);
    }

    #[test]
    fn test_cli_rejects_non_numeric_interval() {
        assert!(Cli::try_parse_from(["cadence-runner", "--interval", "5m"]).is_err());
    }
}
