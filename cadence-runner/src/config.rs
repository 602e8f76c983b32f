//! Runner configuration
//!
//! Defines the parameters of the supervised loop: where the task runs,
//! what it is, how long to sleep between runs and where the run log goes.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::SetupError;

/// Default interval between the end of one run and the start of the next
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);

/// Default run log file, relative to the working directory
pub const DEFAULT_LOG_FILE: &str = "cron.log";

/// Runner configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory the runner enters before the loop starts
    pub workdir: PathBuf,

    /// Sleep between the end of a run and the start of the next
    pub interval: Duration,

    /// Run log path, resolved against `workdir` when relative
    pub log_file: PathBuf,

    /// Existing environment directory to activate for the task
    /// (its `bin/` goes first on `PATH`)
    pub runtime_env: Option<PathBuf>,

    /// Stop after this many runs instead of looping forever
    pub max_iterations: Option<u64>,

    /// Task executable
    pub program: String,

    /// Task arguments
    pub args: Vec<String>,
}

impl Config {
    /// Creates a configuration for the given task with defaults for the rest
    pub fn new(program: String, args: Vec<String>) -> Self {
        Self {
            workdir: PathBuf::from("."),
            interval: DEFAULT_INTERVAL,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            runtime_env: None,
            max_iterations: None,
            program,
            args,
        }
    }

    /// Builds a configuration from a command line (`program arg...`),
    /// falling back to the default task when it is empty
    pub fn from_command(command: Vec<String>) -> Self {
        let mut parts = command.into_iter();
        match parts.next() {
            Some(program) => Self::new(program, parts.collect()),
            None => Self::default(),
        }
    }

    pub fn with_workdir(mut self, workdir: PathBuf) -> Self {
        self.workdir = workdir;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_log_file(mut self, log_file: PathBuf) -> Self {
        self.log_file = log_file;
        self
    }

    pub fn with_runtime_env(mut self, runtime_env: Option<PathBuf>) -> Self {
        self.runtime_env = runtime_env;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: Option<u64>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// The task as it would be typed in a shell, for log messages
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.program.trim().is_empty() {
            return Err(SetupError::InvalidConfig(
                "task program cannot be empty".to_string(),
            ));
        }

        if self.interval.as_secs() == 0 {
            return Err(SetupError::InvalidConfig(
                "interval must be greater than 0".to_string(),
            ));
        }

        if self.log_file.as_os_str().is_empty() {
            return Err(SetupError::InvalidConfig(
                "log file path cannot be empty".to_string(),
            ));
        }

        if self.max_iterations == Some(0) {
            return Err(SetupError::InvalidConfig(
                "max_iterations must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("python3".to_string(), vec!["worker_entrada.py".to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.interval, Duration::from_secs(300));
        assert_eq!(config.log_file, PathBuf::from("cron.log"));
        assert_eq!(config.command_line(), "python3 worker_entrada.py");
        assert!(config.runtime_env.is_none());
        assert!(config.max_iterations.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_command() {
        let config = Config::from_command(vec![
            "sh".to_string(),
            "-c".to_string(),
            "exit 1".to_string(),
        ]);
        assert_eq!(config.program, "sh");
        assert_eq!(config.args, vec!["-c", "exit 1"]);

        let config = Config::from_command(Vec::new());
        assert_eq!(config.program, "python3");
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        // Valid config should pass
        assert!(config.validate().is_ok());

        // Zero interval should fail
        config.interval = Duration::ZERO;
        assert!(config.validate().is_err());
        config.interval = Duration::from_secs(1);

        // Blank program should fail
        config.program = "  ".to_string();
        assert!(config.validate().is_err());
        config.program = "true".to_string();

        // Zero iterations should fail
        config.max_iterations = Some(0);
        assert!(config.validate().is_err());

        config.max_iterations = Some(3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = Config::default()
            .with_workdir(PathBuf::from("/srv/signals"))
            .with_interval(Duration::from_secs(60))
            .with_log_file(PathBuf::from("worker.log"))
            .with_runtime_env(Some(PathBuf::from("venv")))
            .with_max_iterations(Some(2));

        assert_eq!(config.workdir, PathBuf::from("/srv/signals"));
        assert_eq!(config.interval, Duration::from_secs(60));
        assert_eq!(config.log_file, PathBuf::from("worker.log"));
        assert_eq!(config.runtime_env, Some(PathBuf::from("venv")));
        assert_eq!(config.max_iterations, Some(2));
    }
}
