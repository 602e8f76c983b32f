//! Task invocation service
//!
//! The task is whatever the poller runs each iteration. It is opaque to the
//! runner: only its exit status matters, and its stdout/stderr are forwarded
//! verbatim into the run log.

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::service::run_log::RunLog;

/// How long output is still collected after the task exits
const OUTPUT_GRACE: Duration = Duration::from_millis(250);

/// Why a task run did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFailure {
    /// Exited with a non-zero status code
    Exit(i32),
    /// Terminated by a signal
    Signal,
    /// Could not be started at all
    Spawn(String),
    /// Started, but waiting for it failed
    Io(String),
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskFailure::Exit(code) => write!(f, "exited with status {}", code),
            TaskFailure::Signal => write!(f, "terminated by signal"),
            TaskFailure::Spawn(e) => write!(f, "failed to start: {}", e),
            TaskFailure::Io(e) => write!(f, "failed while waiting: {}", e),
        }
    }
}

/// Result of one task run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Succeeded,
    Failed(TaskFailure),
}

/// Something the poller can run once per iteration
#[async_trait]
pub trait Invocable: Send + Sync {
    /// Runs the task to completion, writing its output to `output`
    ///
    /// Never returns an error: every way the task can go wrong is a
    /// [`TaskOutcome::Failed`].
    async fn execute(&self, output: &dyn RunLog) -> TaskOutcome;
}

/// Runs the task as a child process
pub struct ProcessTask {
    program: String,
    args: Vec<String>,
    workdir: Option<PathBuf>,
    runtime_env: Option<PathBuf>,
}

impl ProcessTask {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            workdir: None,
            runtime_env: None,
        }
    }

    pub fn with_workdir(mut self, workdir: PathBuf) -> Self {
        self.workdir = Some(workdir);
        self
    }

    /// Activates an environment directory for the child: `VIRTUAL_ENV` is set
    /// and `<env>/bin` goes first on `PATH`
    pub fn with_runtime_env(mut self, runtime_env: Option<PathBuf>) -> Self {
        self.runtime_env = runtime_env;
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }

        if let Some(env_dir) = &self.runtime_env {
            let current = std::env::var_os("PATH").unwrap_or_default();
            let paths =
                std::iter::once(env_dir.join("bin")).chain(std::env::split_paths(&current));
            match std::env::join_paths(paths) {
                Ok(path) => {
                    cmd.env("PATH", path);
                }
                Err(e) => warn!("Keeping PATH unchanged for task: {}", e),
            }
            cmd.env("VIRTUAL_ENV", env_dir);
            cmd.env_remove("PYTHONHOME");
        }

        cmd
    }
}

#[async_trait]
impl Invocable for ProcessTask {
    async fn execute(&self, output: &dyn RunLog) -> TaskOutcome {
        debug!("Spawning task: {} {:?}", self.program, self.args);

        let mut child = match self.command().spawn() {
            Ok(child) => child,
            Err(e) => {
                // What a shell would print for a missing or unusable program
                write_output(output, &format!("{}: {}", self.program, e));
                return TaskOutcome::Failed(TaskFailure::Spawn(e.to_string()));
            }
        };

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(forward_lines(stdout, tx.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(forward_lines(stderr, tx.clone())));
        }
        drop(tx);

        // Single writer: lines from both streams land whole, in arrival order.
        // The run ends when the child exits, not when its pipes close: a
        // background process it started may keep them open indefinitely.
        let status = loop {
            tokio::select! {
                biased;
                Some(line) = rx.recv() => write_output(output, &line),
                status = child.wait() => break status,
            }
        };

        let drain = async {
            while let Some(line) = rx.recv().await {
                write_output(output, &line);
            }
        };
        if tokio::time::timeout(OUTPUT_GRACE, drain).await.is_err() {
            debug!("Task output still open after exit, stopping readers");
            for reader in &readers {
                reader.abort();
            }
        } else {
            for reader in readers {
                match reader.await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!("Failed to read task output: {}", e),
                    Err(e) => warn!("Task output reader panicked: {}", e),
                }
            }
        }

        match status {
            Ok(status) if status.success() => TaskOutcome::Succeeded,
            Ok(status) => match status.code() {
                Some(code) => TaskOutcome::Failed(TaskFailure::Exit(code)),
                None => TaskOutcome::Failed(TaskFailure::Signal),
            },
            Err(e) => TaskOutcome::Failed(TaskFailure::Io(e.to_string())),
        }
    }
}

fn write_output(output: &dyn RunLog, line: &str) {
    if let Err(e) = output.append_output(line) {
        error!("Failed to write task output to run log: {}", e);
    }
}

/// Reads `reader` line by line until EOF, sending each line without its
/// terminator. Invalid UTF-8 is replaced rather than aborting the stream.
async fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\r', '\n']).to_string();
        if tx.send(line).is_err() {
            return Ok(());
        }
    }
}
