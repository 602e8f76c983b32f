//! Supervised poller
//!
//! Runs the task, sleeps for the interval, and does it again, forever.
//! Each iteration writes `Executing task...` before the task starts and,
//! if the task fails, `ERROR during task execution` with the same timestamp.
//! Task failures never stop the loop and there is no backoff: the next run
//! always starts one full interval after the previous one returned.

use cadence_core::domain::log::LogEntry;
use cadence_core::domain::run::{RunRecord, RunStatus};
use std::convert::Infallible;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::service::{Clock, Invocable, RunLog, TaskOutcome};

/// Poller that invokes one task on a fixed interval
pub struct SupervisedPoller<T, C, L> {
    task: T,
    clock: C,
    log: L,
    interval: Duration,
}

impl<T, C, L> SupervisedPoller<T, C, L>
where
    T: Invocable,
    C: Clock,
    L: RunLog,
{
    /// Creates a new poller
    pub fn new(task: T, clock: C, log: L, interval: Duration) -> Self {
        Self {
            task,
            clock,
            log,
            interval,
        }
    }

    /// Starts the loop. Only returns if the process is killed, which it
    /// never observes.
    pub async fn run(&self) -> Infallible {
        self.announce();

        loop {
            self.run_cycle().await;
            self.clock.sleep(self.interval).await;
        }
    }

    /// Runs exactly `iterations` cycles with the interval between them
    ///
    /// No sleep follows the last cycle.
    pub async fn run_iterations(&self, iterations: u64) -> Vec<RunRecord> {
        self.announce();

        let mut records = Vec::new();
        for i in 0..iterations {
            if i > 0 {
                self.clock.sleep(self.interval).await;
            }
            records.push(self.run_cycle().await);
        }

        records
    }

    /// Performs a single iteration: log, invoke, log failure
    pub async fn run_cycle(&self) -> RunRecord {
        let started_at = self.clock.now();
        self.append(&LogEntry::executing(started_at));
        info!("Executing task (started at {})", started_at);

        let output = CountingLog::new(&self.log);
        let outcome = self.task.execute(&output).await;

        let status = match outcome {
            TaskOutcome::Succeeded => {
                info!("Task succeeded");
                RunStatus::Succeeded
            }
            TaskOutcome::Failed(failure) => {
                warn!("Task failed: {}", failure);
                self.append(&LogEntry::failed(started_at));
                RunStatus::Failed
            }
        };

        RunRecord {
            started_at,
            status,
            output_lines: output.count(),
        }
    }

    fn announce(&self) {
        info!("Starting supervised loop (interval: {:?})", self.interval);
        self.append(&LogEntry::loop_started(
            self.clock.now(),
            self.interval.as_secs(),
        ));
    }

    /// Log write failures inside the loop are reported but never fatal
    fn append(&self, entry: &LogEntry) {
        if let Err(e) = self.log.append(entry) {
            error!("Failed to write run log entry '{}': {}", entry, e);
        }
    }
}

/// Forwards to the run log while counting task output lines
struct CountingLog<'a> {
    inner: &'a dyn RunLog,
    lines: AtomicUsize,
}

impl<'a> CountingLog<'a> {
    fn new(inner: &'a dyn RunLog) -> Self {
        Self {
            inner,
            lines: AtomicUsize::new(0),
        }
    }

    fn count(&self) -> usize {
        self.lines.load(Ordering::Relaxed)
    }
}

impl RunLog for CountingLog<'_> {
    fn append(&self, entry: &LogEntry) -> io::Result<()> {
        self.inner.append(entry)
    }

    fn append_output(&self, line: &str) -> io::Result<()> {
        self.lines.fetch_add(1, Ordering::Relaxed);
        self.inner.append_output(line)
    }
}
