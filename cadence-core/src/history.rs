//! Run history reconstruction
//!
//! Rebuilds [`RunRecord`]s from the lines of a run log. The poller writes
//! only two kinds of per-iteration lines, so the rules are simple:
//! - `Executing task...` opens a record
//! - `ERROR during task execution` with the same timestamp marks it failed
//! - the next `Executing task...` proves the previous open record succeeded
//! - a `Loop started` line means the previous process went away; an open
//!   record is left as `Started` since its outcome was never logged
//! - any other line while a record is open counts as its task output

use serde::Serialize;

use crate::domain::log::LogLine;
use crate::domain::run::{RunRecord, RunStatus};

/// Rebuilds run records, oldest first, from raw log lines
pub fn reconstruct<I, S>(lines: I) -> Vec<RunRecord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut records: Vec<RunRecord> = Vec::new();
    // Index into `records` of the iteration still collecting output
    let mut open: Option<usize> = None;

    for line in lines {
        match LogLine::parse(line.as_ref()) {
            LogLine::Entry(entry) if entry.is_executing() => {
                if let Some(idx) = open.take() {
                    records[idx].status = RunStatus::Succeeded;
                }
                records.push(RunRecord::started(entry.timestamp));
                open = Some(records.len() - 1);
            }
            LogLine::Entry(entry) if entry.is_failure() => {
                if let Some(idx) = open {
                    if records[idx].started_at == entry.timestamp {
                        records[idx].status = RunStatus::Failed;
                        open = None;
                    }
                }
            }
            LogLine::Entry(entry) if entry.is_loop_start() => {
                open = None;
            }
            _ => {
                if let Some(idx) = open {
                    records[idx].output_lines += 1;
                }
            }
        }
    }

    records
}

/// Aggregate view over a run history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub started: usize,
    pub last: Option<RunRecord>,
}

impl RunStats {
    pub fn from_records(records: &[RunRecord]) -> Self {
        let count = |status| records.iter().filter(|r| r.status == status).count();

        Self {
            total: records.len(),
            succeeded: count(RunStatus::Succeeded),
            failed: count(RunStatus::Failed),
            started: count(RunStatus::Started),
            last: records.last().cloned(),
        }
    }

    /// Share of finished runs that failed, in percent
    pub fn failure_rate(&self) -> f64 {
        let finished = self.succeeded + self.failed;
        if finished == 0 {
            return 0.0;
        }
        self.failed as f64 * 100.0 / finished as f64
    }
}
