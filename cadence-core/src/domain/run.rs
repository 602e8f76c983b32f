//! Run record domain types

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one iteration as far as the log can tell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Started and not (yet) known to have finished
    Started,
    Succeeded,
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Started => "started",
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One iteration of the supervised loop
///
/// Never persisted as structured data: the poller only writes log lines,
/// and records are rebuilt from them on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub started_at: NaiveDateTime,
    pub status: RunStatus,
    /// Raw task output lines attributed to this iteration
    pub output_lines: usize,
}

impl RunRecord {
    pub fn started(started_at: NaiveDateTime) -> Self {
        Self {
            started_at,
            status: RunStatus::Started,
            output_lines: 0,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == RunStatus::Failed
    }
}
