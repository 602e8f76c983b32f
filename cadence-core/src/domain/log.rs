//! Run log line types
//!
//! The run log is a plain text file. Lines written by the poller look like
//! `[2025-01-31 14:05:00] Executing task...`; everything else in the file is
//! raw output of the task and is kept verbatim.

use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Timestamp layout used inside the brackets
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Written once when the supervised loop begins
pub const LOOP_STARTED: &str = "Loop started";

/// Written at the start of every iteration
pub const EXECUTING_TASK: &str = "Executing task...";

/// Written when the task of an iteration fails
pub const TASK_FAILED: &str = "ERROR during task execution";

/// A timestamped line written by the poller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: NaiveDateTime,
    pub message: String,
}

impl LogEntry {
    pub fn new(timestamp: NaiveDateTime, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
        }
    }

    /// Loop announcement, carrying the configured interval for operators
    pub fn loop_started(timestamp: NaiveDateTime, interval_secs: u64) -> Self {
        Self::new(
            timestamp,
            format!("{} (interval: {}s)", LOOP_STARTED, interval_secs),
        )
    }

    pub fn executing(timestamp: NaiveDateTime) -> Self {
        Self::new(timestamp, EXECUTING_TASK)
    }

    pub fn failed(timestamp: NaiveDateTime) -> Self {
        Self::new(timestamp, TASK_FAILED)
    }

    pub fn is_loop_start(&self) -> bool {
        self.message.starts_with(LOOP_STARTED)
    }

    pub fn is_executing(&self) -> bool {
        self.message == EXECUTING_TASK
    }

    pub fn is_failure(&self) -> bool {
        self.message == TASK_FAILED
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.message
        )
    }
}

/// Errors when reading a poller line back
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LogParseError {
    #[error("line does not start with a bracketed timestamp")]
    MissingTimestamp,

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}

impl FromStr for LogEntry {
    type Err = LogParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let rest = line
            .strip_prefix('[')
            .ok_or(LogParseError::MissingTimestamp)?;
        let (stamp, message) = rest
            .split_once(']')
            .ok_or(LogParseError::MissingTimestamp)?;

        let timestamp = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT)
            .map_err(|_| LogParseError::InvalidTimestamp(stamp.to_string()))?;

        Ok(Self {
            timestamp,
            message: message.strip_prefix(' ').unwrap_or(message).to_string(),
        })
    }
}

/// One physical line of the run log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine {
    /// Written by the poller
    Entry(LogEntry),
    /// Forwarded from the task's stdout or stderr
    Output(String),
}

impl LogLine {
    /// Classifies a line. Never fails: unparseable lines are task output.
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        match line.parse::<LogEntry>() {
            Ok(entry) => LogLine::Entry(entry),
            Err(_) => LogLine::Output(line.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_entry_display() {
        let entry = LogEntry::executing(ts(9, 5, 0));
        assert_eq!(entry.to_string(), "[2025-03-14 09:05:00] Executing task...");

        let entry = LogEntry::loop_started(ts(9, 0, 0), 300);
        assert_eq!(
            entry.to_string(),
            "[2025-03-14 09:00:00] Loop started (interval: 300s)"
        );
    }

    #[test]
    fn test_entry_parse() {
        let entry: LogEntry = "[2025-03-14 23:59:59] ERROR during task execution"
            .parse()
            .unwrap();
        assert_eq!(entry.timestamp, ts(23, 59, 59));
        assert!(entry.is_failure());
        assert!(!entry.is_executing());
    }

    #[test]
    fn test_entry_parse_errors() {
        assert_eq!(
            "Traceback (most recent call last):".parse::<LogEntry>(),
            Err(LogParseError::MissingTimestamp)
        );
        assert_eq!(
            "[not a date] hello".parse::<LogEntry>(),
            Err(LogParseError::InvalidTimestamp("not a date".to_string()))
        );
        assert_eq!(
            "[2025-03-14 10:00:00 no closing".parse::<LogEntry>(),
            Err(LogParseError::MissingTimestamp)
        );
    }

    #[test]
    fn test_line_classification() {
        assert_eq!(
            LogLine::parse("[2025-03-14 10:00:00] Executing task...\n"),
            LogLine::Entry(LogEntry::executing(ts(10, 0, 0)))
        );
        assert_eq!(
            LogLine::parse("[worker] 39 signals written"),
            LogLine::Output("[worker] 39 signals written".to_string())
        );
    }

    #[test]
    fn test_loop_start_detection() {
        let entry = LogEntry::loop_started(ts(8, 0, 0), 60);
        assert!(entry.is_loop_start());
        assert!(!LogEntry::executing(ts(8, 0, 0)).is_loop_start());
    }
}
