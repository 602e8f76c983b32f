//! Run log service
//!
//! The run log is an append-only text file shared by the poller (timestamped
//! entries) and the task (raw stdout/stderr lines). Every append writes one
//! whole line with a single `write_all` on a file opened in append mode, so
//! killing the runner between appends never leaves a partial entry behind.

use cadence_core::domain::log::LogEntry;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Destination for run log lines
pub trait RunLog: Send + Sync {
    /// Appends a timestamped poller entry
    fn append(&self, entry: &LogEntry) -> io::Result<()>;

    /// Appends one raw line of task output
    fn append_output(&self, line: &str) -> io::Result<()>;
}

/// File-backed run log
#[derive(Debug)]
pub struct FileRunLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileRunLog {
    /// Opens (creating if needed) the log file in append mode
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&self, text: &str) -> io::Result<()> {
        let mut line = String::with_capacity(text.len() + 1);
        line.push_str(text);
        line.push('\n');

        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("run log lock poisoned"))?;
        file.write_all(line.as_bytes())?;
        file.flush()
    }
}

impl RunLog for FileRunLog {
    fn append(&self, entry: &LogEntry) -> io::Result<()> {
        self.write_line(&entry.to_string())
    }

    fn append_output(&self, line: &str) -> io::Result<()> {
        self.write_line(line)
    }
}

/// In-memory run log for tests
#[cfg(test)]
#[derive(Clone, Default)]
pub struct InMemoryRunLog {
    lines: std::sync::Arc<Mutex<Vec<String>>>,
}

#[cfg(test)]
impl InMemoryRunLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl RunLog for InMemoryRunLog {
    fn append(&self, entry: &LogEntry) -> io::Result<()> {
        self.lines.lock().unwrap().push(entry.to_string());
        Ok(())
    }

    fn append_output(&self, line: &str) -> io::Result<()> {
        self.lines.lock().unwrap().push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::domain::log::LogLine;
    use chrono::NaiveDate;

    #[test]
    fn test_file_log_appends_whole_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cron.log");
        let ts = NaiveDate::from_ymd_opt(2025, 2, 3)
            .unwrap()
            .and_hms_opt(4, 5, 6)
            .unwrap();

        let log = FileRunLog::open(&path).unwrap();
        log.append(&LogEntry::executing(ts)).unwrap();
        log.append_output("worker: 39 pairs processed").unwrap();
        log.append(&LogEntry::failed(ts)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "[2025-02-03 04:05:06] Executing task...\n\
             worker: 39 pairs processed\n\
             [2025-02-03 04:05:06] ERROR during task execution\n"
        );
        assert_eq!(log.path(), path.as_path());
    }

    #[test]
    fn test_file_log_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cron.log");
        std::fs::write(&path, "previous run\n").unwrap();

        let log = FileRunLog::open(&path).unwrap();
        log.append_output("next run").unwrap();
        drop(log);

        // Reopening appends again instead of truncating
        let log = FileRunLog::open(&path).unwrap();
        log.append_output("after restart").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "previous run\nnext run\nafter restart\n");
        assert!(content.lines().all(|l| matches!(LogLine::parse(l), LogLine::Output(_))));
    }

    #[test]
    fn test_open_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("cron.log");
        assert!(FileRunLog::open(path).is_err());
    }

    #[test]
    fn test_file_log_debug_shows_path() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileRunLog::open(dir.path().join("cron.log")).unwrap();
        assert!(format!("{:?}", log).contains("cron.log"));
    }

    #[test]
    fn test_in_memory_log() {
        let log = InMemoryRunLog::new();
        let shared = log.clone();
        log.append_output("hello").unwrap();
        assert_eq!(shared.lines(), vec!["hello".to_string()]);
    }
}
