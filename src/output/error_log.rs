//! Run-wide failure log
//!
//! Every failed fetch attempt is appended here by whichever task observed it,
//! as is every category whose store could not be saved. The log is shared by
//! cloning the handle and flushed to disk once, at the end of the run.

use crate::storage::write_atomic;
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

/// What was being done when a failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fetching a URL
    Fetch,
    /// Persisting a category store
    Save,
}

/// One failed fetch attempt or store save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub at: DateTime<Utc>,
    pub kind: ErrorKind,
    /// The URL fetched, or the category saved
    pub target: String,
    /// 1-based attempt number; `None` when the request could not be issued at all
    pub attempt: Option<u32>,
    pub cause: String,
}

impl ErrorRecord {
    pub fn attempt(url: impl Into<String>, attempt: u32, cause: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            kind: ErrorKind::Fetch,
            target: url.into(),
            attempt: Some(attempt),
            cause: cause.into(),
        }
    }

    pub fn not_attempted(url: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            kind: ErrorKind::Fetch,
            target: url.into(),
            attempt: None,
            cause: cause.into(),
        }
    }

    pub fn save(category: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            kind: ErrorKind::Save,
            target: category.into(),
            attempt: None,
            cause: cause.into(),
        }
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = self.at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        match (self.kind, self.attempt) {
            (ErrorKind::Save, _) => write!(
                f,
                "{} Error saving category {}: {}",
                at, self.target, self.cause
            ),
            (ErrorKind::Fetch, Some(attempt)) => write!(
                f,
                "{} Error fetching {} (Attempt {}): {}",
                at, self.target, attempt, self.cause
            ),
            (ErrorKind::Fetch, None) => write!(
                f,
                "{} Error fetching {} (not attempted): {}",
                at, self.target, self.cause
            ),
        }
    }
}

/// Append-only, concurrently shared list of [`ErrorRecord`]s
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    entries: Arc<Mutex<Vec<ErrorRecord>>>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, record: ErrorRecord) {
        tracing::warn!("{}", record);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the entries recorded so far, in append order
    pub fn snapshot(&self) -> Vec<ErrorRecord> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Entries rendered as text lines
    pub fn lines(&self) -> Vec<String> {
        self.snapshot().iter().map(ToString::to_string).collect()
    }

    /// Writes one line per entry, replacing any previous log at `path`
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        let mut body = String::new();
        for line in self.lines() {
            body.push_str(&line);
            body.push('\n');
        }
        write_atomic(path, body.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_record_display() {
        let record = ErrorRecord::attempt("https://example.com/?page=2", 3, "HTTP 503");
        let line = record.to_string();
        assert!(line.ends_with("Error fetching https://example.com/?page=2 (Attempt 3): HTTP 503"));

        let record = ErrorRecord::not_attempted("::bad::", "relative URL without a base");
        assert!(record.to_string().contains("(not attempted)"));

        let record = ErrorRecord::save("a", "IO error on out/A.json: Is a directory");
        assert_eq!(record.kind, ErrorKind::Save);
        assert!(record
            .to_string()
            .ends_with("Error saving category a: IO error on out/A.json: Is a directory"));
    }

    #[test]
    fn test_clones_share_entries() {
        let log = ErrorLog::new();
        let other = log.clone();

        log.record(ErrorRecord::attempt("u1", 1, "timeout"));
        other.record(ErrorRecord::attempt("u1", 2, "timeout"));

        assert_eq!(log.len(), 2);
        assert_eq!(other.snapshot()[1].attempt, Some(2));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let log = ErrorLog::new();
        let record = ErrorRecord::attempt("u", 1, "boom");
        log.record(record.clone());
        log.record(record);
        assert_eq!(log.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_appends() {
        let log = ErrorLog::new();
        let mut tasks = Vec::new();
        for i in 0..16 {
            let log = log.clone();
            tasks.push(tokio::spawn(async move {
                log.record(ErrorRecord::attempt(format!("u{}", i), 1, "x"));
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(log.len(), 16);
    }

    #[test]
    fn test_write_overwrites_previous_log() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("error_log.txt");
        std::fs::write(&path, "stale line\nanother\n").unwrap();

        let log = ErrorLog::new();
        log.record(ErrorRecord::attempt("u", 1, "boom"));
        log.write_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(!content.contains("stale"));
    }

    #[test]
    fn test_empty_log_writes_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("error_log.txt");

        ErrorLog::new().write_to(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
