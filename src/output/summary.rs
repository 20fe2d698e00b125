//! Run summary artifact
//!
//! Written once, as pretty JSON with camelCase keys, when a run ends.

use crate::storage::write_atomic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Aggregate counters of one run, produced once when the run ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Categories whose page count was discovered and whose pages were scheduled
    pub categories_processed: usize,

    /// Completed pages held in the stores of processed categories after the run
    pub total_pages: usize,

    /// Pages newly completed and persisted during this run
    pub pages_fetched: usize,

    /// Failure descriptions, one per failed attempt or category save
    pub errors: Vec<String>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    /// Writes the summary as pretty JSON, replacing any previous summary
    pub fn write_to(&self, path: &Path) -> Result<(), crate::PagesweepError> {
        let body = serde_json::to_vec_pretty(self)?;
        write_atomic(path, &body)?;
        Ok(())
    }

    /// Wall-clock duration of the run
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> RunSummary {
        let started_at = Utc::now();
        RunSummary {
            categories_processed: 2,
            total_pages: 7,
            pages_fetched: 3,
            errors: vec!["Error fetching u (Attempt 1): timeout".to_string()],
            started_at,
            finished_at: started_at + chrono::Duration::seconds(12),
        }
    }

    #[test]
    fn test_field_names() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["categoriesProcessed"], 2);
        assert_eq!(value["totalPages"], 7);
        assert_eq!(value["pagesFetched"], 3);
        assert_eq!(value["errors"].as_array().map(Vec::len), Some(1));
        assert!(value.get("startedAt").is_some());
    }

    #[test]
    fn test_write_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.json");
        let summary = sample();

        summary.write_to(&path).unwrap();

        let parsed: RunSummary =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, summary);
        assert_eq!(parsed.duration().num_seconds(), 12);
    }
}
