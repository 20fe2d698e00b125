//! Output module for run artifacts and reports
//!
//! This module handles:
//! - The run-wide error log, shared by all concurrent fetches
//! - The run summary written when a run ends
//! - Statistics over the persisted category stores

mod error_log;
pub mod stats;
mod summary;

pub use error_log::{ErrorKind, ErrorLog, ErrorRecord};
pub use stats::{load_statistics, print_statistics, CategoryStatistics};
pub use summary::RunSummary;

use std::path::{Path, PathBuf};

/// Locations of the per-run artifacts
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub error_log: PathBuf,
    pub summary: PathBuf,
}

impl ArtifactPaths {
    pub fn new(directory: &Path, error_log: &str, summary: &str) -> Self {
        Self {
            error_log: directory.join(error_log),
            summary: directory.join(summary),
        }
    }

    pub fn from_config(config: &crate::config::OutputConfig) -> Self {
        Self::new(
            Path::new(&config.directory),
            &config.error_log,
            &config.summary,
        )
    }
}
