//! Pagesweep: a resumable paginated-category harvester
//!
//! This crate fetches every page of every category of a paginated site,
//! extracts records from each page, and persists them incrementally so that
//! an interrupted run picks up where it stopped.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Pagesweep operations
#[derive(Debug, Error)]
pub enum PagesweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

/// Result type alias for Pagesweep operations
pub type Result<T> = std::result::Result<T, PagesweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CategoryOrchestrator, PageJobScheduler, RateLimiter, RetryingFetcher};
pub use output::RunSummary;
pub use state::FetchState;
pub use storage::{Category, CategoryStore, Record};
