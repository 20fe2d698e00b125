//! Crawler module for paginated category harvesting
//!
//! This module contains the fetch-retry-resume engine, including:
//! - Process-wide admission control
//! - HTTP fetching with retries
//! - Record extraction and last-page discovery
//! - Per-category page scheduling with incremental persistence
//! - Overall run orchestration

mod coordinator;
mod fetcher;
mod headers;
mod limiter;
mod parser;
mod scheduler;
mod target;

pub use coordinator::{run_harvest, CategoryOrchestrator};
pub use fetcher::{
    build_http_client, AttemptFailure, FetchError, FetchPolicy, RawDocument, RetryingFetcher,
};
pub use headers::{HeaderSource, StaticHeaders, UserAgentRotation};
pub use limiter::{Permit, RateLimiter};
pub use parser::{HtmlRecordExtractor, LastPageDiscovery, PageExtractor, PaginationDiscovery};
pub use scheduler::{CategoryRun, PageJobScheduler};
pub use target::TargetSite;
