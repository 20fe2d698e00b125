//! Category orchestrator - main run logic
//!
//! Walks the categories in the order given. For each one it discovers the
//! last page from the category's overview, then hands the category to the
//! page job scheduler. Fetch failures are logged and never stop the run;
//! a category whose store cannot be saved is logged and abandoned while the
//! run moves on. The error log and the run summary are written once, when the
//! run ends.

use crate::config::{select_categories, Config};
use crate::crawler::fetcher::{build_http_client, FetchPolicy, RetryingFetcher};
use crate::crawler::headers::{HeaderSource, UserAgentRotation};
use crate::crawler::limiter::RateLimiter;
use crate::crawler::parser::{HtmlRecordExtractor, LastPageDiscovery, PaginationDiscovery};
use crate::crawler::scheduler::PageJobScheduler;
use crate::crawler::target::TargetSite;
use crate::output::{ArtifactPaths, ErrorLog, ErrorRecord, RunSummary};
use crate::storage::{Category, JsonFileStore};
use crate::PagesweepError;
use chrono::Utc;
use std::sync::Arc;

/// Runs every category of a harvest
pub struct CategoryOrchestrator {
    fetcher: RetryingFetcher,
    scheduler: PageJobScheduler,
    site: Arc<TargetSite>,
    headers: Arc<dyn HeaderSource>,
    discovery: Arc<dyn LastPageDiscovery>,
    artifacts: ArtifactPaths,
}

impl CategoryOrchestrator {
    pub fn new(
        fetcher: RetryingFetcher,
        scheduler: PageJobScheduler,
        site: Arc<TargetSite>,
        headers: Arc<dyn HeaderSource>,
        discovery: Arc<dyn LastPageDiscovery>,
        artifacts: ArtifactPaths,
    ) -> Self {
        Self {
            fetcher,
            scheduler,
            site,
            headers,
            discovery,
            artifacts,
        }
    }

    /// Wires up a run from configuration
    ///
    /// Creates the run's rate limiter and error log and passes them to every
    /// component that needs them.
    pub fn from_config(config: &Config) -> Result<Self, PagesweepError> {
        let errors = ErrorLog::new();
        let limiter = RateLimiter::new(config.fetcher.concurrency_limit as usize);
        let policy = FetchPolicy::from_config(&config.fetcher);
        let client = build_http_client(&policy)?;
        let fetcher = RetryingFetcher::new(client, limiter, policy, errors);

        let site = Arc::new(TargetSite::new(&config.target)?);
        let headers: Arc<dyn HeaderSource> =
            Arc::new(UserAgentRotation::from_config(&config.headers)?);
        let extractor = Arc::new(HtmlRecordExtractor::from_config(&config.selectors)?);
        let discovery = Arc::new(PaginationDiscovery::from_config(
            &config.selectors,
            site.page_param(),
        )?);
        let repository = Arc::new(JsonFileStore::new(&config.output.directory));

        let scheduler = PageJobScheduler::new(
            fetcher.clone(),
            Arc::clone(&site),
            Arc::clone(&headers),
            extractor,
            repository,
        );

        Ok(Self::new(
            fetcher,
            scheduler,
            site,
            headers,
            discovery,
            ArtifactPaths::from_config(&config.output),
        ))
    }

    pub fn error_log(&self) -> &ErrorLog {
        self.fetcher.error_log()
    }

    /// Fetches a category's overview and reads its last page number
    ///
    /// Returns `None` when the overview cannot be fetched or shows no
    /// pagination; both cases are logged.
    pub async fn discover_last_page(&self, category: &Category) -> Option<u32> {
        let url = self.site.overview_url(category).to_string();

        let document = match self.fetcher.fetch(&url, self.headers.headers()).await {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Skipping category {}: page count unavailable: {}", category, e);
                return None;
            }
        };

        let last_page = self.discovery.last_page(&document);
        match last_page {
            Some(last) => tracing::info!("Category {} has {} page(s)", category, last),
            None => tracing::info!("Skipping category {}: no pagination found", category),
        }
        last_page
    }

    /// Processes `categories` sequentially, in the order given
    ///
    /// Fetch failures are absorbed: they end up in the error log and the
    /// affected page or category is left for a later run. A storage failure
    /// abandons its category only; it is logged, the remaining categories
    /// still run, and the first such failure is returned once the error log
    /// and summary have been written.
    pub async fn run_all(&self, categories: &[Category]) -> Result<RunSummary, PagesweepError> {
        let started_at = Utc::now();
        let mut categories_processed = 0;
        let mut total_pages = 0;
        let mut pages_fetched = 0;
        let mut failure = None;

        for category in categories {
            let Some(last_page) = self.discover_last_page(category).await else {
                continue;
            };

            match self.scheduler.run(category, last_page).await {
                Ok(run) => {
                    categories_processed += 1;
                    total_pages += run.store.page_count();
                    pages_fetched += run.pages_fetched;
                }
                Err(e) => {
                    tracing::error!("Abandoning category {}: cannot persist store: {}", category, e);
                    self.error_log()
                        .record(ErrorRecord::save(category.key(), e.to_string()));
                    if failure.is_none() {
                        failure = Some(e);
                    }
                }
            }
        }

        let summary = RunSummary {
            categories_processed,
            total_pages,
            pages_fetched,
            errors: self.error_log().lines(),
            started_at,
            finished_at: Utc::now(),
        };

        self.write_artifacts(&summary)?;

        tracing::info!(
            "Run finished: {} categories, {} pages stored, {} fetched, {} errors in {}s",
            summary.categories_processed,
            summary.total_pages,
            summary.pages_fetched,
            summary.errors.len(),
            summary.duration().num_seconds()
        );

        match failure {
            Some(e) => Err(e.into()),
            None => Ok(summary),
        }
    }

    fn write_artifacts(&self, summary: &RunSummary) -> Result<(), PagesweepError> {
        for path in [&self.artifacts.error_log, &self.artifacts.summary] {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }

        self.error_log().write_to(&self.artifacts.error_log)?;
        summary.write_to(&self.artifacts.summary)?;
        Ok(())
    }
}

/// Runs the configured categories, or `only` when non-empty
///
/// # Example
///
/// ```no_run
/// use pagesweep::config::load_config;
/// use pagesweep::crawler::run_harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("pagesweep.toml"))?;
/// let summary = run_harvest(&config, &[]).await?;
/// println!("{} pages stored", summary.total_pages);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(config: &Config, only: &[String]) -> Result<RunSummary, PagesweepError> {
    let categories = select_categories(config, only)?;
    let orchestrator = CategoryOrchestrator::from_config(config)?;
    orchestrator.run_all(&categories).await
}
