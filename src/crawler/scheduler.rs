//! Page job scheduler for one category
//!
//! This module handles:
//! - Loading the category's stored pages and computing the resume frontier
//! - Spawning one fetch job per outstanding page
//! - Merging completed pages into the store and persisting it after each one
//!
//! Jobs run concurrently, bounded only by the fetcher's rate limiter. Their
//! results are consumed one at a time by the scheduling task, which is the
//! only writer of the store and of its file.

use crate::crawler::fetcher::RetryingFetcher;
use crate::crawler::headers::HeaderSource;
use crate::crawler::parser::PageExtractor;
use crate::crawler::target::TargetSite;
use crate::storage::{Category, CategoryRepository, CategoryStore, StorageError};
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Outcome of scheduling one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRun {
    /// The fully merged store, as persisted
    pub store: CategoryStore,
    /// Pages completed and persisted by this run
    pub pages_fetched: usize,
    /// Pages abandoned by this run; they stay absent from the store
    pub pages_failed: usize,
}

/// Drives the page fetches of a category
#[derive(Clone)]
pub struct PageJobScheduler {
    fetcher: RetryingFetcher,
    site: Arc<TargetSite>,
    headers: Arc<dyn HeaderSource>,
    extractor: Arc<dyn PageExtractor>,
    repository: Arc<dyn CategoryRepository>,
}

impl PageJobScheduler {
    pub fn new(
        fetcher: RetryingFetcher,
        site: Arc<TargetSite>,
        headers: Arc<dyn HeaderSource>,
        extractor: Arc<dyn PageExtractor>,
        repository: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            fetcher,
            site,
            headers,
            extractor,
            repository,
        }
    }

    /// Pages a run must fetch given the stored pages and the last page
    ///
    /// Starts at the resume frontier (highest stored page plus one). Missing
    /// pages below the frontier are not included.
    pub fn pending_pages(store: &CategoryStore, last_page: u32) -> RangeInclusive<u32> {
        store.resume_frontier()..=last_page
    }

    /// Fetches every outstanding page of `category` up to `last_page`
    ///
    /// Failed pages are logged and left out of the store. Only persistence
    /// errors are returned; they abort the category.
    pub async fn run(&self, category: &Category, last_page: u32) -> Result<CategoryRun, StorageError> {
        let mut store = self.repository.load(category)?;
        let pending = Self::pending_pages(&store, last_page);

        let gaps = store.interior_gaps();
        if !gaps.is_empty() {
            tracing::warn!(
                "Category {} has {} missing page(s) below the resume point that will not be refetched (first: {})",
                category,
                gaps.len(),
                gaps[0]
            );
        }

        if pending.is_empty() {
            tracing::info!(
                "Category {} already complete up to page {}",
                category,
                last_page
            );
            return Ok(CategoryRun {
                store,
                pages_fetched: 0,
                pages_failed: 0,
            });
        }

        tracing::info!(
            "Category {}: fetching pages {}..={}",
            category,
            pending.start(),
            pending.end()
        );

        let mut jobs = JoinSet::new();
        for page in pending {
            let url = self.site.page_url(category, page).to_string();
            let headers = self.headers.headers();
            let fetcher = self.fetcher.clone();
            let extractor = Arc::clone(&self.extractor);

            jobs.spawn(async move {
                let outcome = fetcher
                    .fetch(&url, headers)
                    .await
                    .map(|document| extractor.extract(&document));
                (page, outcome)
            });
        }

        let mut pages_fetched = 0;
        let mut pages_failed = 0;

        while let Some(joined) = jobs.join_next().await {
            let (page, outcome) = match joined {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Page job for category {} died: {}", category, e);
                    pages_failed += 1;
                    continue;
                }
            };

            match outcome {
                Ok(records) => {
                    let count = records.len();
                    store.insert(page, records);
                    self.repository.save(category, &store)?;
                    pages_fetched += 1;
                    tracing::debug!(
                        "Category {} page {} persisted ({} records)",
                        category,
                        page,
                        count
                    );
                }
                Err(e) => {
                    pages_failed += 1;
                    tracing::warn!("Abandoning category {} page {}: {}", category, page, e);
                }
            }
        }

        tracing::info!(
            "Category {}: {} page(s) fetched, {} failed, {} stored",
            category,
            pages_fetched,
            pages_failed,
            store.page_count()
        );

        Ok(CategoryRun {
            store,
            pages_fetched,
            pages_failed,
        })
    }
}
