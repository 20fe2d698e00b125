//! HTML extraction for fetched documents
//!
//! This module turns a fetched document into:
//! - The records listed on a page
//! - The highest page number referenced by a category's pagination
//!
//! Neither operation fails: a document that does not have the expected
//! shape simply yields no records, or no page count.

use crate::config::SelectorConfig;
use crate::crawler::fetcher::RawDocument;
use crate::storage::Record;
use crate::ConfigError;
use scraper::{Html, Selector};
use url::Url;

/// Turns one fetched document into records
pub trait PageExtractor: Send + Sync {
    /// An empty result means "no content on this page"
    fn extract(&self, document: &RawDocument) -> Vec<Record>;
}

/// Reads the last page number out of a category overview document
pub trait LastPageDiscovery: Send + Sync {
    fn last_page(&self, document: &RawDocument) -> Option<u32>;
}

fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}

/// Extracts `{text, href}` pairs from the links of a page's record container
///
/// Only the first element matching the container selector is read.
#[derive(Debug, Clone)]
pub struct HtmlRecordExtractor {
    container: Selector,
    link: Selector,
}

impl HtmlRecordExtractor {
    pub fn new(container: &str, link: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            container: parse_selector(container)?,
            link: parse_selector(link)?,
        })
    }

    pub fn from_config(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Self::new(&config.records_container, &config.record_link)
    }
}

impl PageExtractor for HtmlRecordExtractor {
    fn extract(&self, document: &RawDocument) -> Vec<Record> {
        if document.body.trim().is_empty() {
            return Vec::new();
        }

        let html = Html::parse_document(&document.body);
        let Some(container) = html.select(&self.container).next() else {
            tracing::debug!("No record container in {}", document.url);
            return Vec::new();
        };

        container
            .select(&self.link)
            .filter_map(|element| {
                let href = element.value().attr("href")?;
                let text = element.text().collect::<String>();
                Some(Record::new(text.trim(), href))
            })
            .collect()
    }
}

/// Finds the last page from the final pagination link's page parameter
#[derive(Debug, Clone)]
pub struct PaginationDiscovery {
    link: Selector,
    page_param: String,
}

impl PaginationDiscovery {
    pub fn new(link: &str, page_param: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            link: parse_selector(link)?,
            page_param: page_param.into(),
        })
    }

    pub fn from_config(
        config: &SelectorConfig,
        page_param: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Self::new(&config.pagination_link, page_param)
    }
}

impl LastPageDiscovery for PaginationDiscovery {
    fn last_page(&self, document: &RawDocument) -> Option<u32> {
        if document.body.trim().is_empty() {
            return None;
        }

        let html = Html::parse_document(&document.body);
        let href = html.select(&self.link).last()?.value().attr("href")?;

        // Pagination links are usually relative to the listing
        let target = match Url::parse(&document.url) {
            Ok(base) => base.join(href).ok()?,
            Err(_) => Url::parse(href).ok()?,
        };

        target
            .query_pairs()
            .find(|(key, _)| key == self.page_param.as_str())
            .and_then(|(_, value)| value.parse::<u32>().ok())
            .filter(|page| *page > 0)
    }
}
