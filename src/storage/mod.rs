//! Storage module for persisting harvested pages
//!
//! This module handles everything needed to resume an interrupted run:
//! - The in-memory page-indexed store of one category
//! - The repository trait that loads and saves a store as one durable unit
//! - A JSON file backend with atomic replacement

mod json;
mod traits;

pub use json::JsonFileStore;
pub(crate) use json::write_atomic;
pub use traits::{CategoryRepository, StorageError, StorageResult};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One independently paginated unit of work, e.g. a single letter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category(String);

impl Category {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as enumerated
    pub fn key(&self) -> &str {
        &self.0
    }

    /// File-system safe stem for this category's store file
    ///
    /// ASCII alphanumerics are upper-cased, every other byte is written as
    /// `_XX` (upper hex), so `*` becomes `_2A`.
    pub fn file_stem(&self) -> String {
        let mut stem = String::with_capacity(self.0.len());
        for ch in self.0.chars() {
            if ch.is_ascii_alphanumeric() {
                stem.push(ch.to_ascii_uppercase());
            } else {
                let mut buf = [0u8; 4];
                for byte in ch.encode_utf8(&mut buf).bytes() {
                    stem.push('_');
                    stem.push_str(&hex::encode_upper([byte]));
                }
            }
        }
        stem
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One record extracted from a page: a link text and its target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub text: String,
    pub href: String,
}

impl Record {
    pub fn new(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: href.into(),
        }
    }
}

/// Page-indexed results of one category
///
/// A key present means the page completed; a missing key means the page was
/// never fetched or failed and is still owed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryStore {
    pages: BTreeMap<u32, Vec<Record>>,
}

impl CategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the result of a completed page, replacing any previous value
    pub fn insert(&mut self, page: u32, records: Vec<Record>) -> Option<Vec<Record>> {
        debug_assert!(page > 0, "page indices are 1-based");
        self.pages.insert(page, records)
    }

    pub fn get(&self, page: u32) -> Option<&[Record]> {
        self.pages.get(&page).map(Vec::as_slice)
    }

    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains_key(&page)
    }

    /// Highest completed page, if any
    pub fn last_page(&self) -> Option<u32> {
        self.pages.keys().next_back().copied()
    }

    /// First page a run will fetch: highest completed page plus one
    ///
    /// Pages below the frontier are assumed complete and are never
    /// re-verified; see [`CategoryStore::missing_pages`] for the gaps this
    /// leaves behind.
    pub fn resume_frontier(&self) -> u32 {
        self.last_page().unwrap_or(0) + 1
    }

    /// Pages in `1..=upto` that have no completed entry
    pub fn missing_pages(&self, upto: u32) -> Vec<u32> {
        (1..=upto).filter(|page| !self.contains(*page)).collect()
    }

    /// Missing pages strictly below the resume frontier
    ///
    /// These are skipped by resumption.
    pub fn interior_gaps(&self) -> Vec<u32> {
        self.missing_pages(self.resume_frontier() - 1)
    }

    /// Completed page numbers in ascending order
    pub fn pages(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.keys().copied()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn record_count(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
