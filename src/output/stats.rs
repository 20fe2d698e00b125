//! Statistics over persisted category stores
//!
//! Reads the store files only; no network access.

use crate::storage::{Category, CategoryRepository, StorageResult};

/// What is on disk for one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryStatistics {
    pub category: Category,
    pub pages: usize,
    pub records: usize,
    pub last_page: Option<u32>,
    /// Missing pages below the resume frontier; resumption will not revisit them
    pub gaps: Vec<u32>,
}

/// Loads statistics for each category, in the order given
pub fn load_statistics(
    repository: &dyn CategoryRepository,
    categories: &[Category],
) -> StorageResult<Vec<CategoryStatistics>> {
    categories
        .iter()
        .map(|category| {
            let store = repository.load(category)?;
            Ok(CategoryStatistics {
                category: category.clone(),
                pages: store.page_count(),
                records: store.record_count(),
                last_page: store.last_page(),
                gaps: store.interior_gaps(),
            })
        })
        .collect()
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &[CategoryStatistics]) {
    println!("=== Stored Pages ===\n");

    let mut total_pages = 0;
    let mut total_records = 0;

    for entry in stats {
        total_pages += entry.pages;
        total_records += entry.records;

        let last = entry
            .last_page
            .map_or_else(|| "-".to_string(), |p| p.to_string());
        println!(
            "  {:>4}: {:>6} pages, {:>8} records, last page {}",
            entry.category.key(),
            entry.pages,
            entry.records,
            last
        );

        if !entry.gaps.is_empty() {
            println!(
                "        {} gap(s) below resume point: {}",
                entry.gaps.len(),
                format_gaps(&entry.gaps)
            );
        }
    }

    println!();
    println!(
        "Total: {} pages, {} records across {} categories",
        total_pages,
        total_records,
        stats.len()
    );
}

/// Collapses sorted page numbers into ranges, e.g. `1-3, 7`
fn format_gaps(gaps: &[u32]) -> String {
    let mut parts = Vec::new();
    let mut iter = gaps.iter().copied().peekable();

    while let Some(start) = iter.next() {
        let mut end = start;
        while iter.peek() == Some(&(end + 1)) {
            end += 1;
            iter.next();
        }
        if start == end {
            parts.push(start.to_string());
        } else {
            parts.push(format!("{}-{}", start, end));
        }
    }

    parts.join(", ")
}
