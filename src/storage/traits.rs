//! Storage traits and error types
//!
//! This module defines the trait interface for store backends and
//! associated error types.

use crate::storage::{Category, CategoryStore};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed store file {path}: {source}")]
    Serialization {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Store file {path} contains invalid page index {page}")]
    InvalidPage { path: PathBuf, page: u32 },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for category store backends
///
/// A store is loaded and saved as a whole. Implementations must never leave
/// a half-written store behind: after a failed `save` the previously saved
/// store must still load.
pub trait CategoryRepository: Send + Sync {
    /// Loads the store of a category
    ///
    /// A category that was never saved yields an empty store.
    fn load(&self, category: &Category) -> StorageResult<CategoryStore>;

    /// Replaces the persisted store of a category
    fn save(&self, category: &Category, store: &CategoryStore) -> StorageResult<()>;
}
