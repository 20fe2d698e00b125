//! JSON file storage implementation
//!
//! One pretty-printed JSON document per category, keyed by page number.
//! Saves go through a sibling temp file that is renamed over the target.

use crate::storage::traits::{CategoryRepository, StorageError, StorageResult};
use crate::storage::{Category, CategoryStore};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// File-per-category store backend
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    directory: PathBuf,
}

impl JsonFileStore {
    /// Creates a store rooted at `directory`
    ///
    /// The directory is created on first save.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the store file for a category
    pub fn path_for(&self, category: &Category) -> PathBuf {
        self.directory.join(format!("{}.json", category.file_stem()))
    }

    fn io_error(path: &Path, source: io::Error) -> StorageError {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl CategoryRepository for JsonFileStore {
    fn load(&self, category: &Category) -> StorageResult<CategoryStore> {
        let path = self.path_for(category);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No stored pages for category {}", category);
                return Ok(CategoryStore::new());
            }
            Err(e) => return Err(Self::io_error(&path, e)),
        };

        let store: CategoryStore =
            serde_json::from_str(&content).map_err(|source| StorageError::Serialization {
                path: path.clone(),
                source,
            })?;

        if store.contains(0) {
            return Err(StorageError::InvalidPage { path, page: 0 });
        }

        tracing::debug!(
            "Loaded {} stored pages for category {}",
            store.page_count(),
            category
        );
        Ok(store)
    }

    fn save(&self, category: &Category, store: &CategoryStore) -> StorageResult<()> {
        fs::create_dir_all(&self.directory).map_err(|e| Self::io_error(&self.directory, e))?;

        let path = self.path_for(category);
        let body =
            serde_json::to_vec_pretty(store).map_err(|source| StorageError::Serialization {
                path: path.clone(),
                source,
            })?;

        write_atomic(&path, &body).map_err(|e| Self::io_error(&path, e))
    }
}

/// Writes `body` to a sibling temp file and renames it over `path`
///
/// Readers see either the previous content or the new one, never a prefix.
pub(crate) fn write_atomic(path: &Path, body: &[u8]) -> io::Result<()> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let write_tmp = || -> io::Result<()> {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(body)?;
        file.sync_all()
    };
    if let Err(e) = write_tmp() {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    fs::rename(&tmp_path, path)
}
