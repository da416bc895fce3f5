use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CacheError;
use crate::models::Recommendation;

/// Application directory created under the per-user data directory
pub const APP_DIR_NAME: &str = "recommendations-feed";

/// File name of the cached recommendation snapshot
pub const CACHE_FILE_NAME: &str = "recommendations.json";

/// Durable store for the last ranked recommendation list
///
/// The file always holds a complete snapshot; every save replaces it.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    /// Creates a store whose cache file lives directly inside `dir`
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(CACHE_FILE_NAME),
        }
    }

    /// Creates a store under the platform's per-user data directory
    ///
    /// Returns `None` when the platform exposes no such directory.
    pub fn in_user_data_dir() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::new(dir.join(APP_DIR_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrites the cache file with `items`
    pub fn save(&self, items: &[Recommendation]) -> Result<(), CacheError> {
        let json = serde_json::to_vec_pretty(items).map_err(|e| self.write_failed(e))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.write_failed(e))?;
        }
        fs::write(&self.path, json).map_err(|e| self.write_failed(e))?;

        tracing::debug!(
            path = %self.path.display(),
            items = items.len(),
            "Recommendations cached"
        );
        Ok(())
    }

    /// Reads the cached snapshot, treating every failure as "nothing cached"
    pub fn load(&self) -> Option<Vec<Recommendation>> {
        match self.try_load() {
            Ok(items) => Some(items),
            Err(e) => {
                tracing::debug!(error = %e, "No usable recommendation cache");
                None
            }
        }
    }

    /// Reads the cached snapshot, reporting why it could not be used
    pub fn try_load(&self) -> Result<Vec<Recommendation>, CacheError> {
        let bytes = fs::read(&self.path).map_err(|e| self.read_failed(e))?;
        serde_json::from_slice(&bytes).map_err(|e| self.read_failed(e))
    }

    fn write_failed(&self, reason: impl ToString) -> CacheError {
        CacheError::WriteFailed {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    fn read_failed(&self, reason: impl ToString) -> CacheError {
        CacheError::ReadFailed {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}
