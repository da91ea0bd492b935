//! File-backed feed store
//!
//! Persists the cached feed as a single JSON file in an XDG-compliant cache
//! directory. Inserts write a temporary file and rename it over the target so
//! a reader never observes a half-written record.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;

use super::store::{CachedFeed, FeedStore, LocalFeedImage, StoreError};

/// Name of the file holding the cached feed
const CACHE_FILE_NAME: &str = "feed.json";

/// Name of the scratch file used while inserting
const TEMP_FILE_NAME: &str = "feed.json.tmp";

/// Wrapper struct for the record stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    /// The cached images
    feed: Vec<LocalFeedImage>,
    /// When the feed was cached
    cached_at: DateTime<Utc>,
}

/// Returns the default cache directory
///
/// Uses `~/.cache/feedcache/` on Linux, or the equivalent path on other
/// platforms. Returns `None` if no home directory can be determined.
pub fn default_cache_dir() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "feedcache")?;
    Some(project_dirs.cache_dir().to_path_buf())
}

/// A `FeedStore` persisting its record to a JSON file
#[derive(Debug)]
pub struct FileFeedStore {
    /// Directory where the cache file is stored
    cache_dir: PathBuf,
    /// Serializes file operations issued through this store
    lock: Mutex<()>,
}

impl FileFeedStore {
    /// Creates a store in the default cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined.
    pub fn new() -> Option<Self> {
        default_cache_dir().map(Self::with_dir)
    }

    /// Creates a store in a custom cache directory
    ///
    /// The directory is created on first insert.
    pub fn with_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the file holding the cached feed
    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILE_NAME)
    }

    fn temp_path(&self) -> PathBuf {
        self.cache_dir.join(TEMP_FILE_NAME)
    }
}

/// Removes `path`, treating a missing file as success
async fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path).await {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[async_trait]
impl FeedStore for FileFeedStore {
    async fn delete_cached_feed(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        remove_if_exists(&self.cache_path()).await?;
        Ok(())
    }

    async fn insert(
        &self,
        feed: Vec<LocalFeedImage>,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;

        let entry = CacheEntry {
            feed,
            cached_at: timestamp,
        };
        let json = serde_json::to_vec_pretty(&entry)?;

        fs::create_dir_all(&self.cache_dir).await?;
        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, json).await {
            let _ = remove_if_exists(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp_path, self.cache_path()).await {
            let _ = remove_if_exists(&temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn retrieve(&self) -> Result<Option<CachedFeed>, StoreError> {
        let _guard = self.lock.lock().await;

        let content = match fs::read(self.cache_path()).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let entry: CacheEntry = serde_json::from_slice(&content)?;

        Ok(Some(CachedFeed::new(entry.feed, entry.cached_at)))
    }
}
