//! Feed store contract
//!
//! A `FeedStore` holds at most one `CachedFeed`. The local loader is the only
//! caller and is responsible for deleting before it inserts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::data::FeedImage;

/// Errors reported by store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing storage failed
    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stored record could not be encoded or decoded
    #[error("Cache record is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Any other store-specific failure
    #[error("{0}")]
    Other(String),
}

/// Cache representation of a feed image
///
/// Mirrors `FeedImage` field for field so the stored schema can change
/// without touching the public domain type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalFeedImage {
    pub id: Uuid,
    pub description: Option<String>,
    pub location: Option<String>,
    pub url: Url,
}

impl From<FeedImage> for LocalFeedImage {
    fn from(image: FeedImage) -> Self {
        Self {
            id: image.id,
            description: image.description,
            location: image.location,
            url: image.url,
        }
    }
}

impl From<LocalFeedImage> for FeedImage {
    fn from(local: LocalFeedImage) -> Self {
        FeedImage::new(local.id, local.description, local.location, local.url)
    }
}

/// The single snapshot a store holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedFeed {
    /// Images in the order they were saved
    pub feed: Vec<LocalFeedImage>,
    /// When the snapshot was saved
    pub timestamp: DateTime<Utc>,
}

impl CachedFeed {
    /// Creates a snapshot
    pub fn new(feed: Vec<LocalFeedImage>, timestamp: DateTime<Utc>) -> Self {
        Self { feed, timestamp }
    }
}

/// Storage capability for the cached feed
///
/// Implementations serialize their own operations. No ordering between
/// concurrent calls is promised by the contract.
#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Removes the cached feed, succeeding when there is nothing to remove
    async fn delete_cached_feed(&self) -> Result<(), StoreError>;

    /// Stores `feed` saved at `timestamp` as the only record
    ///
    /// Callers must delete any existing record first.
    async fn insert(
        &self,
        feed: Vec<LocalFeedImage>,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Returns the current record, or `None` when the store is empty
    async fn retrieve(&self) -> Result<Option<CachedFeed>, StoreError>;
}
