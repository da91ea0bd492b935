//! Local feed loader
//!
//! Orchestrates saving, loading and validating the cached feed on top of a
//! `FeedStore`. Every operation is a short chain of store calls; no state is
//! shared between calls other than the store's single record.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use thiserror::Error;
use tokio::sync::oneshot;

use super::policy::CachePolicy;
use super::store::{FeedStore, LocalFeedImage, StoreError};
use crate::data::{FeedImage, FeedLoader};

/// Source of the current time
pub type CurrentDate = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Errors that can occur while reading or writing the cached feed
#[derive(Debug, Error)]
pub enum LocalFeedError {
    /// The store could not be read
    #[error("Failed to retrieve cached feed: {0}")]
    Retrieval(#[source] StoreError),

    /// The previous record could not be removed
    #[error("Failed to delete cached feed: {0}")]
    Deletion(#[source] StoreError),

    /// The new record could not be written
    #[error("Failed to insert feed into cache: {0}")]
    Insertion(#[source] StoreError),
}

fn to_local(feed: Vec<FeedImage>) -> Vec<LocalFeedImage> {
    feed.into_iter().map(LocalFeedImage::from).collect()
}

fn to_domain(feed: Vec<LocalFeedImage>) -> Vec<FeedImage> {
    feed.into_iter().map(FeedImage::from).collect()
}

/// Reads and writes the feed cache through a `FeedStore`
pub struct LocalFeedLoader {
    store: Arc<dyn FeedStore>,
    current_date: CurrentDate,
    policy: CachePolicy,
}

impl std::fmt::Debug for LocalFeedLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalFeedLoader")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl LocalFeedLoader {
    /// Creates a loader over `store` that reads the time from `current_date`
    ///
    /// Construction does not touch the store.
    pub fn new(
        store: Arc<dyn FeedStore>,
        current_date: impl Fn() -> DateTime<Utc> + Send + Sync + 'static,
    ) -> Self {
        Self {
            store,
            current_date: Arc::new(current_date),
            policy: CachePolicy::default(),
        }
    }

    /// Creates a loader over `store` using the system clock
    pub fn with_system_clock(store: Arc<dyn FeedStore>) -> Self {
        Self::new(store, Utc::now)
    }

    /// Replaces the default seven day policy
    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The policy applied when reading the cache
    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    fn now(&self) -> DateTime<Utc> {
        (self.current_date)()
    }

    /// Replaces the cached feed with `feed`, stamped with the current time
    ///
    /// The existing record is deleted first. If deletion fails the insert is
    /// never attempted.
    ///
    /// # Returns
    /// * `Ok(())` when both the deletion and the insertion succeeded
    /// * `Err(LocalFeedError::Deletion)` if the old record could not be removed
    /// * `Err(LocalFeedError::Insertion)` if the new record could not be written
    pub async fn save(&self, feed: Vec<FeedImage>) -> Result<(), LocalFeedError> {
        self.store.delete_cached_feed().await.map_err(|e| {
            warn!("Could not delete cached feed, skipping insert: {}", e);
            LocalFeedError::Deletion(e)
        })?;

        self.insert(feed).await
    }

    async fn insert(&self, feed: Vec<FeedImage>) -> Result<(), LocalFeedError> {
        let count = feed.len();
        let timestamp = self.now();

        self.store
            .insert(to_local(feed), timestamp)
            .await
            .map_err(LocalFeedError::Insertion)?;

        info!("Cached {} feed images at {}", count, timestamp);
        Ok(())
    }

    /// Runs `save` on a background task and delivers the result on a channel
    ///
    /// The task only holds a weak reference to the loader between store
    /// calls. If every other handle to the loader is dropped while the save is
    /// in flight, the insert is not issued and the sender is dropped without
    /// a value, so the receiver resolves to `Err(RecvError)`.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn spawn_save(
        loader: &Arc<Self>,
        feed: Vec<FeedImage>,
    ) -> oneshot::Receiver<Result<(), LocalFeedError>> {
        let (tx, rx) = oneshot::channel();
        let store = Arc::clone(&loader.store);
        let loader: Weak<Self> = Arc::downgrade(loader);

        tokio::spawn(async move {
            let deleted = store.delete_cached_feed().await;

            let Some(loader) = loader.upgrade() else {
                debug!("Feed loader dropped during cache deletion");
                return;
            };

            let result = match deleted {
                Ok(()) => loader.insert(feed).await,
                Err(e) => {
                    warn!("Could not delete cached feed, skipping insert: {}", e);
                    Err(LocalFeedError::Deletion(e))
                }
            };

            // The task may now hold the last strong handle; only deliver if
            // someone else still owns the loader.
            if Arc::strong_count(&loader) > 1 {
                let _ = tx.send(result);
            }
        });

        rx
    }

    /// Loads the cached feed if it is still valid
    ///
    /// An empty or stale cache yields an empty feed, not an error. Loading
    /// never modifies the store.
    ///
    /// # Returns
    /// * `Ok(Vec<FeedImage>)` - Cached images in saved order, or empty
    /// * `Err(LocalFeedError::Retrieval)` - If the store could not be read
    pub async fn load(&self) -> Result<Vec<FeedImage>, LocalFeedError> {
        let cached = self
            .store
            .retrieve()
            .await
            .map_err(LocalFeedError::Retrieval)?;

        match cached {
            Some(cache) if self.policy.validate(cache.timestamp, self.now()) => {
                debug!("Serving {} cached feed images", cache.feed.len());
                Ok(to_domain(cache.feed))
            }
            Some(cache) => {
                debug!("Cached feed from {} is stale", cache.timestamp);
                Ok(Vec::new())
            }
            None => Ok(Vec::new()),
        }
    }

    /// Deletes the cached feed when it is stale or unreadable
    ///
    /// A valid or absent cache is left untouched. The result only reports on
    /// this maintenance pass and never affects `load`.
    ///
    /// # Returns
    /// * `Ok(())` if nothing had to be deleted or the deletion succeeded
    /// * `Err(LocalFeedError::Deletion)` if a required deletion failed
    pub async fn validate_cache(&self) -> Result<(), LocalFeedError> {
        let should_delete = match self.store.retrieve().await {
            Err(e) => {
                warn!("Cached feed is unreadable, deleting it: {}", e);
                true
            }
            Ok(Some(cache)) if !self.policy.validate(cache.timestamp, self.now()) => {
                info!("Deleting stale cached feed from {}", cache.timestamp);
                true
            }
            Ok(_) => false,
        };

        if !should_delete {
            return Ok(());
        }

        self.store.delete_cached_feed().await.map_err(|e| {
            warn!("Cache validation could not delete the cached feed: {}", e);
            LocalFeedError::Deletion(e)
        })
    }
}

#[async_trait]
impl FeedLoader for LocalFeedLoader {
    type Error = LocalFeedError;

    async fn load(&self) -> Result<Vec<FeedImage>, LocalFeedError> {
        LocalFeedLoader::load(self).await
    }
}
