//! In-memory feed store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::store::{CachedFeed, FeedStore, LocalFeedImage, StoreError};

/// A `FeedStore` keeping its single record in memory
///
/// Operations are serialized by an async mutex.
#[derive(Debug, Default)]
pub struct InMemoryFeedStore {
    slot: Mutex<Option<CachedFeed>>,
}

impl InMemoryFeedStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `cache`
    pub fn with_cache(cache: CachedFeed) -> Self {
        Self {
            slot: Mutex::new(Some(cache)),
        }
    }
}

#[async_trait]
impl FeedStore for InMemoryFeedStore {
    async fn delete_cached_feed(&self) -> Result<(), StoreError> {
        self.slot.lock().await.take();
        Ok(())
    }

    async fn insert(
        &self,
        feed: Vec<LocalFeedImage>,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        *self.slot.lock().await = Some(CachedFeed::new(feed, timestamp));
        Ok(())
    }

    async fn retrieve(&self) -> Result<Option<CachedFeed>, StoreError> {
        Ok(self.slot.lock().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;
    use uuid::Uuid;

    fn local_image() -> LocalFeedImage {
        LocalFeedImage {
            id: Uuid::new_v4(),
            description: None,
            location: Some("a location".to_string()),
            url: Url::parse("https://any-url.com").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_retrieve_delivers_empty_on_empty_store() {
        let store = InMemoryFeedStore::new();

        let result = store.retrieve().await.expect("Retrieve should succeed");

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_retrieve_delivers_inserted_values() {
        let store = InMemoryFeedStore::new();
        let feed = vec![local_image(), local_image()];
        let timestamp = Utc::now();

        store.insert(feed.clone(), timestamp).await.unwrap();
        let cached = store.retrieve().await.unwrap();

        assert_eq!(cached, Some(CachedFeed::new(feed, timestamp)));
    }

    #[tokio::test]
    async fn test_delete_on_empty_store_succeeds() {
        let store = InMemoryFeedStore::new();

        assert!(store.delete_cached_feed().await.is_ok());
        assert!(store.retrieve().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_empties_previously_inserted_cache() {
        let store = InMemoryFeedStore::with_cache(CachedFeed::new(vec![local_image()], Utc::now()));

        store.delete_cached_feed().await.unwrap();

        assert!(store.retrieve().await.unwrap().is_none());
    }
}
