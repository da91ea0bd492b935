//! End-to-end tests wiring the remote loader into the local cache

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;
use tempfile::TempDir;
use url::Url;
use uuid::Uuid;

use feedcache::cache::{
    CachePolicy, FeedStore, FileFeedStore, InMemoryFeedStore, LocalFeedError, LocalFeedLoader,
};
use feedcache::data::{HttpClient, HttpClientError, HttpResponse, RemoteFeedLoader};
use feedcache::FeedLoader;

/// Answers every request with the same canned response
struct StubHttpClient {
    response: Mutex<Option<HttpResponse>>,
}

impl StubHttpClient {
    fn responding(status: u16, body: String) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(Some(HttpResponse::new(status, body))),
        })
    }

    fn offline() -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(None),
        })
    }
}

#[async_trait]
impl HttpClient for StubHttpClient {
    async fn get(&self, _url: &Url) -> Result<HttpResponse, HttpClientError> {
        self.response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| HttpClientError::Transport("offline".to_string()))
    }
}

fn feed_url() -> Url {
    Url::parse("https://feed.example.com/v1/feed").unwrap()
}

fn saved_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap()
}

fn max_age() -> Duration {
    CachePolicy::default().max_age()
}

fn three_item_payload() -> (Vec<Uuid>, String) {
    let ids = vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
    let body = json!([
        { "id": ids[0].to_string(), "image": "https://img.example.com/1.jpg" },
        { "id": ids[1].to_string(), "description": "pier", "image": "https://img.example.com/2.jpg" },
        { "id": ids[2].to_string(), "location": "harbour", "image": "https://img.example.com/3.jpg" },
    ]);
    (ids, body.to_string())
}

#[tokio::test]
async fn test_empty_store_loads_empty_feed() {
    let store = Arc::new(InMemoryFeedStore::new());
    let loader = LocalFeedLoader::new(store, saved_at);

    let feed = loader.load().await.expect("Empty store is not an error");

    assert!(feed.is_empty());
}

#[tokio::test]
async fn test_remote_feed_saved_then_loaded_before_expiry() {
    let (ids, body) = three_item_payload();
    let remote = RemoteFeedLoader::new(feed_url(), StubHttpClient::responding(200, body));
    let store: Arc<dyn FeedStore> = Arc::new(InMemoryFeedStore::new());

    let fetched = remote.load().await.expect("Remote load should succeed");
    LocalFeedLoader::new(store.clone(), saved_at)
        .save(fetched.clone())
        .await
        .expect("Save should succeed");

    let reader = LocalFeedLoader::new(store, || saved_at() + max_age() - Duration::seconds(1));
    let cached = reader.load().await.expect("Load should succeed");

    assert_eq!(cached, fetched);
    assert_eq!(cached.iter().map(|i| i.id).collect::<Vec<_>>(), ids);
}

#[tokio::test]
async fn test_cache_at_exact_expiry_loads_empty_feed() {
    let (_ids, body) = three_item_payload();
    let remote = RemoteFeedLoader::new(feed_url(), StubHttpClient::responding(200, body));
    let store: Arc<dyn FeedStore> = Arc::new(InMemoryFeedStore::new());

    let fetched = remote.load().await.unwrap();
    LocalFeedLoader::new(store.clone(), saved_at)
        .save(fetched)
        .await
        .unwrap();

    let reader = LocalFeedLoader::new(store.clone(), || saved_at() + max_age());
    assert!(reader.load().await.unwrap().is_empty());

    // Reading a stale cache does not delete it
    assert!(store.retrieve().await.unwrap().is_some());
}

#[tokio::test]
async fn test_file_store_persists_across_loader_instances() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let (_ids, body) = three_item_payload();
    let remote = RemoteFeedLoader::new(feed_url(), StubHttpClient::responding(200, body));
    let fetched = remote.load().await.unwrap();

    let writer = LocalFeedLoader::new(Arc::new(FileFeedStore::with_dir(temp_dir.path())), saved_at);
    writer.save(fetched.clone()).await.expect("Save should succeed");

    let reader = LocalFeedLoader::new(
        Arc::new(FileFeedStore::with_dir(temp_dir.path())),
        || saved_at() + Duration::days(1),
    );
    let cached = FeedLoader::load(&reader).await.expect("Load should succeed");

    assert_eq!(cached, fetched);
}

#[tokio::test]
async fn test_second_save_replaces_first() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store: Arc<dyn FeedStore> = Arc::new(FileFeedStore::with_dir(temp_dir.path()));
    let loader = LocalFeedLoader::new(store, saved_at);

    let (_, first_body) = three_item_payload();
    let first = RemoteFeedLoader::new(feed_url(), StubHttpClient::responding(200, first_body))
        .load()
        .await
        .unwrap();
    let second = RemoteFeedLoader::new(feed_url(), StubHttpClient::responding(200, "[]".to_string()))
        .load()
        .await
        .unwrap();

    loader.save(first).await.unwrap();
    loader.save(second).await.unwrap();

    assert!(loader.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_validate_cache_removes_expired_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = Arc::new(FileFeedStore::with_dir(temp_dir.path()));
    let (_, body) = three_item_payload();
    let feed = RemoteFeedLoader::new(feed_url(), StubHttpClient::responding(200, body))
        .load()
        .await
        .unwrap();
    LocalFeedLoader::new(store.clone(), saved_at)
        .save(feed)
        .await
        .unwrap();

    let later = LocalFeedLoader::new(store.clone(), || saved_at() + max_age());
    later.validate_cache().await.expect("Validation should succeed");

    assert!(!store.cache_path().exists());
}

#[tokio::test]
async fn test_validate_cache_removes_corrupt_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = Arc::new(FileFeedStore::with_dir(temp_dir.path()));
    std::fs::write(store.cache_path(), "{ not json").unwrap();
    let loader = LocalFeedLoader::new(store.clone(), saved_at);

    assert!(matches!(loader.load().await, Err(LocalFeedError::Retrieval(_))));

    loader.validate_cache().await.expect("Validation should succeed");

    assert!(loader.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_offline_remote_leaves_cache_untouched() {
    let store: Arc<dyn FeedStore> = Arc::new(InMemoryFeedStore::new());
    let (_, body) = three_item_payload();
    let original = RemoteFeedLoader::new(feed_url(), StubHttpClient::responding(200, body))
        .load()
        .await
        .unwrap();
    let loader = LocalFeedLoader::new(store, saved_at);
    loader.save(original.clone()).await.unwrap();

    let offline = RemoteFeedLoader::new(feed_url(), StubHttpClient::offline());
    assert!(offline.load().await.is_err());

    assert_eq!(loader.load().await.unwrap(), original);
}
