//! Core feed data model
//!
//! This module contains the domain type for feed images and the remote side of
//! feed retrieval: the HTTP capability and the loader that validates responses.

pub mod http;
pub mod remote;

pub use http::{HttpClient, HttpClientError, HttpResponse, ReqwestHttpClient};
pub use remote::{RemoteFeedError, RemoteFeedLoader};

use async_trait::async_trait;
use url::Url;
use uuid::Uuid;

/// A single image in the feed
///
/// Identity is carried by `id`, but equality is structural: two images are
/// equal only if every field matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedImage {
    /// Unique identifier for the image
    pub id: Uuid,
    /// Optional caption
    pub description: Option<String>,
    /// Optional place name where the image was taken
    pub location: Option<String>,
    /// Where the image data can be downloaded from
    pub url: Url,
}

impl FeedImage {
    /// Creates a new feed image
    pub fn new(
        id: Uuid,
        description: Option<String>,
        location: Option<String>,
        url: Url,
    ) -> Self {
        Self {
            id,
            description,
            location,
            url,
        }
    }
}

/// A source of feed images
///
/// Implemented by both the remote and the local loader so callers can be
/// written against either one.
#[async_trait]
pub trait FeedLoader: Send + Sync {
    /// Error reported when the feed cannot be produced
    type Error: std::error::Error + Send + Sync + 'static;

    /// Loads the feed, preserving the source order
    async fn load(&self) -> Result<Vec<FeedImage>, Self::Error>;
}
