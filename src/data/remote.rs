//! Remote feed loader
//!
//! Fetches the feed through an injected `HttpClient`, validates the status code
//! and payload, and maps the payload into `FeedImage` values.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use super::http::{HttpClient, HttpResponse};
use super::{FeedImage, FeedLoader};

/// The only status code accepted as a successful feed response
const OK_STATUS: u16 = 200;

/// Errors that can occur when loading the remote feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RemoteFeedError {
    /// The request never produced a usable response
    #[error("Could not reach the feed server")]
    Connectivity,

    /// A response was received but its status or payload is unusable
    #[error("The feed server returned invalid data")]
    InvalidData,
}

/// Feed payload: either a bare array or an `{"items": [...]}` envelope
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedPayload {
    List(Vec<RemoteFeedImage>),
    Envelope { items: Vec<RemoteFeedImage> },
}

impl FeedPayload {
    fn into_items(self) -> Vec<RemoteFeedImage> {
        match self {
            FeedPayload::List(items) | FeedPayload::Envelope { items } => items,
        }
    }
}

/// A single image record as it appears on the wire
#[derive(Debug, Deserialize)]
struct RemoteFeedImage {
    id: Uuid,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(rename = "image", alias = "imageURL", alias = "image_url")]
    image: Url,
}

impl From<RemoteFeedImage> for FeedImage {
    fn from(remote: RemoteFeedImage) -> Self {
        FeedImage::new(remote.id, remote.description, remote.location, remote.image)
    }
}

/// Validates a response and maps it into feed images
///
/// # Returns
/// * `Ok(Vec<FeedImage>)` in payload order when the status is 200 and the body parses
/// * `Err(RemoteFeedError::InvalidData)` otherwise
fn map(response: &HttpResponse) -> Result<Vec<FeedImage>, RemoteFeedError> {
    if response.status != OK_STATUS {
        warn!("Feed response had status {}", response.status);
        return Err(RemoteFeedError::InvalidData);
    }

    let payload: FeedPayload = serde_json::from_slice(&response.body).map_err(|e| {
        warn!("Feed payload did not match the expected schema: {}", e);
        RemoteFeedError::InvalidData
    })?;

    Ok(payload.into_items().into_iter().map(FeedImage::from).collect())
}

/// Loads the feed from a fixed URL
///
/// Every call to `load` issues its own request; nothing is cached or
/// de-duplicated at this layer.
#[derive(Clone)]
pub struct RemoteFeedLoader {
    url: Url,
    client: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for RemoteFeedLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteFeedLoader")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

impl RemoteFeedLoader {
    /// Creates a loader for `url` using the given HTTP capability
    ///
    /// Construction does not issue any request.
    pub fn new(url: Url, client: Arc<dyn HttpClient>) -> Self {
        Self { url, client }
    }

    /// The URL this loader requests
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetches and validates the feed
    ///
    /// # Returns
    /// * `Ok(Vec<FeedImage>)` - Images in payload order (possibly empty)
    /// * `Err(RemoteFeedError::Connectivity)` - If the client reported a transport failure
    /// * `Err(RemoteFeedError::InvalidData)` - If the status is not 200 or the payload is malformed
    pub async fn load(&self) -> Result<Vec<FeedImage>, RemoteFeedError> {
        debug!("Requesting feed from {}", self.url);

        let response = self.client.get(&self.url).await.map_err(|e| {
            warn!("Feed request to {} failed: {}", self.url, e);
            RemoteFeedError::Connectivity
        })?;

        let images = map(&response)?;
        debug!("Loaded {} feed images from {}", images.len(), self.url);
        Ok(images)
    }
}

#[async_trait]
impl FeedLoader for RemoteFeedLoader {
    type Error = RemoteFeedError;

    async fn load(&self) -> Result<Vec<FeedImage>, RemoteFeedError> {
        RemoteFeedLoader::load(self).await
    }
}
