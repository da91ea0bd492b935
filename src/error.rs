//! Top-level error type for callers driving both loaders

use thiserror::Error;

use crate::cache::LocalFeedError;
use crate::data::{HttpClientError, RemoteFeedError};

/// Any failure surfaced while fetching, caching or reading the feed
#[derive(Debug, Error)]
pub enum FeedError {
    /// The remote feed could not be loaded
    #[error(transparent)]
    Remote(#[from] RemoteFeedError),

    /// The cached feed could not be read or written
    #[error(transparent)]
    Local(#[from] LocalFeedError),

    /// The HTTP client could not be built
    #[error(transparent)]
    Http(#[from] HttpClientError),

    /// No cache location is available
    #[error("No cache directory available; pass --cache-dir")]
    NoCacheDir,
}
