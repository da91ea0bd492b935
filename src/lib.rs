//! feedcache library
//!
//! Retrieves an image feed from a remote endpoint and keeps a local cache of
//! it with a staleness policy and delete-then-insert replace semantics.

pub mod cache;
pub mod cli;
pub mod data;
pub mod error;
pub mod logging;

pub use cache::{FeedStore, LocalFeedLoader};
pub use data::{FeedImage, FeedLoader, RemoteFeedLoader};
pub use error::FeedError;
