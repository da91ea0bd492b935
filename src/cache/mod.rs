//! Local feed cache
//!
//! This module contains the store contract, the staleness policy, the loader
//! that orchestrates saves and loads on top of a store, and two store
//! implementations: one in memory and one backed by a JSON file on disk.

mod file;
mod local;
mod memory;
mod policy;
mod store;

pub use file::{default_cache_dir, FileFeedStore};
pub use local::{CurrentDate, LocalFeedError, LocalFeedLoader};
pub use memory::InMemoryFeedStore;
pub use policy::{is_valid, CachePolicy, MAX_CACHE_AGE_DAYS};
pub use store::{CachedFeed, FeedStore, LocalFeedImage, StoreError};
