//! Cache staleness policy

use chrono::{DateTime, Duration, Utc};

/// Number of days a cached feed stays valid
pub const MAX_CACHE_AGE_DAYS: i64 = 7;

/// Returns whether a snapshot saved at `timestamp` is still usable at `now`
///
/// A snapshot exactly `max_age` old is stale. Timestamps in the future are
/// treated as valid.
pub fn is_valid(timestamp: DateTime<Utc>, now: DateTime<Utc>, max_age: Duration) -> bool {
    now - timestamp < max_age
}

/// Decides whether a cached snapshot may still be served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    max_age: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::new(Duration::days(MAX_CACHE_AGE_DAYS))
    }
}

impl CachePolicy {
    /// Creates a policy with a custom maximum age
    pub fn new(max_age: Duration) -> Self {
        Self { max_age }
    }

    /// The maximum age of a valid snapshot
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Applies `is_valid` with this policy's maximum age
    pub fn validate(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        is_valid(timestamp, now, self.max_age)
    }
}
