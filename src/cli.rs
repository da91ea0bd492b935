//! Command-line interface parsing for feedcache
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! the `FeedConfig` used to build the loaders.

use std::path::PathBuf;
use std::time::Duration as StdDuration;

use chrono::Duration;
use clap::{ArgAction, Parser, Subcommand};
use url::Url;

use crate::cache::{default_cache_dir, CachePolicy, MAX_CACHE_AGE_DAYS};

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Largest accepted `--max-age-days` (about a century)
pub const MAX_AGE_DAYS_LIMIT: i64 = 36_500;

/// feedcache - fetch an image feed and keep a local cache of it
#[derive(Parser, Debug)]
#[command(name = "feedcache")]
#[command(about = "Fetch an image feed and serve it from a local cache")]
#[command(version)]
pub struct Cli {
    /// Directory holding the cached feed (defaults to the XDG cache dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Number of days a cached feed stays valid
    #[arg(
        long,
        global = true,
        value_name = "DAYS",
        default_value_t = MAX_CACHE_AGE_DAYS,
        value_parser = clap::value_parser!(i64).range(1..=MAX_AGE_DAYS_LIMIT)
    )]
    pub max_age_days: i64,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Download the feed and replace the local cache with it
    Fetch {
        /// Feed endpoint
        url: Url,

        /// Seconds before the request is abandoned
        #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,
    },
    /// Download the feed and print it without touching the cache
    Peek {
        /// Feed endpoint
        url: Url,
    },
    /// Print the cached feed if it is still valid
    Show,
    /// Delete the cached feed if it is stale or unreadable
    Validate,
}

/// Settings derived from CLI arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Explicit cache directory, if any
    pub cache_dir: Option<PathBuf>,
    /// Maximum age of a usable cached feed
    pub max_cache_age: Duration,
    /// Timeout applied to feed requests
    pub request_timeout: StdDuration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            max_cache_age: Duration::days(MAX_CACHE_AGE_DAYS),
            request_timeout: StdDuration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl FeedConfig {
    /// Creates a FeedConfig from parsed CLI arguments
    pub fn from_cli(cli: &Cli) -> Self {
        let request_timeout = match &cli.command {
            Command::Fetch { timeout_secs, .. } => StdDuration::from_secs(*timeout_secs),
            _ => StdDuration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Self {
            cache_dir: cli.cache_dir.clone(),
            max_cache_age: Duration::days(cli.max_age_days.clamp(1, MAX_AGE_DAYS_LIMIT)),
            request_timeout,
        }
    }

    /// The cache directory to use: the explicit one, else the XDG default
    pub fn resolve_cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir.clone().or_else(default_cache_dir)
    }

    /// The cache policy for `max_cache_age`
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy::new(self.max_cache_age)
    }
}
