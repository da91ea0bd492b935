//! feedcache - fetch an image feed and serve it from a local cache
//!
//! `fetch` downloads the feed and replaces the cache, `peek` downloads without
//! caching, `show` prints the cached feed while it is still valid and
//! `validate` removes a stale or unreadable cache.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::{info, warn};

use feedcache::cache::{FileFeedStore, LocalFeedLoader};
use feedcache::cli::{Cli, Command, FeedConfig};
use feedcache::data::{FeedLoader, ReqwestHttpClient, RemoteFeedLoader};
use feedcache::logging::init_logging;
use feedcache::{FeedError, FeedImage};
use url::Url;

fn remote_loader(url: Url, config: &FeedConfig) -> Result<RemoteFeedLoader, FeedError> {
    let client = ReqwestHttpClient::with_timeout(config.request_timeout)?;
    Ok(RemoteFeedLoader::new(url, Arc::new(client)))
}

fn local_loader(config: &FeedConfig) -> Result<LocalFeedLoader, FeedError> {
    let cache_dir = config.resolve_cache_dir().ok_or(FeedError::NoCacheDir)?;
    info!("Using cache directory {}", cache_dir.display());

    let store = FileFeedStore::with_dir(cache_dir);
    Ok(LocalFeedLoader::with_system_clock(Arc::new(store)).with_policy(config.cache_policy()))
}

fn print_image(image: &FeedImage) {
    println!(
        "{}  {}  {}  {}",
        image.id,
        image.url,
        image.description.as_deref().unwrap_or("-"),
        image.location.as_deref().unwrap_or("-"),
    );
}

/// Loads from any feed source and prints one line per image
async fn print_feed<L>(loader: &L, empty_message: &str) -> Result<(), FeedError>
where
    L: FeedLoader,
    FeedError: From<L::Error>,
{
    let feed = loader.load().await?;
    if feed.is_empty() {
        println!("{}", empty_message);
    }
    feed.iter().for_each(print_image);
    Ok(())
}

async fn run(cli: Cli) -> Result<(), FeedError> {
    let config = FeedConfig::from_cli(&cli);

    match cli.command {
        Command::Fetch { url, .. } => {
            let remote = remote_loader(url, &config)?;
            let local = local_loader(&config)?;

            let feed = remote.load().await?;
            let count = feed.len();
            local.save(feed).await?;
            println!("Cached {} images", count);
        }
        Command::Peek { url } => {
            let remote = remote_loader(url, &config)?;
            print_feed(&remote, "Feed is empty").await?;
        }
        Command::Show => {
            let local = local_loader(&config)?;
            print_feed(&local, "No cached feed").await?;
        }
        Command::Validate => {
            let local = local_loader(&config)?;
            match local.validate_cache().await {
                Ok(()) => println!("Cache validated"),
                // Maintenance failures are reported but do not fail the command
                Err(e) => warn!("Cache validation incomplete: {}", e),
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Failed to initialise logging: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
