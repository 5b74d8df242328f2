//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with the session's fixed headers
//! - Address classification into link sets
//! - HTML parsing and link extraction
//! - The deduplicating frontier
//! - Session lifecycle and the crawl loop

mod classifier;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use classifier::{is_parseable, Classification, LinkClassifier};
pub use coordinator::{CrawlOutcome, Crawler};
pub use fetcher::{build_http_client, fetch_page, FetchResult};
pub use frontier::Frontier;
pub use parser::{extract_links, LinkExtractor, MalformedReference};

use crate::config::Config;
use crate::events::CrawlListener;
use crate::url::Address;
use crate::SpiderError;
use std::sync::Arc;

/// Runs a complete crawl and waits for it to finish
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed` - Where the crawl starts
/// * `listener` - Receives every crawl event
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - The crawl finished or was stopped
/// * `Err(SpiderError)` - The session could not be created or export failed
pub async fn crawl(
    config: &Config,
    seed: Address,
    listener: Arc<dyn CrawlListener>,
) -> Result<CrawlOutcome, SpiderError> {
    Crawler::spawn(config, seed, listener)?.wait().await
}
