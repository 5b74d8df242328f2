//! Robots.txt handling module
//!
//! This module fetches and parses a site's robots.txt once per crawl session and
//! answers the two questions the crawler asks of it: may this address be fetched,
//! and how long to wait between requests.

mod parser;
mod policy;

pub use parser::RobotsRules;
pub use policy::RobotsPolicy;

use crate::url::Address;
use crate::SpiderError;
use reqwest::Client;

/// Well-known location of the exclusion rules, relative to the site root
pub const ROBOTS_PATH: &str = "/robots.txt";

/// Returns the default robots.txt address for a site
pub fn robots_url_for(base: &Address) -> Result<Address, SpiderError> {
    Ok(base.resolve(ROBOTS_PATH)?)
}

/// Fetches robots.txt content
///
/// # Arguments
///
/// * `client` - The session's HTTP client (carries the fixed request headers)
/// * `robots_url` - Where to fetch the rules from
///
/// # Returns
///
/// * `Ok(String)` - The body of a successful response
/// * `Err(SpiderError)` - Network failure or a non-success status
pub async fn fetch_robots(client: &Client, robots_url: &Address) -> Result<String, SpiderError> {
    let response = client
        .get(robots_url.as_str())
        .send()
        .await?
        .error_for_status()?;
    Ok(response.text().await?)
}
