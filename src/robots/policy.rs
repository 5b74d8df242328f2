//! Lazily loaded robots.txt policy for one crawl session

use crate::events::{CrawlEvent, CrawlEventKind, CrawlListener};
use crate::robots::{fetch_robots, RobotsRules};
use crate::url::Address;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

/// A site's robots.txt rules, fetched on first use and fixed afterwards
///
/// The first call to `is_allowed` or `crawl_delay` fetches and parses the rules;
/// every later call reuses them. A failed fetch yields `RobotsRules::allow_all()`
/// and is never retried within the session.
pub struct RobotsPolicy {
    client: Client,
    robots_url: Address,
    base: Address,
    user_agent: String,
    listener: Arc<dyn CrawlListener>,
    rules: OnceCell<RobotsRules>,
}

impl RobotsPolicy {
    /// Creates a policy that will fetch `robots_url` on first use
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client carrying the session's fixed headers
    /// * `robots_url` - Location of the rules
    /// * `base` - Site base address that disallowed paths resolve against
    /// * `user_agent` - This crawler's agent string, matched against `user-agent` lines
    /// * `listener` - Receives the load outcome
    pub fn new(
        client: Client,
        robots_url: Address,
        base: Address,
        user_agent: impl Into<String>,
        listener: Arc<dyn CrawlListener>,
    ) -> Self {
        Self {
            client,
            robots_url,
            base,
            user_agent: user_agent.into(),
            listener,
            rules: OnceCell::new(),
        }
    }

    /// Checks if an address may be fetched, loading the rules if needed
    pub async fn is_allowed(&self, address: &Address) -> bool {
        self.rules().await.is_allowed(address)
    }

    /// Delay between requests, loading the rules if needed
    pub async fn crawl_delay(&self) -> Duration {
        self.rules().await.crawl_delay()
    }

    /// The rules, if they have been loaded already
    pub fn loaded(&self) -> Option<&RobotsRules> {
        self.rules.get()
    }

    pub fn robots_url(&self) -> &Address {
        &self.robots_url
    }

    async fn rules(&self) -> &RobotsRules {
        self.rules.get_or_init(|| self.load()).await
    }

    async fn load(&self) -> RobotsRules {
        tracing::debug!("Reading {}", self.robots_url);

        match fetch_robots(&self.client, &self.robots_url).await {
            Ok(content) => {
                let rules = RobotsRules::parse(&content, &self.user_agent, &self.base);
                self.notify(CrawlEventKind::RobotsLoaded {
                    robots_url: self.robots_url.clone(),
                    disallowed: rules.disallowed().len(),
                    crawl_delay_ms: rules.crawl_delay().as_millis() as u64,
                });
                rules
            }
            Err(e) => {
                tracing::warn!("Could not read {}: {}", self.robots_url, e);
                self.notify(CrawlEventKind::RobotsUnavailable {
                    robots_url: self.robots_url.clone(),
                    reason: e.to_string(),
                });
                RobotsRules::allow_all()
            }
        }
    }

    fn notify(&self, kind: CrawlEventKind) {
        self.listener.on_event(&CrawlEvent::new(kind));
    }
}
