//! Robots.txt parser implementation
//!
//! The dialect understood here is deliberately small: `user-agent`, `disallow` and
//! `crawl-delay`, matched case-insensitively, with plain path-prefix matching and
//! no wildcard or `allow` support.

use crate::url::Address;
use std::time::Duration;

const USER_AGENT_ENTRY: &str = "user-agent:";
const DISALLOW_ENTRY: &str = "disallow:";
const CRAWL_DELAY_ENTRY: &str = "crawl-delay:";
const WILDCARD_AGENT: &str = "*";

/// Exclusion rules that apply to this crawler
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RobotsRules {
    /// Disallowed path prefixes, resolved against the site's base address
    disallowed: Vec<Address>,

    /// Delay between consecutive requests
    crawl_delay: Duration,
}

impl RobotsRules {
    /// Rules that allow everything with no delay
    ///
    /// This is used when robots.txt cannot be fetched.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Parses robots.txt content
    ///
    /// Each line is trimmed and lower-cased. A `user-agent` line decides whether the
    /// directives that follow apply: they do when the declared agent equals
    /// `user_agent` or is `*`. Directives before the first `user-agent` line are
    /// ignored.
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    /// * `user_agent` - This crawler's identifying agent string
    /// * `base` - The site's base address, used to resolve disallowed paths
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use webspider::robots::RobotsRules;
    /// use webspider::url::Address;
    ///
    /// let base = Address::parse("http://example.test/").unwrap();
    /// let rules = RobotsRules::parse("User-agent: *\nCrawl-delay: 2\nDisallow: /private/", "webspider/1.0", &base);
    ///
    /// assert_eq!(rules.crawl_delay(), Duration::from_millis(2000));
    /// assert!(!rules.is_allowed(&base.resolve("/private/page").unwrap()));
    /// ```
    pub fn parse(content: &str, user_agent: &str, base: &Address) -> Self {
        let own_agent = user_agent.trim().to_lowercase();
        let mut rules = Self::default();
        let mut applies_to_me = false;

        for raw in content.lines() {
            let line = strip_comment(raw).trim().to_lowercase();

            if let Some(agent) = line.strip_prefix(USER_AGENT_ENTRY) {
                let agent = agent.trim();
                applies_to_me = agent == own_agent || agent == WILDCARD_AGENT;
            } else if let Some(value) = line.strip_prefix(DISALLOW_ENTRY) {
                if applies_to_me {
                    rules.record_disallow(value.trim(), base);
                }
            } else if let Some(value) = line.strip_prefix(CRAWL_DELAY_ENTRY) {
                if applies_to_me {
                    rules.record_crawl_delay(value.trim());
                }
            }
        }

        rules
    }

    fn record_disallow(&mut self, value: &str, base: &Address) {
        // An empty disallow allows everything
        if value.is_empty() {
            return;
        }

        let path = match value.strip_suffix('/') {
            Some("") | None => value,
            Some(stripped) => stripped,
        };

        match base.resolve(path) {
            Ok(address) => {
                if !self.disallowed.contains(&address) {
                    tracing::trace!("robots.txt disallows {}", address);
                    self.disallowed.push(address);
                }
            }
            Err(e) => tracing::warn!("Ignoring unresolvable disallow '{}': {}", value, e),
        }
    }

    fn record_crawl_delay(&mut self, value: &str) {
        match value.parse::<f64>() {
            Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => {
                self.crawl_delay = Duration::from_millis((seconds * 1000.0) as u64);
            }
            _ => tracing::warn!("Ignoring invalid crawl-delay '{}'", value),
        }
    }

    /// Checks if an address may be fetched
    ///
    /// Returns false iff the address's path starts with any disallowed path.
    pub fn is_allowed(&self, address: &Address) -> bool {
        !self
            .disallowed
            .iter()
            .any(|disallowed| address.path().starts_with(disallowed.path()))
    }

    /// Delay to wait between consecutive requests (zero when unspecified)
    pub fn crawl_delay(&self) -> Duration {
        self.crawl_delay
    }

    /// The disallowed prefixes, in the order they were declared
    pub fn disallowed(&self) -> &[Address] {
        &self.disallowed
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(index) => &line[..index],
        None => line,
    }
}
