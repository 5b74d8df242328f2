//! Address classification
//!
//! Decides which link set an address belongs in. The checks run in a fixed order
//! and the first match wins:
//!
//! 1. Host differs from the crawl's base host: external, never fetched
//! 2. robots.txt disallows it: disallowed, never fetched
//! 3. The request fails before a response: dead
//! 4. Declared content type cannot hold links: non-parsable
//! 5. HTTP error status or unreadable body: dead
//! 6. Otherwise: local, and the body is handed on for link extraction

use crate::crawler::fetcher::{fetch_page, FetchResult};
use crate::robots::RobotsPolicy;
use crate::state::Disposition;
use crate::url::{is_same_host, Address};
use reqwest::Client;

/// The outcome of classifying one address
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    External,
    Disallowed,
    Dead { reason: String },
    NonParsable { content_type: String },
    Local { body: String },
}

impl Classification {
    pub fn disposition(&self) -> Disposition {
        match self {
            Self::External => Disposition::External,
            Self::Disallowed => Disposition::Disallowed,
            Self::Dead { .. } => Disposition::Dead,
            Self::NonParsable { .. } => Disposition::NonParsable,
            Self::Local { .. } => Disposition::Local,
        }
    }

    /// Short explanation for the event log, if there is one worth giving
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Dead { reason } => Some(reason.clone()),
            Self::NonParsable { content_type } => Some(content_type.clone()),
            _ => None,
        }
    }
}

/// Checks if a declared content type may contain links
///
/// A missing content type is treated as parseable. Otherwise the type must be
/// `text/*` and neither `text/javascript` nor `text/css`. Parameters such as
/// `; charset=utf-8` and letter case are ignored.
///
/// # Example
///
/// ```
/// use webspider::crawler::is_parseable;
///
/// assert!(is_parseable(Some("text/html; charset=utf-8")));
/// assert!(is_parseable(None));
/// assert!(!is_parseable(Some("text/css")));
/// assert!(!is_parseable(Some("image/png")));
/// ```
pub fn is_parseable(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return true;
    };

    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    media_type.starts_with("text/")
        && !media_type.starts_with("text/javascript")
        && !media_type.starts_with("text/css")
}

/// Classifies addresses for one crawl session
pub struct LinkClassifier {
    client: Client,
    base: Address,
    robots: RobotsPolicy,
}

impl LinkClassifier {
    /// Creates a classifier for the site rooted at `base`
    pub fn new(client: Client, base: Address, robots: RobotsPolicy) -> Self {
        Self {
            client,
            base,
            robots,
        }
    }

    pub fn base(&self) -> &Address {
        &self.base
    }

    pub fn robots(&self) -> &RobotsPolicy {
        &self.robots
    }

    /// Classifies an address, fetching it only if it is on-site and allowed
    pub async fn classify(&self, address: &Address) -> Classification {
        if !is_same_host(address, &self.base) {
            return Classification::External;
        }

        if !self.robots.is_allowed(address).await {
            return Classification::Disallowed;
        }

        match fetch_page(&self.client, address).await {
            FetchResult::Unreachable { error } => Classification::Dead { reason: error },
            FetchResult::NotParsable { content_type } => {
                Classification::NonParsable { content_type }
            }
            FetchResult::HttpError { status } => Classification::Dead {
                reason: format!("HTTP {}", status.as_u16()),
            },
            FetchResult::BodyError { error } => Classification::Dead { reason: error },
            FetchResult::Page { body, .. } => Classification::Local { body },
        }
    }
}
