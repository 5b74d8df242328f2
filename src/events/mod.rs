//! Crawl events and observers
//!
//! The crawler reports progress through a `CrawlListener`. Every event is also a
//! "stats changed" notification: a listener that displays counters re-reads
//! `Crawler::stats()` when it receives one.

mod listener;

pub use listener::{ChannelListener, CrawlListener, NoopListener, TracingListener};

use crate::output::ExportReport;
use crate::state::Disposition;
use crate::url::Address;
use chrono::{DateTime, Utc};
use std::fmt;

/// What happened
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlEventKind {
    /// The background worker started draining the frontier
    Started { seed: Address },

    /// robots.txt was fetched and parsed
    RobotsLoaded {
        robots_url: Address,
        disallowed: usize,
        crawl_delay_ms: u64,
    },

    /// robots.txt could not be fetched; everything is allowed with no delay
    RobotsUnavailable { robots_url: Address, reason: String },

    /// A newly discovered address joined the frontier
    Enqueued { address: Address },

    /// The worker took an address off the frontier
    Processing { address: Address },

    /// An address landed in its link set
    Classified {
        address: Address,
        disposition: Disposition,
        detail: Option<String>,
    },

    /// An extracted reference could not be resolved and was dropped
    MalformedLink { page: Address, reference: String },

    /// Link files were written
    Exported { report: ExportReport },

    /// The frontier was exhausted
    Completed,

    /// The worker observed a stop request and exited without exporting
    Stopped,
}

/// A timestamped crawl event
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlEvent {
    pub at: DateTime<Utc>,
    pub kind: CrawlEventKind,
}

impl CrawlEvent {
    pub fn new(kind: CrawlEventKind) -> Self {
        Self {
            at: Utc::now(),
            kind,
        }
    }

    /// Human-readable log line for this event
    pub fn message(&self) -> String {
        match &self.kind {
            CrawlEventKind::Started { seed } => format!("Crawler started at {}", seed),
            CrawlEventKind::RobotsLoaded {
                robots_url,
                disallowed,
                crawl_delay_ms,
            } => format!(
                "Read {}: {} disallowed prefixes, crawl delay {}ms",
                robots_url, disallowed, crawl_delay_ms
            ),
            CrawlEventKind::RobotsUnavailable { robots_url, reason } => {
                format!("{} unavailable ({}), allowing everything", robots_url, reason)
            }
            CrawlEventKind::Enqueued { address } => format!("Adding to workload: {}", address),
            CrawlEventKind::Processing { address } => format!("Processing: {}", address),
            CrawlEventKind::Classified {
                address,
                disposition,
                detail,
            } => match detail {
                Some(detail) => format!("{} link ({}) - {}", disposition, detail, address),
                None => format!("{} link - {}", disposition, address),
            },
            CrawlEventKind::MalformedLink { page, reference } => {
                format!("Found malformed URL on {}: {}", page, reference)
            }
            CrawlEventKind::Exported { report } => format!(
                "Exported {} link files ({} skipped) to {}",
                report.written.len(),
                report.skipped.len(),
                report.directory.display()
            ),
            CrawlEventKind::Completed => "Completed crawling".to_string(),
            CrawlEventKind::Stopped => "Crawler stopped".to_string(),
        }
    }

    /// Returns true for events that deserve more than debug-level logging
    pub fn is_milestone(&self) -> bool {
        !matches!(
            self.kind,
            CrawlEventKind::Enqueued { .. }
                | CrawlEventKind::Processing { .. }
                | CrawlEventKind::Classified { .. }
        )
    }
}

impl fmt::Display for CrawlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.at.format("%H:%M:%S"), self.message())
    }
}
