use crate::events::CrawlEvent;
use tokio::sync::mpsc::UnboundedSender;

/// Receives crawl events
///
/// Called synchronously from the crawl worker, so implementations must return
/// quickly; anything slow belongs behind a channel (see `ChannelListener`).
pub trait CrawlListener: Send + Sync {
    fn on_event(&self, event: &CrawlEvent);
}

/// Forwards events to `tracing`
///
/// Lifecycle milestones are logged at info level, per-address events at debug.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingListener;

impl CrawlListener for TracingListener {
    fn on_event(&self, event: &CrawlEvent) {
        if event.is_milestone() {
            tracing::info!("{}", event.message());
        } else {
            tracing::debug!("{}", event.message());
        }
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl CrawlListener for NoopListener {
    fn on_event(&self, _event: &CrawlEvent) {}
}

/// Sends every event over an unbounded tokio channel
///
/// Events sent after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    sender: UnboundedSender<CrawlEvent>,
}

impl ChannelListener {
    pub fn new(sender: UnboundedSender<CrawlEvent>) -> Self {
        Self { sender }
    }
}

impl CrawlListener for ChannelListener {
    fn on_event(&self, event: &CrawlEvent) {
        let _ = self.sender.send(event.clone());
    }
}
