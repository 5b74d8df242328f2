//! Crawl controller - session lifecycle and the crawl loop
//!
//! A `Crawler` owns one crawl session: a seed, its frontier, the five link sets
//! and the site's robots policy. `start` spawns a single background task that
//! drains the frontier one address at a time:
//!
//! 1. Dequeue the oldest address
//! 2. Classify it, extracting and enqueuing links if it is a local page
//! 3. Record it in its link set
//! 4. Sleep for the robots crawl delay
//!
//! When the frontier runs dry the link sets are exported and the session goes
//! back to `Idle`. `stop` is cooperative: the worker notices it between
//! iterations, never mid-fetch, and exits without exporting.

use crate::config::{Config, OutputConfig};
use crate::crawler::classifier::{Classification, LinkClassifier};
use crate::crawler::fetcher::build_http_client;
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::LinkExtractor;
use crate::events::{CrawlEvent, CrawlEventKind, CrawlListener};
use crate::output::{export_link_sets, CrawlStats, ExportReport, LinkSets};
use crate::robots::{robots_url_for, RobotsPolicy};
use crate::state::{CrawlState, Disposition, SharedCrawlState};
use crate::url::Address;
use crate::{ConfigError, SpiderError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::task::JoinHandle;

/// How a crawl session ended
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlOutcome {
    /// The frontier was exhausted and the link sets were exported
    Completed { report: ExportReport },

    /// Stop was requested; nothing was exported
    Stopped,
}

/// Forwards events to the caller's listener and remembers the last line
struct StatusRecorder {
    inner: Arc<dyn CrawlListener>,
    last: RwLock<Option<String>>,
}

impl CrawlListener for StatusRecorder {
    fn on_event(&self, event: &CrawlEvent) {
        *self.last.write().unwrap_or_else(PoisonError::into_inner) = Some(event.to_string());
        self.inner.on_event(event);
    }
}

/// State shared between the `Crawler` handle and its worker task
struct Session {
    seed: Address,
    state: SharedCrawlState,
    started: AtomicBool,
    sets: Arc<LinkSets>,
    frontier: Frontier,
    classifier: LinkClassifier,
    output: OutputConfig,
    events: Arc<StatusRecorder>,
}

/// A single-site crawl session
pub struct Crawler {
    session: Arc<Session>,
    worker: Mutex<Option<JoinHandle<Result<CrawlOutcome, SpiderError>>>>,
}

impl Crawler {
    /// Creates an idle crawl session
    ///
    /// The site base is the root of the seed's scheme, host and port; robots.txt
    /// is looked up there unless `[crawler] robots-url` overrides it. Nothing is
    /// fetched until the session is started.
    ///
    /// # Arguments
    ///
    /// * `config` - Request headers, timeout, robots override and output settings
    /// * `seed` - The address the crawl starts from
    /// * `listener` - Receives every crawl event
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - An idle session
    /// * `Err(SpiderError)` - The HTTP client or robots address could not be built
    pub fn new(
        config: &Config,
        seed: Address,
        listener: Arc<dyn CrawlListener>,
    ) -> Result<Self, SpiderError> {
        let client = build_http_client(&config.request, config.crawler.request_timeout())?;
        let base = seed.resolve("/")?;
        let robots_url = match &config.crawler.robots_url {
            Some(url) => Address::parse(url)
                .map_err(|e| ConfigError::InvalidUrl(format!("robots-url {}: {}", url, e)))?,
            None => robots_url_for(&base)?,
        };

        let events = Arc::new(StatusRecorder {
            inner: listener,
            last: RwLock::new(None),
        });
        let robots = RobotsPolicy::new(
            client.clone(),
            robots_url,
            base.clone(),
            config.request.user_agent.clone(),
            Arc::clone(&events) as Arc<dyn CrawlListener>,
        );

        let sets = Arc::new(LinkSets::new());
        let session = Session {
            seed,
            state: SharedCrawlState::new(CrawlState::Idle),
            started: AtomicBool::new(false),
            frontier: Frontier::new(Arc::clone(&sets)),
            sets,
            classifier: LinkClassifier::new(client, base, robots),
            output: config.output.clone(),
            events,
        };

        Ok(Self {
            session: Arc::new(session),
            worker: Mutex::new(None),
        })
    }

    /// Creates a session and starts it straight away
    pub fn spawn(
        config: &Config,
        seed: Address,
        listener: Arc<dyn CrawlListener>,
    ) -> Result<Self, SpiderError> {
        let crawler = Self::new(config, seed, listener)?;
        crawler.start()?;
        Ok(crawler)
    }

    /// Seeds the frontier and spawns the crawl worker on the current tokio runtime
    ///
    /// Only valid once, from `Idle`; a session that has already run cannot be
    /// restarted.
    pub fn start(&self) -> Result<(), SpiderError> {
        let session = &self.session;
        if session.started.swap(true, Ordering::AcqRel) {
            return Err(SpiderError::InvalidTransition {
                from: session.state.get(),
                to: CrawlState::Running,
            });
        }
        session
            .state
            .transition(CrawlState::Idle, CrawlState::Running)
            .map_err(|from| SpiderError::InvalidTransition {
                from,
                to: CrawlState::Running,
            })?;

        session.emit(CrawlEventKind::Started {
            seed: session.seed.clone(),
        });
        if session.frontier.enqueue(session.seed.clone()) {
            session.emit(CrawlEventKind::Enqueued {
                address: session.seed.clone(),
            });
        }

        let worker = tokio::spawn(Arc::clone(session).run());
        *self.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(worker);
        Ok(())
    }

    /// Asks the worker to stop after the address it is working on
    ///
    /// Returns immediately; use `wait` to join the worker. An in-flight request
    /// is not cancelled.
    pub fn stop(&self) -> Result<(), SpiderError> {
        self.session
            .state
            .transition(CrawlState::Running, CrawlState::Stopped)
            .map_err(|from| SpiderError::InvalidTransition {
                from,
                to: CrawlState::Stopped,
            })?;
        tracing::info!("Stop requested");
        Ok(())
    }

    /// Waits for the worker to exit
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - How the crawl ended
    /// * `Err(SpiderError)` - Export failed, the worker panicked, or there is no
    ///   worker to wait for (never started, or already waited on)
    pub async fn wait(&self) -> Result<CrawlOutcome, SpiderError> {
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match worker {
            Some(worker) => worker
                .await
                .map_err(|e| SpiderError::Worker(e.to_string()))?,
            None => Err(SpiderError::Worker(
                "no crawl worker to wait for".to_string(),
            )),
        }
    }

    pub fn state(&self) -> CrawlState {
        self.session.state.get()
    }

    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    pub fn seed(&self) -> &Address {
        &self.session.seed
    }

    /// The site root that decides which hosts are local
    pub fn base(&self) -> &Address {
        self.session.classifier.base()
    }

    /// Snapshot of one link set in first-insertion order
    pub fn links(&self, disposition: Disposition) -> Vec<Address> {
        self.session.sets.get(disposition).snapshot()
    }

    pub fn local_links(&self) -> Vec<Address> {
        self.links(Disposition::Local)
    }

    pub fn external_links(&self) -> Vec<Address> {
        self.links(Disposition::External)
    }

    pub fn dead_links(&self) -> Vec<Address> {
        self.links(Disposition::Dead)
    }

    pub fn non_parsable_links(&self) -> Vec<Address> {
        self.links(Disposition::NonParsable)
    }

    pub fn disallowed_links(&self) -> Vec<Address> {
        self.links(Disposition::Disallowed)
    }

    /// Addresses still waiting in the frontier
    pub fn pending(&self) -> Vec<Address> {
        self.session.frontier.snapshot()
    }

    pub fn link_sets(&self) -> &LinkSets {
        &self.session.sets
    }

    /// Current frontier length and link set sizes
    pub fn stats(&self) -> CrawlStats {
        CrawlStats::capture(self.session.frontier.len(), &self.session.sets)
    }

    /// The most recent event line, if anything has happened yet
    pub fn status(&self) -> Option<String> {
        self.session
            .events
            .last
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Disallowed prefixes from robots.txt; empty until the rules are loaded
    pub fn robots_disallowed(&self) -> Vec<Address> {
        self.session
            .classifier
            .robots()
            .loaded()
            .map(|rules| rules.disallowed().to_vec())
            .unwrap_or_default()
    }
}

impl Session {
    fn emit(&self, kind: CrawlEventKind) {
        self.events.on_event(&CrawlEvent::new(kind));
    }

    async fn run(self: Arc<Self>) -> Result<CrawlOutcome, SpiderError> {
        loop {
            if self.state.get() != CrawlState::Running {
                break;
            }

            let Some(address) = self.frontier.dequeue() else {
                break;
            };

            self.process(address).await;

            let delay = self.classifier.robots().crawl_delay().await;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        self.finish()
    }

    async fn process(&self, address: Address) {
        self.emit(CrawlEventKind::Processing {
            address: address.clone(),
        });

        let classification = self.classifier.classify(&address).await;
        if let Classification::Local { body } = &classification {
            self.enqueue_links(&address, body);
        }

        let disposition = classification.disposition();
        self.sets.insert(disposition, address.clone());
        self.emit(CrawlEventKind::Classified {
            address,
            disposition,
            detail: classification.detail(),
        });
    }

    /// Parses a page and queues its links; must not hold the parsed page across an await
    fn enqueue_links(&self, page: &Address, body: &str) {
        let extractor = LinkExtractor::parse(body, page);

        for candidate in extractor.links() {
            match candidate {
                Ok(address) => {
                    if self.frontier.enqueue(address.clone()) {
                        self.emit(CrawlEventKind::Enqueued { address });
                    }
                }
                Err(malformed) => {
                    tracing::warn!("Dropping link on {}: {}", page, malformed);
                    self.emit(CrawlEventKind::MalformedLink {
                        page: page.clone(),
                        reference: malformed.reference,
                    });
                }
            }
        }
    }

    /// Claims completion, exporting on success; a concurrent stop wins otherwise
    fn finish(&self) -> Result<CrawlOutcome, SpiderError> {
        if self
            .state
            .transition(CrawlState::Running, CrawlState::Idle)
            .is_err()
        {
            self.emit(CrawlEventKind::Stopped);
            return Ok(CrawlOutcome::Stopped);
        }

        let host = self.classifier.base().host();
        let report = export_link_sets(&self.sets, host, &self.output).map_err(|e| {
            tracing::error!("Export failed: {}", e);
            e
        })?;

        self.emit(CrawlEventKind::Exported {
            report: report.clone(),
        });
        self.emit(CrawlEventKind::Completed);
        Ok(CrawlOutcome::Completed { report })
    }
}
