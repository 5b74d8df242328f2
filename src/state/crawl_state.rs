use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of a crawl session
///
/// ```text
/// Idle ──start──▶ Running ──frontier exhausted──▶ Idle
///                    │
///                    └────────stop──────────────▶ Stopped
/// ```
///
/// A session runs at most once. `Stopped` is terminal and a session that has
/// completed stays `Idle` but cannot be started again; a new session must be
/// created to crawl again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// Not running: either never started or finished normally
    Idle,

    /// The background worker is draining the frontier
    Running,

    /// Stop was requested; nothing was exported
    Stopped,
}

impl CrawlState {
    /// Checks whether the lifecycle allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running) | (Self::Running, Self::Idle) | (Self::Running, Self::Stopped)
        )
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    fn to_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Running => 1,
            Self::Stopped => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Stopped,
            _ => Self::Idle,
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopped => "stopped",
        };
        write!(f, "{}", name)
    }
}

/// Atomic holder for a session's `CrawlState`
///
/// The worker reads it at every loop boundary; `stop()` writes it from any thread.
/// Cancellation is cooperative: a state change is only observed between
/// iterations, never during an in-flight fetch.
#[derive(Debug)]
pub struct SharedCrawlState(AtomicU8);

impl SharedCrawlState {
    pub fn new(state: CrawlState) -> Self {
        Self(AtomicU8::new(state.to_u8()))
    }

    pub fn get(&self) -> CrawlState {
        CrawlState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Atomically moves from `from` to `to`
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The state was `from` and is now `to`
    /// * `Err(CrawlState)` - The transition is not allowed, or the state was not
    ///   `from`; carries the state actually observed
    pub fn transition(&self, from: CrawlState, to: CrawlState) -> Result<(), CrawlState> {
        if !from.can_transition_to(to) {
            return Err(self.get());
        }
        self.0
            .compare_exchange(from.to_u8(), to.to_u8(), Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(CrawlState::from_u8)
    }
}
