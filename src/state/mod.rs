//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `Disposition`: the terminal outcome of classifying one address
//! - `CrawlState`: the lifecycle of a crawl session (idle, running, stopped)
//! - `SharedCrawlState`: lock-free holder of a session's `CrawlState`

mod crawl_state;
mod disposition;

// Re-export main types
pub use crawl_state::{CrawlState, SharedCrawlState};
pub use disposition::Disposition;
