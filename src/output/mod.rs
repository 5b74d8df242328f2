//! Crawl results and their export
//!
//! This module handles:
//! - The five link sets a crawl sorts addresses into
//! - Writing those sets to per-host link files
//! - Live and exported crawl statistics

mod export;
mod link_sets;
pub mod stats;

pub use export::{
    export_link_sets, link_file_path, read_link_file, ExportError, ExportReport, ExportResult,
};
pub use link_sets::{LinkSet, LinkSets};
pub use stats::{load_statistics, print_statistics, CrawlStats, ExportedStatistics};
