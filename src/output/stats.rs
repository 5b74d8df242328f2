//! Crawl statistics
//!
//! Live counters for a running crawl, and counts read back from exported link
//! files for a finished one.

use crate::config::OutputConfig;
use crate::output::{link_file_path, read_link_file, LinkSets};
use crate::state::Disposition;
use std::io;

/// Snapshot of a crawl's progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Addresses waiting in the frontier
    pub frontier: usize,
    pub local: usize,
    pub external: usize,
    pub dead: usize,
    pub non_parsable: usize,
    pub disallowed: usize,
}

impl CrawlStats {
    /// Reads the current sizes
    pub fn capture(frontier: usize, sets: &LinkSets) -> Self {
        Self {
            frontier,
            local: sets.get(Disposition::Local).len(),
            external: sets.get(Disposition::External).len(),
            dead: sets.get(Disposition::Dead).len(),
            non_parsable: sets.get(Disposition::NonParsable).len(),
            disallowed: sets.get(Disposition::Disallowed).len(),
        }
    }

    pub fn count(&self, disposition: Disposition) -> usize {
        match disposition {
            Disposition::Local => self.local,
            Disposition::External => self.external,
            Disposition::Dead => self.dead,
            Disposition::NonParsable => self.non_parsable,
            Disposition::Disallowed => self.disallowed,
        }
    }

    /// Number of addresses classified so far
    pub fn total(&self) -> usize {
        Disposition::all().iter().map(|&d| self.count(d)).sum()
    }
}

/// Counts read back from a host's exported link files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedStatistics {
    pub host: String,

    /// Link count per disposition; None when the file is missing
    pub counts: Vec<(Disposition, Option<usize>)>,
}

/// Loads statistics from exported link files
///
/// # Arguments
///
/// * `config` - Output configuration the files were written with
/// * `host` - The crawled host
///
/// # Returns
///
/// * `Ok(ExportedStatistics)` - Counts for every disposition
/// * `Err(io::Error)` - A link file exists but could not be read
pub fn load_statistics(config: &OutputConfig, host: &str) -> io::Result<ExportedStatistics> {
    let mut counts = Vec::new();

    for disposition in Disposition::all() {
        let path = link_file_path(config, host, disposition);
        let count = match read_link_file(&path) {
            Ok(links) => Some(links.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e),
        };
        counts.push((disposition, count));
    }

    Ok(ExportedStatistics {
        host: host.to_string(),
        counts,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &ExportedStatistics) {
    println!("=== Crawl Statistics: {} ===\n", stats.host);

    let total: usize = stats.counts.iter().filter_map(|(_, count)| *count).sum();

    for (disposition, count) in &stats.counts {
        match count {
            Some(count) => {
                let percentage = if total > 0 {
                    (*count as f64 / total as f64) * 100.0
                } else {
                    0.0
                };
                println!("  {:<12} {:>6} ({:.1}%)", disposition, count, percentage);
            }
            None => println!("  {:<12} {:>6}", disposition, "-"),
        }
    }

    println!("\n  {:<12} {:>6}", "total", total);
}
