//! Link file export
//!
//! Each link set is written to `<directory>/<host>_<disposition>.<extension>`, one
//! absolute address per line in first-insertion order. The indexer reads these
//! files after the crawl.
//!
//! A file left behind by an earlier crawl of the same host is not replaced unless
//! `overwrite` is set; it is reported as skipped instead.

use crate::config::OutputConfig;
use crate::output::LinkSets;
use crate::state::Disposition;
use crate::url::Address;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing link files
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// What an export wrote
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportReport {
    /// Directory the files were written into
    pub directory: PathBuf,

    /// Files written by this export
    pub written: Vec<PathBuf>,

    /// Files that already existed and were left untouched
    pub skipped: Vec<PathBuf>,
}

/// Returns the path of a link file
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use webspider::config::OutputConfig;
/// use webspider::output::link_file_path;
/// use webspider::Disposition;
///
/// let config = OutputConfig::default();
/// let path = link_file_path(&config, "example.test", Disposition::Dead);
/// assert_eq!(path, Path::new("./crawl-output/example.test_dead.txt"));
/// ```
pub fn link_file_path(config: &OutputConfig, host: &str, disposition: Disposition) -> PathBuf {
    config.directory_path().join(format!(
        "{}_{}.{}",
        host,
        disposition.as_str(),
        config.extension
    ))
}

/// Writes every link set to its file
///
/// # Arguments
///
/// * `sets` - The crawl's link sets
/// * `host` - The crawl's base host, used as the file name prefix
/// * `config` - Output directory, extension and overwrite policy
///
/// # Returns
///
/// * `Ok(ExportReport)` - Files written and files skipped
/// * `Err(ExportError)` - The directory or a file could not be created or written
pub fn export_link_sets(
    sets: &LinkSets,
    host: &str,
    config: &OutputConfig,
) -> ExportResult<ExportReport> {
    let directory = config.directory_path();
    fs::create_dir_all(&directory).map_err(|source| ExportError::CreateDir {
        path: directory.clone(),
        source,
    })?;

    let mut report = ExportReport {
        directory,
        ..ExportReport::default()
    };

    for (disposition, set) in sets.iter() {
        let path = link_file_path(config, host, disposition);
        if write_link_file(&path, &set.snapshot(), config.overwrite)? {
            tracing::debug!("Wrote {} {} links to {}", set.len(), disposition, path.display());
            report.written.push(path);
        } else {
            tracing::warn!("{} already exists, leaving it untouched", path.display());
            report.skipped.push(path);
        }
    }

    Ok(report)
}

/// Writes one link file
///
/// Returns false without touching the file if it exists and `overwrite` is off.
fn write_link_file(path: &Path, links: &[Address], overwrite: bool) -> ExportResult<bool> {
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let file = match options.open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(source) => {
            return Err(ExportError::Write {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let write_all = || -> io::Result<()> {
        let mut writer = BufWriter::new(file);
        for link in links {
            writeln!(writer, "{}", link)?;
        }
        writer.flush()
    };

    write_all().map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(true)
}

/// Reads a link file back, one address string per non-empty line
pub fn read_link_file(path: &Path) -> io::Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut links = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            links.push(line.to_string());
        }
    }
    Ok(links)
}
