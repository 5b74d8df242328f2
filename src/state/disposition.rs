/// Disposition definitions for classified addresses
///
/// Every address the crawler processes ends in exactly one of these categories.
use std::fmt;

/// The terminal outcome of classifying one address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// Same host, allowed, fetched and parsed for further links
    Local,

    /// Different host from the crawl's base; never fetched
    External,

    /// Fetch failed (connection error, timeout, HTTP error status, unreadable body)
    Dead,

    /// Content type is not text, or is JavaScript/CSS
    NonParsable,

    /// Excluded by robots.txt
    Disallowed,
}

impl Disposition {
    /// Returns all dispositions in export order
    pub fn all() -> [Self; 5] {
        [
            Self::Local,
            Self::External,
            Self::Dead,
            Self::NonParsable,
            Self::Disallowed,
        ]
    }

    /// Returns the stable name used in link file names and log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::External => "external",
            Self::Dead => "dead",
            Self::NonParsable => "nonparsable",
            Self::Disallowed => "disallowed",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
