//! URL handling module for webspider
//!
//! This module provides the `Address` type used for every de-duplication decision,
//! plus the same-site check used to separate local from external links.

mod address;
mod domain;

// Re-export main types and functions
pub use address::Address;
pub use domain::is_same_host;
