//! The five result sets of a crawl

use crate::state::Disposition;
use crate::url::Address;
use indexmap::IndexSet;
use std::sync::{PoisonError, RwLock};

/// A deduplicated set of addresses that remembers first-insertion order
///
/// Writers and readers take the internal lock only for the duration of one call,
/// so an observer reading sizes or snapshots never holds up the crawl worker for
/// longer than a single insert.
#[derive(Debug, Default)]
pub struct LinkSet {
    links: RwLock<IndexSet<Address>>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an address; returns false if it was already present
    pub fn insert(&self, address: Address) -> bool {
        self.links
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(address)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.links
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(address)
    }

    pub fn len(&self) -> usize {
        self.links.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the addresses out in first-insertion order
    pub fn snapshot(&self) -> Vec<Address> {
        self.links
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

/// One `LinkSet` per `Disposition`
#[derive(Debug, Default)]
pub struct LinkSets {
    sets: [LinkSet; 5],
}

impl LinkSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, disposition: Disposition) -> &LinkSet {
        &self.sets[slot(disposition)]
    }

    /// Records an address under a disposition; returns false if it was already there
    pub fn insert(&self, disposition: Disposition, address: Address) -> bool {
        self.get(disposition).insert(address)
    }

    /// Returns the set holding `address`, if any
    pub fn find(&self, address: &Address) -> Option<Disposition> {
        Disposition::all()
            .into_iter()
            .find(|&disposition| self.get(disposition).contains(address))
    }

    /// Returns true if any of the sets holds `address`
    pub fn contains(&self, address: &Address) -> bool {
        self.find(address).is_some()
    }

    /// Iterates the sets in export order
    pub fn iter(&self) -> impl Iterator<Item = (Disposition, &LinkSet)> {
        Disposition::all()
            .into_iter()
            .map(move |disposition| (disposition, self.get(disposition)))
    }

    /// Total number of addresses across all sets
    pub fn total(&self) -> usize {
        self.sets.iter().map(LinkSet::len).sum()
    }
}

fn slot(disposition: Disposition) -> usize {
    match disposition {
        Disposition::Local => 0,
        Disposition::External => 1,
        Disposition::Dead => 2,
        Disposition::NonParsable => 3,
        Disposition::Disallowed => 4,
    }
}
