//! The crawl frontier
//!
//! A FIFO queue of addresses still to classify. An address is only accepted
//! if it is not already queued, not currently being classified, and not
//! already in one of the link sets, so every address is processed at most once
//! per session and the crawl proceeds breadth-first.

use crate::output::LinkSets;
use crate::url::Address;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Default)]
struct Queue {
    order: VecDeque<Address>,
    members: HashSet<Address>,
    in_flight: Option<Address>,
}

/// Deduplicated work queue shared by producers and the crawl worker
#[derive(Debug)]
pub struct Frontier {
    queue: Mutex<Queue>,
    sets: Arc<LinkSets>,
}

impl Frontier {
    /// Creates an empty frontier that deduplicates against `sets`
    pub fn new(sets: Arc<LinkSets>) -> Self {
        Self {
            queue: Mutex::new(Queue::default()),
            sets,
        }
    }

    /// Adds an address to the back of the queue
    ///
    /// Returns false, leaving the queue unchanged, if the address is already
    /// queued, is the one being classified, or has been classified.
    pub fn enqueue(&self, address: Address) -> bool {
        let mut queue = self.lock();

        if queue.members.contains(&address)
            || queue.in_flight.as_ref() == Some(&address)
            || self.sets.contains(&address)
        {
            tracing::trace!("Already seen: {}", address);
            return false;
        }

        queue.members.insert(address.clone());
        queue.order.push_back(address);
        true
    }

    /// Takes the oldest address off the queue and marks it as being classified
    pub fn dequeue(&self) -> Option<Address> {
        let mut queue = self.lock();
        let address = queue.order.pop_front()?;
        queue.members.remove(&address);
        queue.in_flight = Some(address.clone());
        Some(address)
    }

    pub fn len(&self) -> usize {
        self.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().order.is_empty()
    }

    /// Checks if an address is waiting in the queue
    pub fn contains(&self, address: &Address) -> bool {
        self.lock().members.contains(address)
    }

    /// Copies the queued addresses out in processing order
    pub fn snapshot(&self) -> Vec<Address> {
        self.lock().order.iter().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
