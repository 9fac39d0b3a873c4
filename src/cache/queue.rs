//! Expiration Queue Module
//!
//! Min-heap of expiry descriptors ordered by deadline.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Instant;

use crate::cache::ExpiryDescriptor;

// == Queued Descriptor ==
/// Heap slot ordering descriptors by `(deadline, seq)`.
///
/// The sort key is captured at insertion and never changes afterwards.
#[derive(Debug)]
struct Queued<K>(ExpiryDescriptor<K>);

impl<K> PartialEq for Queued<K> {
    fn eq(&self, other: &Self) -> bool {
        self.0.order_key() == other.0.order_key()
    }
}

impl<K> Eq for Queued<K> {}

impl<K> PartialOrd for Queued<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for Queued<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.order_key().cmp(&other.0.order_key())
    }
}

// == Expiration Queue ==
/// Time-ordered queue of expiry descriptors.
///
/// Stale descriptors are not removed eagerly; the owner filters them
/// when they are drained.
#[derive(Debug)]
pub struct ExpirationQueue<K> {
    heap: BinaryHeap<Reverse<Queued<K>>>,
}

impl<K> Default for ExpirationQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> ExpirationQueue<K> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    // == Insert ==
    /// Enqueues a descriptor.
    pub fn insert(&mut self, descriptor: ExpiryDescriptor<K>) {
        self.heap.push(Reverse(Queued(descriptor)));
    }

    // == Drain Due ==
    /// Removes and returns every descriptor due at `now`, in deadline order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<ExpiryDescriptor<K>> {
        let mut due = Vec::new();
        while self
            .heap
            .peek()
            .is_some_and(|Reverse(Queued(next))| next.deadline().is_due(now))
        {
            if let Some(Reverse(Queued(descriptor))) = self.heap.pop() {
                due.push(descriptor);
            }
        }
        due
    }

    // == Peek Deadline ==
    /// Returns the earliest queued descriptor without removing it.
    #[cfg(test)]
    pub fn peek(&self) -> Option<&ExpiryDescriptor<K>> {
        self.heap.peek().map(|Reverse(Queued(descriptor))| descriptor)
    }

    // == Rebuild ==
    /// Replaces the queue contents with the given descriptors.
    pub fn rebuild<I>(&mut self, descriptors: I)
    where
        I: IntoIterator<Item = ExpiryDescriptor<K>>,
    {
        self.heap = descriptors.into_iter().map(|d| Reverse(Queued(d))).collect();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}
