//! Expiry Index Module
//!
//! Maps each live key to its current expiry descriptor.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use crate::cache::ExpiryDescriptor;

// == Expiry Index ==
/// Source of truth for which descriptor is live for a key.
///
/// A descriptor drained from the queue is acted upon only if
/// [`ExpiryIndex::is_live`] holds for it.
#[derive(Debug)]
pub struct ExpiryIndex<K> {
    live: HashMap<K, ExpiryDescriptor<K>>,
}

impl<K: Eq + Hash> Default for ExpiryIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> ExpiryIndex<K> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            live: HashMap::new(),
        }
    }

    // == Register ==
    /// Installs `descriptor` as the live descriptor for its key.
    ///
    /// Returns the descriptor it supersedes, if any.
    pub fn register(&mut self, descriptor: ExpiryDescriptor<K>) -> Option<ExpiryDescriptor<K>>
    where
        K: Clone,
    {
        self.live.insert(descriptor.key().clone(), descriptor)
    }

    // == Current ==
    /// Returns the live descriptor for `key`.
    pub fn current<Q>(&self, key: &Q) -> Option<&ExpiryDescriptor<K>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.live.get(key)
    }

    // == Is Live ==
    /// Returns true if `descriptor` is the one currently registered for its key.
    pub fn is_live(&self, descriptor: &ExpiryDescriptor<K>) -> bool {
        self.live
            .get(descriptor.key())
            .is_some_and(|current| current.is_same(descriptor))
    }

    // == Remove ==
    pub fn remove<Q>(&mut self, key: &Q) -> Option<ExpiryDescriptor<K>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.live.remove(key)
    }

    /// Iterates over every live descriptor.
    pub fn descriptors(&self) -> impl Iterator<Item = &ExpiryDescriptor<K>> {
        self.live.values()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn clear(&mut self) {
        self.live.clear();
    }
}
