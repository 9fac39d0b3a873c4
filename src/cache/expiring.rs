//! Expiring Cache Module
//!
//! Thread-safe key/value cache where every entry carries its own lifetime,
//! reads slide the deadline forward and expired values are reported to
//! registered listeners.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::cache::{
    ExpirationQueue, ExpiredEntryListener, ExpiryDescriptor, ExpiryIndex, ListenerRegistry,
    ValueStore,
};
use crate::error::{CacheError, Result};

// == Public Constants ==
/// Lifetime used by [`ExpiringCache::put`]: three days.
pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(3 * 24 * 60 * 60);

// Queue is rebuilt from the index once it holds more than
// COMPACT_FACTOR * live + COMPACT_SLACK descriptors.
const COMPACT_FACTOR: usize = 2;
const COMPACT_SLACK: usize = 64;

// == Cache State ==
/// The three structures guarded together by the cache mutex.
#[derive(Debug)]
struct CacheState<K, V> {
    values: ValueStore<K, V>,
    index: ExpiryIndex<K>,
    queue: ExpirationQueue<K>,
    next_seq: u64,
}

impl<K, V> CacheState<K, V>
where
    K: Eq + Hash + Clone,
{
    fn new() -> Self {
        Self {
            values: ValueStore::new(),
            index: ExpiryIndex::new(),
            queue: ExpirationQueue::new(),
            next_seq: 0,
        }
    }

    fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    // == Cleanup ==
    /// Evicts every entry whose live descriptor is due, collecting the
    /// evicted values. Stale descriptors are dropped silently.
    fn cleanup(&mut self, now: Instant, expired: &mut Vec<V>) {
        for descriptor in self.queue.drain_due(now) {
            if !self.index.is_live(&descriptor) {
                continue;
            }
            self.index.remove(descriptor.key());
            if let Some(value) = self.values.remove(descriptor.key()) {
                expired.push(value);
            }
        }
    }

    // == Schedule ==
    /// Makes `descriptor` the live descriptor for its key and enqueues it.
    fn schedule(&mut self, descriptor: ExpiryDescriptor<K>) {
        self.queue.insert(descriptor.clone());
        self.index.register(descriptor);
        self.maybe_compact();
    }

    /// Replaces the live descriptor for `key` with `successor(current, seq)`.
    ///
    /// Returns false if the key has no live descriptor.
    fn supersede<Q, F>(&mut self, key: &Q, successor: F) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&ExpiryDescriptor<K>, u64) -> ExpiryDescriptor<K>,
    {
        let seq = self.next_seq;
        let next = match self.index.current(key) {
            Some(current) => successor(current, seq),
            None => return false,
        };
        self.next_seq += 1;
        self.schedule(next);
        true
    }

    fn renew<Q>(&mut self, key: &Q, now: Instant) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.supersede(key, |current, seq| current.renewed(seq, now))
    }

    fn force_expire<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.supersede(key, |current, seq| current.force_expired(seq))
    }

    fn rearm<Q>(&mut self, key: &Q, now: Instant, lifetime: Duration) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.supersede(key, |current, seq| current.rearmed(seq, now, lifetime))
    }

    // == Evict ==
    /// Removes a key from the value store and the index. Its queued
    /// descriptors become stale.
    fn evict<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.remove(key);
        self.values.remove(key)
    }

    fn clear(&mut self) {
        self.values.clear();
        self.index.clear();
        self.queue.clear();
    }

    fn maybe_compact(&mut self) {
        let live = self.index.len();
        if self.queue.len() <= COMPACT_FACTOR * live + COMPACT_SLACK {
            return;
        }
        let before = self.queue.len();
        let descriptors: Vec<_> = self.index.descriptors().cloned().collect();
        self.queue.rebuild(descriptors);
        debug!(
            before = before,
            after = self.queue.len(),
            "Compacted expiration queue"
        );
    }
}

// == Expiring Cache ==
/// Self-expiring associative container.
///
/// Every public operation first evicts due entries, then applies its own
/// effect, all under one mutex covering the value store, the expiry index
/// and the expiration queue. Listeners run after the mutex is released but
/// before the operation returns, so they may call back into the cache.
///
/// Bulk enumeration is not offered: [`ExpiringCache::keys`],
/// [`ExpiringCache::values`], [`ExpiringCache::entries`] and
/// [`ExpiringCache::put_all`] always fail with [`CacheError::Unsupported`].
pub struct ExpiringCache<K, V> {
    state: Mutex<CacheState<K, V>>,
    listeners: RwLock<ListenerRegistry<V>>,
    default_lifetime: Duration,
}

impl<K, V> std::fmt::Debug for ExpiringCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("default_lifetime", &self.default_lifetime)
            .finish_non_exhaustive()
    }
}

impl<K, V> Default for ExpiringCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates a cache whose entries live for [`DEFAULT_LIFETIME`] unless
    /// given an explicit lifetime.
    pub fn new() -> Self {
        Self::with_default_lifetime(DEFAULT_LIFETIME)
    }

    /// Creates a cache with a custom default lifetime.
    pub fn with_default_lifetime(default_lifetime: Duration) -> Self {
        Self {
            state: Mutex::new(CacheState::new()),
            listeners: RwLock::new(ListenerRegistry::new()),
            default_lifetime,
        }
    }

    pub fn default_lifetime(&self) -> Duration {
        self.default_lifetime
    }

    // == Listeners ==
    /// Registers a listener called with the value of every entry that
    /// expires, is overwritten or is removed.
    pub fn add_expired_entry_listener<L>(&self, listener: L)
    where
        L: ExpiredEntryListener<V> + 'static,
    {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add(Arc::new(listener));
    }

    // == Size ==
    pub fn len(&self) -> usize {
        self.run(|state, _, _| state.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.run(|state, _, _| state.values.is_empty())
    }

    // == Contains ==
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.run(|state, _, _| state.values.contains_key(key))
    }

    /// Linear scan of live values.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.run(|state, _, _| state.values.contains_value(value))
    }

    // == Get ==
    /// Returns the value for `key`, renewing its lifetime.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.run(|state, now, _| {
            let value = state.values.get(key).cloned()?;
            state.renew(key, now);
            Some(value)
        })
    }

    // == Put ==
    /// Stores `value` with the default lifetime.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        self.put_with_lifetime(key, value, self.default_lifetime)
    }

    /// Stores `value` with an explicit lifetime.
    ///
    /// A live value already stored under `key` is expired first, so
    /// listeners see it, and is returned.
    pub fn put_with_lifetime(&self, key: K, value: V, lifetime: Duration) -> Option<V> {
        self.run(|state, now, expired| {
            let previous = state.evict(&key);
            if let Some(previous) = &previous {
                expired.push(previous.clone());
            }
            let seq = state.next_seq();
            state.schedule(ExpiryDescriptor::new(key.clone(), seq, now, lifetime));
            state.values.insert(key, value);
            previous
        })
    }

    // == Remove ==
    /// Deletes `key`. Listeners are notified with the removed value.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.run(|state, _, expired| {
            let removed = state.evict(key)?;
            expired.push(removed.clone());
            Some(removed)
        })
    }

    // == Renew Key ==
    /// Restarts the key's lifetime. Returns false if the key is absent.
    pub fn renew_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.run(|state, now, _| state.renew(key, now))
    }

    // == Expire Key ==
    /// Expires `key` immediately, notifying listeners.
    pub fn expire_key<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.run(|state, now, expired| {
            if state.force_expire(key) {
                state.cleanup(now, expired);
            }
        })
    }

    /// Re-arms `key` to expire `delay` from now. Re-arming is silent:
    /// listeners hear about the value once, when the new deadline passes.
    pub fn expire_key_after<Q>(&self, key: &Q, delay: Duration)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.run(|state, now, expired| {
            if state.rearm(key, now, delay) {
                state.cleanup(now, expired);
            }
        })
    }

    // == Expire Value ==
    /// Expires every key whose value equals `value`.
    pub fn expire_value(&self, value: &V)
    where
        V: PartialEq,
    {
        self.run(|state, now, expired| {
            for key in state.values.keys_with_value(value) {
                state.force_expire(&key);
            }
            state.cleanup(now, expired);
        })
    }

    /// Re-arms every key whose value equals `value` to expire `delay` from now.
    /// Re-arming is silent; listeners fire when the new deadline passes.
    pub fn expire_value_after(&self, value: &V, delay: Duration)
    where
        V: PartialEq,
    {
        self.run(|state, now, expired| {
            for key in state.values.keys_with_value(value) {
                state.rearm(&key, now, delay);
            }
            state.cleanup(now, expired);
        })
    }

    // == Clear ==
    /// Drops every entry and pending expiration without notifying listeners.
    pub fn clear(&self) {
        self.lock().clear();
    }

    // == Purge ==
    /// Runs a cleanup pass and returns the number of entries it evicted.
    pub fn purge_expired(&self) -> usize {
        self.run(|_, _, expired| expired.len())
    }

    // == Unsupported ==
    pub fn keys(&self) -> Result<Vec<K>> {
        Err(CacheError::Unsupported("keys"))
    }

    pub fn values(&self) -> Result<Vec<V>> {
        Err(CacheError::Unsupported("values"))
    }

    pub fn entries(&self) -> Result<Vec<(K, V)>> {
        Err(CacheError::Unsupported("entries"))
    }

    pub fn put_all<I>(&self, _entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Err(CacheError::Unsupported("put_all"))
    }

    // == Internals ==
    fn lock(&self) -> MutexGuard<'_, CacheState<K, V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs cleanup followed by `op` under the state lock, then notifies
    /// listeners of everything that left the cache.
    fn run<R, F>(&self, op: F) -> R
    where
        F: FnOnce(&mut CacheState<K, V>, Instant, &mut Vec<V>) -> R,
    {
        let mut expired = Vec::new();
        let result = {
            let mut state = self.lock();
            let now = Instant::now();
            state.cleanup(now, &mut expired);
            op(&mut state, now, &mut expired)
        };
        self.notify(&expired);
        result
    }

    fn notify(&self, expired: &[V]) {
        if expired.is_empty() {
            return;
        }
        debug!(count = expired.len(), "Evicted cache entries");
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot();
        let failures: usize = expired.iter().map(|value| listeners.notify(value)).sum();
        if failures > 0 {
            debug!(failures = failures, "Listener failures during notification");
        }
    }
}
