//! Expiration Listener Module
//!
//! Observers notified with the value of every entry that leaves the cache
//! through expiration, overwrite or removal.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::warn;

// == Listener Trait ==
/// Callback invoked with the value of an expired entry.
pub trait ExpiredEntryListener<V>: Send + Sync {
    fn entry_expired(&self, value: &V) -> anyhow::Result<()>;
}

impl<V, F> ExpiredEntryListener<V> for F
where
    F: Fn(&V) -> anyhow::Result<()> + Send + Sync,
{
    fn entry_expired(&self, value: &V) -> anyhow::Result<()> {
        self(value)
    }
}

// == Listener Registry ==
/// Ordered list of listeners owned by one cache instance.
pub struct ListenerRegistry<V> {
    listeners: Vec<Arc<dyn ExpiredEntryListener<V>>>,
}

impl<V> Default for ListenerRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for ListenerRegistry<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<V> ListenerRegistry<V> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    // == Add ==
    /// Appends a listener; listeners run in registration order.
    pub fn add(&mut self, listener: Arc<dyn ExpiredEntryListener<V>>) {
        self.listeners.push(listener);
    }

    // == Snapshot ==
    /// Cheap copy of the current listener list, for use outside a lock.
    pub fn snapshot(&self) -> Self {
        Self {
            listeners: self.listeners.clone(),
        }
    }

    // == Notify ==
    /// Invokes every listener with `value`.
    ///
    /// A listener that fails or panics is logged and skipped; the rest
    /// still run. Returns the number of failed invocations.
    pub fn notify(&self, value: &V) -> usize {
        let mut failures = 0;
        for (position, listener) in self.listeners.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| listener.entry_expired(value))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    failures += 1;
                    warn!(listener = position, error = %err, "Expired entry listener failed");
                }
                Err(_) => {
                    failures += 1;
                    warn!(listener = position, "Expired entry listener panicked");
                }
            }
        }
        failures
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
