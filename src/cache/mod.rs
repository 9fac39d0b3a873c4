//! Cache Module
//!
//! Provides a generic self-expiring key/value cache with per-entry lifetimes,
//! sliding expiration and expiration listeners.

mod descriptor;
mod expiring;
mod index;
mod listener;
mod queue;
mod values;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use descriptor::{Deadline, ExpiryDescriptor};
pub use expiring::{ExpiringCache, DEFAULT_LIFETIME};
pub use index::ExpiryIndex;
pub use listener::{ExpiredEntryListener, ListenerRegistry};
pub use queue::ExpirationQueue;
pub use values::ValueStore;
