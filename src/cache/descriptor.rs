//! Expiry Descriptor Module
//!
//! Defines the per-key expiry record tracked by the index and the queue.

use std::time::{Duration, Instant};

// == Deadline ==
/// Absolute point in time at which a descriptor becomes due.
///
/// `Expired` sorts before every concrete instant, so a force-expired
/// descriptor is always due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Deadline {
    /// The infinite past
    Expired,
    /// A concrete instant
    At(Instant),
}

impl Deadline {
    /// Returns true if the deadline is at or before `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        match self {
            Deadline::Expired => true,
            Deadline::At(at) => *at <= now,
        }
    }
}

// == Expiry Descriptor ==
/// Expiry record for a single key.
///
/// Descriptors are never mutated once created. Renewing or force-expiring
/// produces a new descriptor with a fresh sequence number; the sequence
/// number is the descriptor's identity and also breaks deadline ties in
/// insertion order.
#[derive(Debug, Clone)]
pub struct ExpiryDescriptor<K> {
    key: K,
    seq: u64,
    lifetime: Duration,
    deadline: Deadline,
}

impl<K: Clone> ExpiryDescriptor<K> {
    // == Constructor ==
    /// Creates a descriptor starting at `now` with the given lifetime.
    pub fn new(key: K, seq: u64, now: Instant, lifetime: Duration) -> Self {
        Self {
            key,
            seq,
            lifetime,
            deadline: deadline_for(now, lifetime),
        }
    }

    // == Renew ==
    /// Returns a successor that restarts the same lifetime at `now`.
    pub fn renewed(&self, seq: u64, now: Instant) -> Self {
        Self::new(self.key.clone(), seq, now, self.lifetime)
    }

    // == Rearm ==
    /// Returns a successor starting at `now` with a different lifetime.
    pub fn rearmed(&self, seq: u64, now: Instant, lifetime: Duration) -> Self {
        Self::new(self.key.clone(), seq, now, lifetime)
    }

    // == Force Expire ==
    /// Returns a successor whose deadline lies in the infinite past.
    pub fn force_expired(&self, seq: u64) -> Self {
        Self {
            key: self.key.clone(),
            seq,
            lifetime: self.lifetime,
            deadline: Deadline::Expired,
        }
    }
}

impl<K> ExpiryDescriptor<K> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    /// Returns true if both descriptors are the same record.
    pub fn is_same(&self, other: &Self) -> bool {
        self.seq == other.seq
    }

    /// Sort key: ascending deadline, FIFO on ties.
    pub fn order_key(&self) -> (Deadline, u64) {
        (self.deadline, self.seq)
    }
}

/// A lifetime too large to represent as an `Instant` never comes due.
fn deadline_for(now: Instant, lifetime: Duration) -> Deadline {
    match now.checked_add(lifetime) {
        Some(at) => Deadline::At(at),
        None => Deadline::At(far_future(now)),
    }
}

fn far_future(now: Instant) -> Instant {
    // ~30 years is representable on every supported platform
    now + Duration::from_secs(60 * 60 * 24 * 365 * 30)
}
