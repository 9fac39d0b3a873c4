//! Rate Repository Module
//!
//! Stores exchange rates in one expiring cache per currency pair, keyed by
//! the epoch day the rate was reported on.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::{ExpiringCache, DEFAULT_LIFETIME};
use crate::models::{epoch_day, CurrencyPair, ExchangeRate};

type RateCache = ExpiringCache<i64, ExchangeRate>;

// == Pair History ==
/// Rates recorded for one currency pair.
///
/// The cache does not enumerate its keys, so the days written are tracked
/// alongside it and probed on lookup.
#[derive(Debug)]
pub(crate) struct PairHistory {
    rates: RateCache,
    days: BTreeSet<i64>,
}

impl PairHistory {
    fn new(pair: CurrencyPair, lifetime: Duration) -> Self {
        let rates = RateCache::with_default_lifetime(lifetime);
        rates.add_expired_entry_listener(move |rate: &ExchangeRate| -> anyhow::Result<()> {
            debug!(pair = %pair, reported_on = %rate.reported_on, "Exchange rate left the cache");
            Ok(())
        });
        Self {
            rates,
            days: BTreeSet::new(),
        }
    }

    /// Forgets days whose entries are no longer live.
    fn prune(&mut self) {
        let rates = &self.rates;
        self.days.retain(|day| rates.contains_key(day));
    }
}

// == Rate Repository ==
/// In-memory exchange-rate store.
#[derive(Debug)]
pub struct RateRepository {
    pairs: RwLock<HashMap<CurrencyPair, PairHistory>>,
    lifetime: Duration,
}

impl Default for RateRepository {
    fn default() -> Self {
        Self::new(DEFAULT_LIFETIME)
    }
}

impl RateRepository {
    // == Constructor ==
    /// Creates a repository whose rates live for `lifetime` after their
    /// last read or write.
    pub fn new(lifetime: Duration) -> Self {
        Self {
            pairs: RwLock::new(HashMap::new()),
            lifetime,
        }
    }

    // == Save ==
    /// Records `rate`, replacing any rate for the same pair and day.
    pub async fn save(&self, rate: ExchangeRate) -> ExchangeRate {
        let pair = rate.pair();
        let day = rate.epoch_day();
        let mut pairs = self.pairs.write().await;

        let history = pairs.entry(pair).or_insert_with(|| {
            info!(pair = %pair, "Tracking new currency pair");
            PairHistory::new(pair, self.lifetime)
        });
        history.prune();
        history.rates.put(day, rate.clone());
        history.days.insert(day);

        rate
    }

    // == Find For Date ==
    pub async fn find_for_date(&self, pair: CurrencyPair, date: NaiveDate) -> Option<ExchangeRate> {
        let pairs = self.pairs.read().await;
        pairs.get(&pair)?.rates.get(&epoch_day(date))
    }

    // == Find Latest ==
    /// Returns the live rate with the most recent reporting day.
    pub async fn find_latest(&self, pair: CurrencyPair) -> Option<ExchangeRate> {
        let pairs = self.pairs.read().await;
        let history = pairs.get(&pair)?;
        history
            .days
            .iter()
            .rev()
            .find_map(|day| history.rates.get(day))
    }

    // == Find All ==
    /// Returns every live rate for the pair, oldest day first.
    ///
    /// Days found expired are forgotten, so tracked days stay bounded even
    /// when the sweep is disabled and the pair is only read.
    pub async fn find_all(&self, pair: CurrencyPair) -> Vec<ExchangeRate> {
        let (rates, tracked) = {
            let pairs = self.pairs.read().await;
            match pairs.get(&pair) {
                Some(history) => (
                    history
                        .days
                        .iter()
                        .filter_map(|day| history.rates.get(day))
                        .collect::<Vec<_>>(),
                    history.days.len(),
                ),
                None => return Vec::new(),
            }
        };

        if rates.len() < tracked {
            if let Some(history) = self.pairs.write().await.get_mut(&pair) {
                history.prune();
            }
        }
        rates
    }

    // == Purge ==
    /// Evicts due entries from every pair's cache. Returns the number evicted.
    pub async fn purge_expired(&self) -> usize {
        let mut pairs = self.pairs.write().await;
        let mut removed = 0;
        for history in pairs.values_mut() {
            removed += history.rates.purge_expired();
            history.prune();
        }
        removed
    }

    /// Number of currency pairs seen so far.
    pub async fn pair_count(&self) -> usize {
        self.pairs.read().await.len()
    }

    /// Number of reporting days still tracked for the pair.
    #[cfg(test)]
    pub(crate) async fn tracked_days(&self, pair: CurrencyPair) -> usize {
        self.pairs
            .read()
            .await
            .get(&pair)
            .map_or(0, |history| history.days.len())
    }

    /// Holds the write lock so callers stall, for deadline tests.
    #[cfg(test)]
    pub(crate) async fn lock_exclusive(
        &self,
    ) -> tokio::sync::RwLockWriteGuard<'_, HashMap<CurrencyPair, PairHistory>> {
        self.pairs.write().await
    }
}
