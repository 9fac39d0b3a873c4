//! Exchange rate record stored in the per-pair caches.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{CurrencyCode, CurrencyPair};

// 1970-01-01 counted from 0001-01-01 (day 1)
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// Day index used as the cache key: days since 1970-01-01.
pub fn epoch_day(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE
}

// == Exchange Rate ==
/// A single reported rate for one currency pair on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub rate: f64,
    pub reported_on: NaiveDate,
}

impl ExchangeRate {
    pub fn new(from: CurrencyCode, to: CurrencyCode, rate: f64, reported_on: NaiveDate) -> Self {
        Self {
            from,
            to,
            rate,
            reported_on,
        }
    }

    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair::new(self.from, self.to)
    }

    pub fn epoch_day(&self) -> i64 {
        epoch_day(self.reported_on)
    }
}
