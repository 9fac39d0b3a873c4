//! Request, response and domain models for the exchange-rate API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP bodies, plus the records stored in the cache.

pub mod currency;
pub mod rate;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use currency::{CurrencyCode, CurrencyPair, InvalidCurrencyCode};
pub use rate::{epoch_day, ExchangeRate};
pub use requests::{parse_iso_date, PairQuery, SetRateRequest};
pub use responses::{ApiErrorBody, ErrorMetadata, FieldError, HealthResponse};
