//! Request DTOs for the exchange-rate API
//!
//! Defines the structure of incoming HTTP request bodies and query strings,
//! and turns them into validated domain values.

use chrono::NaiveDate;
use serde::Deserialize;

use super::{CurrencyCode, CurrencyPair, ExchangeRate, FieldError};
use crate::error::{ApiError, ApiResult};

const SAME_CURRENCY: &str = "From/To must be different currency codes";

/// Request body for recording a rate (POST /currency)
///
/// # Fields
/// - `from`, `to`: ISO 4217 currency codes, case-insensitive
/// - `rate`: non-negative rate
/// - `reportedOn`: ISO date (`yyyy-MM-dd`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRateRequest {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub reported_on: Option<String>,
}

impl SetRateRequest {
    /// Validates every field, reporting all failures at once.
    pub fn validate(&self) -> ApiResult<ExchangeRate> {
        let mut errors = Vec::new();

        let from = parse_currency("from", self.from.as_deref(), &mut errors);
        let to = parse_currency("to", self.to.as_deref(), &mut errors);

        let rate = match self.rate {
            Some(rate) if rate.is_finite() && rate >= 0.0 => Some(rate),
            Some(_) => {
                errors.push(FieldError::new("rate", "must be greater than or equal to 0"));
                None
            }
            None => {
                errors.push(FieldError::new("rate", "must not be null"));
                None
            }
        };

        let reported_on = match self.reported_on.as_deref() {
            Some(raw) => match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push(FieldError::new("reportedOn", "must be an ISO date (yyyy-MM-dd)"));
                    None
                }
            },
            None => {
                errors.push(FieldError::new("reportedOn", "must not be null"));
                None
            }
        };

        match (from, to, rate, reported_on) {
            (Some(from), Some(to), Some(rate), Some(reported_on)) if errors.is_empty() => {
                ensure_distinct(from, to)?;
                Ok(ExchangeRate::new(from, to, rate, reported_on))
            }
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

/// Query string shared by the lookup endpoints
/// (`?fromCurrencyCode=USD&toCurrencyCode=EUR`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairQuery {
    #[serde(default)]
    pub from_currency_code: Option<String>,
    #[serde(default)]
    pub to_currency_code: Option<String>,
}

impl PairQuery {
    pub fn validate(&self) -> ApiResult<CurrencyPair> {
        let mut errors = Vec::new();
        let from = parse_currency(
            "fromCurrencyCode",
            self.from_currency_code.as_deref(),
            &mut errors,
        );
        let to = parse_currency(
            "toCurrencyCode",
            self.to_currency_code.as_deref(),
            &mut errors,
        );

        match (from, to) {
            (Some(from), Some(to)) => {
                ensure_distinct(from, to)?;
                Ok(CurrencyPair::new(from, to))
            }
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

/// Parses an ISO date path segment (GET /currency/:iso_date).
pub fn parse_iso_date(raw: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ApiError::Validation(vec![FieldError::new(
            "isoDate",
            "must be an ISO date (yyyy-MM-dd)",
        )])
    })
}

fn parse_currency(
    field: &str,
    raw: Option<&str>,
    errors: &mut Vec<FieldError>,
) -> Option<CurrencyCode> {
    match raw {
        Some(raw) => match raw.parse() {
            Ok(code) => Some(code),
            Err(err) => {
                errors.push(FieldError::new(field, err.to_string()));
                None
            }
        },
        None => {
            errors.push(FieldError::new(field, "must not be blank"));
            None
        }
    }
}

fn ensure_distinct(from: CurrencyCode, to: CurrencyCode) -> ApiResult<()> {
    if from == to {
        return Err(ApiError::InvalidRequest(SAME_CURRENCY.to_string()));
    }
    Ok(())
}
