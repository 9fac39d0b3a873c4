//! API Handlers
//!
//! HTTP request handlers for each exchange-rate endpoint.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::models::{parse_iso_date, ExchangeRate, HealthResponse, PairQuery, SetRateRequest};
use crate::repository::RateRepository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Rate store, one expiring cache per currency pair
    pub repository: Arc<RateRepository>,
    /// Latency budget applied to every repository call
    pub request_timeout: Duration,
}

impl AppState {
    /// Creates a new AppState around an existing repository.
    pub fn new(repository: RateRepository, request_timeout: Duration) -> Self {
        Self {
            repository: Arc::new(repository),
            request_timeout,
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &crate::config::Config) -> Self {
        let repository = RateRepository::new(config.default_lifetime());
        Self::new(repository, config.request_timeout())
    }

    /// Runs `work` under the request's latency budget.
    ///
    /// On overrun the future is dropped at its current await point and the
    /// request fails with [`ApiError::Timeout`].
    async fn within_budget<F, T>(&self, operation: &'static str, work: F) -> ApiResult<T>
    where
        F: Future<Output = T>,
    {
        tokio::time::timeout(self.request_timeout, work)
            .await
            .map_err(|_| {
                warn!(
                    operation = operation,
                    budget_ms = self.request_timeout.as_millis() as u64,
                    "Request exceeded its latency budget"
                );
                ApiError::Timeout
            })
    }
}

/// Handler for POST /currency
///
/// Records the exchange rate for a currency pair on a given day.
pub async fn set_rate_handler(
    State(state): State<AppState>,
    payload: Result<Json<SetRateRequest>, JsonRejection>,
) -> ApiResult<Json<ExchangeRate>> {
    let Json(req) = payload.map_err(|rejection| ApiError::InvalidRequest(rejection.body_text()))?;
    let rate = req.validate()?;

    let saved = state
        .within_budget("save", state.repository.save(rate))
        .await?;

    Ok(Json(saved))
}

/// Handler for GET /currency
///
/// Returns every retained rate for the pair, oldest first.
pub async fn history_handler(
    State(state): State<AppState>,
    Query(query): Query<PairQuery>,
) -> ApiResult<Json<Vec<ExchangeRate>>> {
    let pair = query.validate()?;

    let rates = state
        .within_budget("history", state.repository.find_all(pair))
        .await?;

    Ok(Json(rates))
}

/// Handler for GET /currency/latest
///
/// Returns the most recent retained rate for the pair, or 404.
pub async fn latest_handler(
    State(state): State<AppState>,
    Query(query): Query<PairQuery>,
) -> ApiResult<Json<ExchangeRate>> {
    let pair = query.validate()?;

    state
        .within_budget("latest", state.repository.find_latest(pair))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No exchange rate found for {pair}")))
}

/// Handler for GET /currency/:iso_date
///
/// Returns the rate reported for the pair on the given ISO date, or 404.
pub async fn rate_for_date_handler(
    State(state): State<AppState>,
    Path(iso_date): Path<String>,
    Query(query): Query<PairQuery>,
) -> ApiResult<Json<ExchangeRate>> {
    let date = parse_iso_date(&iso_date)?;
    let pair = query.validate()?;

    state
        .within_budget("for_date", state.repository.find_for_date(pair, date))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No exchange rate found for {pair} on {date}")))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
