//! API Routes
//!
//! Configures the Axum router with all exchange-rate endpoints.

use axum::{
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    health_handler, history_handler, latest_handler, rate_for_date_handler, set_rate_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /currency` - Record a rate
/// - `GET /currency` - Rate history for a pair
/// - `GET /currency/latest` - Most recent rate for a pair
/// - `GET /currency/:iso_date` - Rate for a pair on a date
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/currency", get(history_handler).post(set_rate_handler))
        .route("/currency/latest", get(latest_handler))
        .route("/currency/:iso_date", get(rate_for_date_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
