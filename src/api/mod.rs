//! API Module
//!
//! HTTP handlers and routing for the exchange-rate REST API.
//!
//! # Endpoints
//! - `POST /currency` - Record a rate for a currency pair and day
//! - `GET /currency` - Rate history for a pair
//! - `GET /currency/latest` - Most recent rate for a pair
//! - `GET /currency/:iso_date` - Rate for a pair on a date
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
