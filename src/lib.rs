//! Rate Cache - An exchange-rate service on a self-expiring cache
//!
//! The core is [`cache::ExpiringCache`], a key/value store with per-entry
//! lifetimes, sliding expiration and expiration listeners. The REST layer
//! keeps one cache per currency pair, keyed by reporting day.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod tasks;

pub use api::AppState;
pub use cache::ExpiringCache;
pub use config::Config;
pub use repository::RateRepository;
pub use tasks::spawn_cleanup_task;
