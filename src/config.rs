//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Lifetime in seconds of a stored rate after its last read or write
    pub default_lifetime: u64,
    /// Latency budget per request in milliseconds
    pub request_timeout_ms: u64,
    /// Background sweep interval in seconds, 0 disables the sweep
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `DEFAULT_LIFETIME_SECS` - Rate lifetime in seconds (default: 259200, three days)
    /// - `REQUEST_TIMEOUT_MS` - Per-request latency budget (default: 10)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            default_lifetime: env_or("DEFAULT_LIFETIME_SECS", defaults.default_lifetime),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", defaults.request_timeout_ms),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
        }
    }

    pub fn default_lifetime(&self) -> Duration {
        Duration::from_secs(self.default_lifetime)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            default_lifetime: 3 * 24 * 60 * 60,
            request_timeout_ms: 10,
            cleanup_interval: 60,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DEFAULT_LIFETIME;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.default_lifetime(), DEFAULT_LIFETIME);
        assert_eq!(config.request_timeout(), Duration::from_millis(10));
        assert_eq!(config.cleanup_interval, 60);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SERVER_PORT");
        env::remove_var("DEFAULT_LIFETIME_SECS");
        env::remove_var("REQUEST_TIMEOUT_MS");
        env::remove_var("CLEANUP_INTERVAL");

        let config = Config::from_env();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.default_lifetime, 259_200);
        assert_eq!(config.request_timeout_ms, 10);
        assert_eq!(config.cleanup_interval, 60);
    }

    #[test]
    fn test_env_or_ignores_unparsable_values() {
        env::set_var("RATE_CACHE_TEST_BOGUS", "not-a-number");
        assert_eq!(env_or("RATE_CACHE_TEST_BOGUS", 42u64), 42);
        env::remove_var("RATE_CACHE_TEST_BOGUS");
    }
}
