//! Environment loading for the upstream HTTP client.

use crate::services::upstream::{CircuitBreakerConfig, RetryConfig, UpstreamClientConfig};
use std::env;
use std::str::FromStr;

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl UpstreamClientConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            read_timeout_seconds: env_parse("UPSTREAM_HTTP_READ_TIMEOUT", 5),
            write_timeout_seconds: env_parse("UPSTREAM_HTTP_WRITE_TIMEOUT", 10),
            connect_timeout_seconds: env_parse("UPSTREAM_HTTP_CONNECT_TIMEOUT", 3),
            retry: RetryConfig::from_env(),
            circuit_breaker: CircuitBreakerConfig::from_env(),
        }
    }
}

impl RetryConfig {
    /// Load retry configuration from environment variables
    pub fn from_env() -> Self {
        let retry_on_status = env::var("UPSTREAM_HTTP_RETRY_ON_STATUS")
            .ok()
            .map(|v| {
                v.split(',')
                    .filter_map(|s| s.trim().parse::<u16>().ok())
                    .collect()
            })
            .unwrap_or_else(|| vec![408, 429, 500, 502, 503, 504]);

        Self {
            max_attempts: env_parse("UPSTREAM_HTTP_RETRY_MAX_ATTEMPTS", 3),
            initial_delay_ms: env_parse("UPSTREAM_HTTP_RETRY_INITIAL_DELAY_MS", 100),
            max_delay_ms: env_parse("UPSTREAM_HTTP_RETRY_MAX_DELAY_MS", 5_000),
            retry_on_status,
        }
    }
}

impl CircuitBreakerConfig {
    /// Load circuit breaker configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            failure_threshold: env_parse("UPSTREAM_HTTP_CB_FAILURE_THRESHOLD", 5),
            success_threshold: env_parse("UPSTREAM_HTTP_CB_SUCCESS_THRESHOLD", 3),
            timeout_seconds: env_parse("UPSTREAM_HTTP_CB_TIMEOUT_SECONDS", 60),
        }
    }
}
