//! Configuration for coordinator discovery.
//!
//! ```rust
//! use findcoord::client::DiscoveryConfig;
//! use std::time::Duration;
//!
//! let config = DiscoveryConfig::new("payments")
//!     .with_retry_backoff(Duration::from_millis(50), Duration::from_secs(2));
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use crate::constants::{
    COORDINATOR_DISCONNECT_LOGGING_INTERVAL_MS, DEFAULT_RETRY_BACKOFF_JITTER,
    DEFAULT_RETRY_BACKOFF_MAX_MS, DEFAULT_RETRY_BACKOFF_MS,
};

/// Settings for one group's coordinator discovery.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryConfig {
    /// Group whose coordinator is looked up. Must not be empty.
    pub group_id: String,

    /// Backoff floor after a failed lookup (Kafka `retry.backoff.ms`).
    /// Default: 100ms
    pub retry_backoff: Duration,

    /// Backoff ceiling (Kafka `retry.backoff.max.ms`).
    /// Default: 1s
    pub retry_backoff_max: Duration,

    /// Jitter ratio applied to each backoff, in `[0, 1)`.
    /// Default: 0.2
    pub retry_backoff_jitter: f64,

    /// Minimum time between two "still disconnected" warnings.
    /// Default: 60s
    pub disconnect_log_interval: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            group_id: String::new(),
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
            retry_backoff_max: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MAX_MS),
            retry_backoff_jitter: DEFAULT_RETRY_BACKOFF_JITTER,
            disconnect_log_interval: Duration::from_millis(
                COORDINATOR_DISCONNECT_LOGGING_INTERVAL_MS,
            ),
        }
    }
}

impl DiscoveryConfig {
    /// Defaults for `group_id`.
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            ..Default::default()
        }
    }

    pub fn with_retry_backoff(mut self, floor: Duration, ceiling: Duration) -> Self {
        self.retry_backoff = floor;
        self.retry_backoff_max = ceiling;
        self
    }

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.retry_backoff_jitter = jitter;
        self
    }

    pub fn with_disconnect_log_interval(mut self, interval: Duration) -> Self {
        self.disconnect_log_interval = interval;
        self
    }

    /// Validate the configuration and return every error found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.group_id.trim().is_empty() {
            errors.push("group_id must not be empty".to_string());
        }

        if self.retry_backoff_max < self.retry_backoff {
            errors.push(format!(
                "retry_backoff_max ({:?}) must not be less than retry_backoff ({:?})",
                self.retry_backoff_max, self.retry_backoff
            ));
        }

        if !(0.0..1.0).contains(&self.retry_backoff_jitter) {
            errors.push(format!(
                "retry_backoff_jitter ({}) must be in [0, 1)",
                self.retry_backoff_jitter
            ));
        }

        if self.disconnect_log_interval.is_zero() {
            errors.push("disconnect_log_interval must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Environment variables:
    /// - `GROUP_ID`: Consumer group id (required)
    /// - `RETRY_BACKOFF_MS`: Backoff floor (default: 100)
    /// - `RETRY_BACKOFF_MAX_MS`: Backoff ceiling (default: 1000)
    /// - `RETRY_BACKOFF_JITTER`: Jitter ratio (default: 0.2)
    /// - `COORDINATOR_DISCONNECT_LOG_INTERVAL_MS`: Warning interval (default: 60000)
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let defaults = Self::default();

        let group_id = std::env::var("GROUP_ID").map_err(|_| "GROUP_ID must be set")?;

        let retry_backoff_ms: u64 = match std::env::var("RETRY_BACKOFF_MS") {
            Ok(v) => v
                .parse()
                .map_err(|e| format!("Invalid RETRY_BACKOFF_MS: {}", e))?,
            Err(_) => defaults.retry_backoff.as_millis() as u64,
        };

        let retry_backoff_max_ms: u64 = match std::env::var("RETRY_BACKOFF_MAX_MS") {
            Ok(v) => v
                .parse()
                .map_err(|e| format!("Invalid RETRY_BACKOFF_MAX_MS: {}", e))?,
            Err(_) => defaults.retry_backoff_max.as_millis() as u64,
        };

        let retry_backoff_jitter: f64 = std::env::var("RETRY_BACKOFF_JITTER")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.retry_backoff_jitter);

        let disconnect_log_interval_ms: u64 =
            std::env::var("COORDINATOR_DISCONNECT_LOG_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.disconnect_log_interval.as_millis() as u64);

        let config = Self {
            group_id,
            retry_backoff: Duration::from_millis(retry_backoff_ms),
            retry_backoff_max: Duration::from_millis(retry_backoff_max_ms),
            retry_backoff_jitter,
            disconnect_log_interval: Duration::from_millis(disconnect_log_interval_ms),
        };

        config.validate().map_err(|errors| errors.join("; "))?;
        Ok(config)
    }
}
