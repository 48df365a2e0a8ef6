//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Longest accepted cache retention, in days (100 years).
pub const MAX_RETENTION_DAYS: u64 = 36_500;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `max_concurrent_fetches` is 0 or above 64
    /// - `retention_days` is 0 or above [`MAX_RETENTION_DAYS`]
    /// - `sweep_interval_secs` is 0
    /// - `user_agent` is empty
    /// - `oembed_endpoint` is not an http(s) URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.max_concurrent_fetches == 0 || self.max_concurrent_fetches > 64 {
            return Err(ConfigError::Invalid {
                field: "max_concurrent_fetches".into(),
                reason: "must be between 1 and 64".into(),
            });
        }

        if self.retention_days == 0 {
            return Err(ConfigError::Invalid { field: "retention_days".into(), reason: "must be at least 1".into() });
        }
        if self.retention_days > MAX_RETENTION_DAYS {
            return Err(ConfigError::Invalid {
                field: "retention_days".into(),
                reason: format!("must not exceed {MAX_RETENTION_DAYS}"),
            });
        }

        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "sweep_interval_secs".into(),
                reason: "must be at least 1".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if !(self.oembed_endpoint.starts_with("https://") || self.oembed_endpoint.starts_with("http://")) {
            return Err(ConfigError::Invalid {
                field: "oembed_endpoint".into(),
                reason: "must be an http(s) URL".into(),
            });
        }

        if self.timeout_ms > 60_000 {
            tracing::warn!(timeout_ms = self.timeout_ms, "fetch timeout above one minute; slow pages hold permits");
        }

        Ok(())
    }
}
