//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

/// Largest accepted refresh batch.
const MAX_BATCH_SIZE: usize = 1_000;

/// Longest accepted refresh period: one year.
const MAX_REFRESH_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `nutrition_api_url` is not an http(s) URL
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `min_request_interval_ms` exceeds one minute
    /// - `batch_size` is 0 or exceeds 1000
    /// - `user_agent` is empty
    /// - `refresh_interval_secs` exceeds one year
    pub fn validate(&self) -> Result<(), ConfigError> {
        match url::Url::parse(&self.nutrition_api_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::Invalid {
                    field: "nutrition_api_url".into(),
                    reason: format!("unsupported scheme: {}", url.scheme()),
                });
            }
            Err(e) => {
                return Err(ConfigError::Invalid { field: "nutrition_api_url".into(), reason: e.to_string() });
            }
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

        if self.min_request_interval_ms > 60_000 {
            return Err(ConfigError::Invalid {
                field: "min_request_interval_ms".into(),
                reason: "must not exceed one minute (60000ms)".into(),
            });
        }

        if self.batch_size == 0 {
            return Err(ConfigError::Invalid { field: "batch_size".into(), reason: "must be greater than 0".into() });
        }
        if self.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::Invalid {
                field: "batch_size".into(),
                reason: format!("must not exceed {MAX_BATCH_SIZE}"),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.refresh_interval_secs > MAX_REFRESH_INTERVAL_SECS {
            return Err(ConfigError::Invalid {
                field: "refresh_interval_secs".into(),
                reason: format!("must not exceed one year ({MAX_REFRESH_INTERVAL_SECS}s)"),
            });
        }
        if self.refresh_interval_secs > 0 && self.refresh_interval_secs < 60 {
            tracing::warn!(
                refresh_interval_secs = self.refresh_interval_secs,
                "refresh interval under a minute will hit the nutrition API continuously"
            );
        }

        Ok(())
    }
}
