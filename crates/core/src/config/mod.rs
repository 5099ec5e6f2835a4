//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (CALTRACK_*)
//! 2. TOML config file (if CALTRACK_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (CALTRACK_*)
/// 2. TOML config file (if CALTRACK_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Nutrition API key sent as `X-Api-Key`.
    ///
    /// Set via CALTRACK_NUTRITION_API_KEY environment variable.
    /// Required only when the nutrition API is called.
    #[serde(default)]
    pub nutrition_api_key: Option<String>,

    /// Nutrition API endpoint.
    ///
    /// Set via CALTRACK_NUTRITION_API_URL environment variable.
    #[serde(default = "default_nutrition_api_url")]
    pub nutrition_api_url: String,

    /// Path to SQLite product cache database.
    ///
    /// Set via CALTRACK_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via CALTRACK_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via CALTRACK_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Minimum spacing between nutrition API requests in milliseconds.
    ///
    /// Set via CALTRACK_MIN_REQUEST_INTERVAL_MS environment variable. 0 disables.
    #[serde(default)]
    pub min_request_interval_ms: u64,

    /// Number of products per nutrition API request during a refresh.
    ///
    /// Set via CALTRACK_BATCH_SIZE environment variable.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Seconds between scheduled refreshes of the product cache.
    ///
    /// Set via CALTRACK_REFRESH_INTERVAL_SECS environment variable. 0 disables.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

fn default_nutrition_api_url() -> String {
    "https://api.api-ninjas.com/v1/nutrition".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./caltrack.sqlite")
}

fn default_user_agent() -> String {
    "caltrack/0.1".into()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_batch_size() -> usize {
    50
}

fn default_refresh_interval_secs() -> u64 {
    86_400 // daily
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nutrition_api_key: None,
            nutrition_api_url: default_nutrition_api_url(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            min_request_interval_ms: 0,
            batch_size: default_batch_size(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Minimum request spacing as Duration.
    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    /// Refresh period, or None when scheduled refreshes are disabled.
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `CALTRACK_`
    /// 2. TOML file from `CALTRACK_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("CALTRACK_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("CALTRACK_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check if the nutrition API key is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the key is not set or blank.
    pub fn require_nutrition_api_key(&self) -> Result<&str, ConfigError> {
        self.nutrition_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "nutrition_api_key".into(),
                hint: "Set CALTRACK_NUTRITION_API_KEY environment variable".into(),
            })
    }
}
