//! Nutrition API client.
//!
//! Looks up calories per 100 g/ml for one or more products.
//!
//! ### Protocol
//!
//! - **Endpoint**: `GET {base_url}?query={names joined by ", "}`
//! - **Authentication**: Uses `X-Api-Key` header.
//! - **Results**: JSON array of `{name, calories, ...}`. Names the provider
//!   can't resolve are simply absent; an empty array means not found.
//! - **Failures**: any non-200 status is reported as unavailable. No retries
//!   at this layer.
//! - **Rate Limiting**: optional minimum spacing between requests.

pub mod error;
pub mod response;

pub use error::NutritionError;
pub use response::NutritionItem;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use caltrack_core::AppConfig;
use reqwest::{StatusCode, header};
use tokio::sync::Mutex;
use url::Url;

/// Default nutrition API endpoint.
const DEFAULT_BASE_URL: &str = "https://api.api-ninjas.com/v1/nutrition";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "caltrack/0.1";

/// Separator between product names in a multi-product query.
const QUERY_SEPARATOR: &str = ", ";

/// Source of calorie values for products.
///
/// Implemented by `NutritionClient`; the finder and updater only depend on
/// this trait.
#[async_trait::async_trait]
pub trait NutritionSource: Send + Sync {
    /// Calories of the first match for a single product name.
    async fn single_product_calories(&self, product_name: &str) -> Result<f64, NutritionError>;

    /// Calories for every name the provider resolves.
    async fn multiple_products_calories(
        &self, product_names: &[String],
    ) -> Result<HashMap<String, f64>, NutritionError>;
}

/// Nutrition API client configuration.
#[derive(Debug, Clone)]
pub struct NutritionConfig {
    /// API key sent as `X-Api-Key`.
    pub api_key: String,
    /// Endpoint URL (default: https://api.api-ninjas.com/v1/nutrition).
    pub base_url: String,
    /// Request timeout (default: 10s).
    pub timeout: Duration,
    /// User-agent string (default: caltrack/0.x).
    pub user_agent: String,
    /// Minimum spacing between requests (default: none).
    pub min_interval: Duration,
}

impl Default for NutritionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            min_interval: Duration::ZERO,
        }
    }
}

impl NutritionConfig {
    /// Build client configuration from the application configuration.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, NutritionError> {
        let api_key = config
            .require_nutrition_api_key()
            .map_err(|_| NutritionError::MissingApiKey)?
            .to_string();

        Ok(Self {
            api_key,
            base_url: config.nutrition_api_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
            min_interval: config.min_request_interval(),
        })
    }
}

/// Rate limiter to enforce request intervals.
#[derive(Debug)]
struct RateLimiter {
    last_request: Mutex<Instant>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(Instant::now().checked_sub(min_interval).unwrap_or_else(Instant::now)),
            min_interval,
        }
    }

    /// Acquire permission to make a request, waiting if necessary.
    async fn acquire(&self) {
        if self.min_interval.is_zero() {
            return;
        }
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < self.min_interval {
            tokio::time::sleep(self.min_interval - elapsed).await;
        }
        *last = Instant::now();
    }
}

/// HTTP client for the nutrition API.
#[derive(Debug, Clone)]
pub struct NutritionClient {
    http: reqwest::Client,
    base_url: Url,
    config: NutritionConfig,
    rate_limiter: Arc<RateLimiter>,
}

impl NutritionClient {
    /// Create a new client with the given configuration.
    pub fn new(config: NutritionConfig) -> Result<Self, NutritionError> {
        if config.api_key.trim().is_empty() {
            return Err(NutritionError::MissingApiKey);
        }

        let base_url = Url::parse(&config.base_url).map_err(|e| NutritionError::InvalidBaseUrl(e.to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NutritionError::Network(Arc::new(e)))?;

        let rate_limiter = Arc::new(RateLimiter::new(config.min_interval));
        Ok(Self { http, base_url, config, rate_limiter })
    }

    /// Create a new client from the application configuration.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, NutritionError> {
        Self::new(NutritionConfig::from_app_config(config)?)
    }

    /// Run one query and return the decoded, non-empty item list.
    async fn fetch(&self, query: &str) -> Result<Vec<NutritionItem>, NutritionError> {
        self.rate_limiter.acquire().await;

        let start = Instant::now();
        tracing::debug!(query, "querying nutrition API");

        let http_response = self
            .http
            .get(self.base_url.clone())
            .header("X-Api-Key", &self.config.api_key)
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, &self.config.user_agent)
            .query(&[("query", query)])
            .send()
            .await?;

        let status = http_response.status();
        tracing::debug!(%status, "nutrition API response status");

        if status != StatusCode::OK {
            return Err(NutritionError::Unavailable { status: status.as_u16() });
        }

        let bytes = http_response.bytes().await?;
        let items = response::parse_items(&bytes)?;

        tracing::debug!("nutrition query completed in {:?}, {} items", start.elapsed(), items.len());

        Ok(items)
    }
}

#[async_trait::async_trait]
impl NutritionSource for NutritionClient {
    async fn single_product_calories(&self, product_name: &str) -> Result<f64, NutritionError> {
        let items = self.fetch(product_name).await?;
        items
            .into_iter()
            .next()
            .map(|item| item.calories)
            .ok_or(NutritionError::ProductNotFound)
    }

    async fn multiple_products_calories(
        &self, product_names: &[String],
    ) -> Result<HashMap<String, f64>, NutritionError> {
        if product_names.is_empty() {
            return Err(NutritionError::ProductNotFound);
        }
        let items = self.fetch(&product_names.join(QUERY_SEPARATOR)).await?;
        Ok(response::calories_by_name(items))
    }
}
