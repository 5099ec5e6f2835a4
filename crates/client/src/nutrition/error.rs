//! Nutrition API client error types.

use std::sync::Arc;

use caltrack_core::Error;

/// Errors from the nutrition API client.
#[derive(Debug, thiserror::Error)]
pub enum NutritionError {
    /// No API key configured.
    #[error("missing API key: CALTRACK_NUTRITION_API_KEY not set")]
    MissingApiKey,

    /// Base URL could not be parsed.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The provider answered with an empty result set.
    #[error("no such product in the nutrition database or invalid product name")]
    ProductNotFound,

    /// The provider answered with a non-200 status.
    #[error("nutrition API unavailable: HTTP {status}")]
    Unavailable { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl NutritionError {
    /// Whether the provider simply had no match, as opposed to failing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, NutritionError::ProductNotFound)
    }
}

impl From<reqwest::Error> for NutritionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { NutritionError::Timeout } else { NutritionError::Network(Arc::new(err)) }
    }
}

impl From<NutritionError> for Error {
    fn from(err: NutritionError) -> Self {
        match err {
            NutritionError::ProductNotFound => Error::ProductNotFound(err.to_string()),
            NutritionError::MissingApiKey | NutritionError::InvalidBaseUrl(_) => Error::InvalidInput(err.to_string()),
            _ => Error::NutritionApiUnavailable(err.to_string()),
        }
    }
}
