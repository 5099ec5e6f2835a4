//! Unified error types for caltrack.
//!
//! The display prefix of each variant is a stable code that callers can
//! match on without depending on the message text.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for product lookup and caching.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., blank product name).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Neither the cache nor the nutrition provider knows the product.
    #[error("PRODUCT_NOT_FOUND: {0}")]
    ProductNotFound(String),

    /// The nutrition provider could not be reached or answered with an error.
    #[error("NUTRITION_API_UNAVAILABLE: {0}")]
    NutritionApiUnavailable(String),

    /// A resolved product could not be persisted.
    #[error("INVALID_PRODUCT: {0}")]
    InvalidProduct(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::ProductNotFound(msg) => (-32001, msg.clone()),
            Error::NutritionApiUnavailable(msg) => (-32003, msg.clone()),
            Error::InvalidProduct(msg) => (-32004, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ProductNotFound("abracadabra".to_string());
        assert!(err.to_string().contains("PRODUCT_NOT_FOUND"));
        assert!(err.to_string().contains("abracadabra"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::ProductNotFound("abracadabra".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32001);

        let err = Error::InvalidInput("blank".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32602);
    }
}
