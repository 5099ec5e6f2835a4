//! refresh_products tool implementation.
//!
//! Runs one product refresh immediately instead of waiting for the scheduler.

use caltrack_client::{ProductUpdater, RefreshReport};
use caltrack_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output from the refresh_products tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RefreshProductsOutput {
    /// Products per nutrition API request.
    pub batch_size: usize,
    /// Pages read from the cache.
    pub pages: usize,
    /// Pages skipped because the nutrition API failed.
    pub skipped_pages: usize,
    /// Products checked.
    pub checked: usize,
    /// Products whose calories changed.
    pub updated: u64,
}

impl RefreshProductsOutput {
    fn new(batch_size: usize, report: RefreshReport) -> Self {
        Self {
            batch_size,
            pages: report.pages,
            skipped_pages: report.skipped_pages,
            checked: report.checked,
            updated: report.updated,
        }
    }
}

/// Implementation of the refresh_products tool.
pub async fn refresh_products_impl(updater: &ProductUpdater) -> Result<CallToolResult, McpError> {
    let report = updater.update().await?;

    let output = RefreshProductsOutput::new(updater.batch_size(), report);
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
