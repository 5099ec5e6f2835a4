//! product_calories tool implementation.
//!
//! Resolves calories per 100 g/ml through the product cache, falling back to
//! the nutrition API on a miss.

use caltrack_client::ProductFinder;
use caltrack_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the product_calories tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProductCaloriesParams {
    /// Product name, matched exactly (e.g., "watermelon").
    pub product_name: String,
}

/// Output from the product_calories tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProductCaloriesOutput {
    pub product_name: String,
    /// Calories per 100 g/ml.
    pub calories: f64,
}

/// Implementation of the product_calories tool.
pub async fn product_calories_impl(
    finder: &ProductFinder, params: ProductCaloriesParams,
) -> Result<CallToolResult, McpError> {
    let calories = finder.find(&params.product_name).await?;

    let output = ProductCaloriesOutput { product_name: params.product_name, calories };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
