//! meal_calories tool implementation.
//!
//! Computes the calories of a portion the way a meal record stores them:
//! `round(portion_size / 100 * calories)`, ties to even.

use caltrack_client::ProductFinder;
use caltrack_core::{Error, PortionCalories};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the meal_calories tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MealCaloriesParams {
    /// Product name, matched exactly.
    pub product_name: String,

    /// Portion size in grams or milliliters (at least 1).
    pub portion_size: u32,
}

/// Implementation of the meal_calories tool.
pub async fn meal_calories_impl(finder: &ProductFinder, params: MealCaloriesParams) -> Result<CallToolResult, McpError> {
    let portion: PortionCalories = finder
        .find_portion(&params.product_name, params.portion_size)
        .await?;

    let json = serde_json::to_string_pretty(&portion)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
