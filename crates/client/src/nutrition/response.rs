//! Nutrition API response types.

use std::collections::HashMap;

use serde::Deserialize;

use super::NutritionError;

/// One element of the provider's JSON array.
///
/// The provider returns many nutrient fields; only name and calories are
/// read, so additions on their side don't break decoding.
#[derive(Debug, Clone, Deserialize)]
pub struct NutritionItem {
    pub name: String,
    pub calories: f64,
}

/// Decode a response body into a non-empty item list.
pub(crate) fn parse_items(body: &[u8]) -> Result<Vec<NutritionItem>, NutritionError> {
    let items: Vec<NutritionItem> = serde_json::from_slice(body).map_err(|e| NutritionError::Parse(e.to_string()))?;
    if items.is_empty() {
        return Err(NutritionError::ProductNotFound);
    }
    Ok(items)
}

/// Map each returned item's name to its calories.
///
/// Later duplicates overwrite earlier ones.
pub(crate) fn calories_by_name(items: Vec<NutritionItem>) -> HashMap<String, f64> {
    items.into_iter().map(|item| (item.name, item.calories)).collect()
}
