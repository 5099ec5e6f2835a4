//! Portion calorie arithmetic.
//!
//! Cached calorie values are per 100 g/ml. A meal or activity record stores
//! the calories of the actual portion, rounded half-to-even to an integer.

use serde::{Deserialize, Serialize};

use crate::Error;

/// Calories of a concrete portion of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PortionCalories {
    pub product_name: String,
    /// Portion size in grams or milliliters.
    pub portion_size: u32,
    /// Calories per 100 g/ml of the product.
    pub calories_per_100: f64,
    pub portion_calories: i64,
}

/// Compute `round(portion_size / 100 * calories_per_100)`.
///
/// Ties round to even, so 2.5 becomes 2 and 3.5 becomes 4.
///
/// # Errors
///
/// Returns `Error::InvalidInput` if `portion_size` is zero or the calorie
/// value is negative or not finite.
pub fn portion_calories(portion_size: u32, calories_per_100: f64) -> Result<i64, Error> {
    if portion_size == 0 {
        return Err(Error::InvalidInput("portion_size must be at least 1".into()));
    }
    if !calories_per_100.is_finite() || calories_per_100 < 0.0 {
        return Err(Error::InvalidInput(format!("invalid calorie value: {calories_per_100}")));
    }

    let scaled = f64::from(portion_size) / 100.0 * calories_per_100;
    Ok(scaled.round_ties_even() as i64)
}

impl PortionCalories {
    /// Build a portion record for a product with a known calorie value.
    pub fn new(product_name: impl Into<String>, portion_size: u32, calories_per_100: f64) -> Result<Self, Error> {
        let portion_calories = portion_calories(portion_size, calories_per_100)?;
        Ok(Self { product_name: product_name.into(), portion_size, calories_per_100, portion_calories })
    }
}
