//! MCP tool implementations.
//!
//! This module contains all tools exposed by the caltrack server.

pub mod meal_calories;
pub mod product_calories;
pub mod refresh_products;

pub use meal_calories::{MealCaloriesParams, meal_calories_impl};
pub use product_calories::{ProductCaloriesParams, product_calories_impl};
pub use refresh_products::refresh_products_impl;
