//! Read-through product calorie lookup.
//!
//! The finder answers from the product cache when it can. On a miss it asks
//! the nutrition API and stores the answer before returning it. Negative
//! results are never cached.

use std::sync::Arc;

use caltrack_core::{Error, PortionCalories, ProductStore};

use crate::nutrition::{NutritionError, NutritionSource};

/// Resolves calories per 100 g/ml for a product name.
#[derive(Clone)]
pub struct ProductFinder {
    store: Arc<dyn ProductStore>,
    source: Arc<dyn NutritionSource>,
}

impl ProductFinder {
    pub fn new(store: Arc<dyn ProductStore>, source: Arc<dyn NutritionSource>) -> Self {
        Self { store, source }
    }

    /// Calories per 100 g/ml of `product_name`.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidInput` for a blank name
    /// - `Error::ProductNotFound` when neither the cache nor the API knows the product
    /// - `Error::NutritionApiUnavailable` when the API call fails
    /// - `Error::InvalidProduct` when the API answer cannot be stored
    pub async fn find(&self, product_name: &str) -> Result<f64, Error> {
        if product_name.trim().is_empty() {
            return Err(Error::InvalidInput("product_name cannot be empty".into()));
        }

        if let Some(calories) = self.store.lookup(product_name).await? {
            tracing::debug!(product = product_name, calories, "product cache hit");
            return Ok(calories);
        }

        tracing::debug!(product = product_name, "product cache miss, querying nutrition API");

        let calories = self
            .source
            .single_product_calories(product_name)
            .await
            .map_err(|e| match e {
                NutritionError::ProductNotFound => Error::ProductNotFound(product_name.to_string()),
                other => Error::from(other),
            })?;

        self.store
            .upsert(product_name, calories)
            .await
            .inspect_err(|e| tracing::error!(product = product_name, calories, error = %e, "failed to cache product"))?;

        tracing::info!(product = product_name, calories, "cached new product");
        Ok(calories)
    }

    /// Calories of a `portion_size` g/ml serving of `product_name`.
    pub async fn find_portion(&self, product_name: &str, portion_size: u32) -> Result<PortionCalories, Error> {
        if portion_size == 0 {
            return Err(Error::InvalidInput("portion_size must be at least 1".into()));
        }
        let calories = self.find(product_name).await?;
        PortionCalories::new(product_name, portion_size, calories)
    }
}
