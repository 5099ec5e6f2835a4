//! Client code for caltrack.
//!
//! This crate provides the nutrition API client and the services built on
//! top of it and the product cache: the read-through `ProductFinder` and the
//! batch `ProductUpdater`. Shared by the server and CLI.

pub mod finder;
pub mod nutrition;
pub mod updater;

#[cfg(test)]
pub(crate) mod testing;

pub use finder::ProductFinder;
pub use nutrition::{NutritionClient, NutritionConfig, NutritionError, NutritionItem, NutritionSource};
pub use updater::{ProductUpdater, RefreshReport};
