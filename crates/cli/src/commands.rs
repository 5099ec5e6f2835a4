//! Subcommand implementations.
//!
//! Each command returns the text to print so it can be tested without
//! capturing stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use caltrack_client::{NutritionClient, ProductFinder, ProductUpdater};
use caltrack_core::{AppConfig, PortionCalories, ProductDb, ProductStore};

fn nutrition_client(config: &AppConfig) -> Result<Arc<NutritionClient>> {
    let client = NutritionClient::from_app_config(config).context("creating nutrition API client")?;
    Ok(Arc::new(client))
}

/// Calories per 100 g/ml, from the cache when possible.
///
/// The nutrition API client is only built on a cache miss, so cached
/// products resolve without an API key.
async fn resolve(config: &AppConfig, db: ProductDb, name: &str) -> Result<f64> {
    if let Some(calories) = db.lookup(name).await? {
        tracing::debug!(product = name, calories, "product cache hit");
        return Ok(calories);
    }
    let finder = ProductFinder::new(Arc::new(db), nutrition_client(config)?);
    Ok(finder.find(name).await?)
}

pub async fn find(config: &AppConfig, db: ProductDb, name: &str) -> Result<String> {
    let calories = resolve(config, db, name).await?;
    Ok(format!("100 g/ml of {name} = {calories} kcal"))
}

pub async fn meal(config: &AppConfig, db: ProductDb, name: &str, portion_size: u32) -> Result<String> {
    let calories = resolve(config, db, name).await?;
    let portion = PortionCalories::new(name, portion_size, calories)?;
    Ok(format!(
        "{} g/ml of {} = {} kcal ({} kcal per 100)",
        portion.portion_size, portion.product_name, portion.portion_calories, portion.calories_per_100
    ))
}

pub async fn refresh(config: &AppConfig, db: ProductDb, batch_size: usize) -> Result<String> {
    let updater = ProductUpdater::new(Arc::new(db), nutrition_client(config)?, batch_size)?;
    tracing::debug!(batch_size, "starting product refresh");
    let report = updater.update().await?;
    tracing::debug!(pages = report.pages, skipped_pages = report.skipped_pages, "product refresh done");
    Ok(format!(
        "checked {} products in {} pages ({} skipped), updated {}",
        report.checked, report.pages, report.skipped_pages, report.updated
    ))
}

pub async fn list(db: &ProductDb) -> Result<String> {
    let products = db.list_all().await?;
    if products.is_empty() {
        return Ok("product cache is empty".to_string());
    }

    let lines: Vec<String> = products
        .iter()
        .map(|p| format!("{:>6}  {:<50}  {:>8.1}  {}", p.id, p.name, p.calories, p.updated_at))
        .collect();
    Ok(lines.join("\n"))
}

pub async fn set(db: &ProductDb, name: &str, calories: f64) -> Result<String> {
    db.upsert(name, calories).await?;
    Ok(format!("100 g/ml of {name} = {calories} kcal"))
}

pub async fn reset(db: &ProductDb, calories: f64) -> Result<String> {
    let count = db.reset_calories(calories).await?;
    Ok(format!("reset {count} products to {calories} kcal"))
}
