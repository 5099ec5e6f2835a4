//! Batch refresh of cached product calories.
//!
//! Walks the product cache in id order, one page of `batch_size` rows at a
//! time, asks the nutrition API for the whole page in one request and writes
//! back only the values that changed. A failed API call skips its page; a
//! failing store aborts the run.

use std::collections::HashMap;
use std::sync::Arc;

use caltrack_core::{Error, Product, ProductStore};
use serde::{Deserialize, Serialize};

use crate::nutrition::NutritionSource;

/// Summary of one refresh run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshReport {
    /// Pages read from the cache.
    pub pages: usize,
    /// Pages whose API lookup failed and were left untouched.
    pub skipped_pages: usize,
    /// Products read from the cache.
    pub checked: usize,
    /// Products whose calories were overwritten.
    pub updated: u64,
}

/// Re-fetches calories for every cached product.
#[derive(Clone)]
pub struct ProductUpdater {
    store: Arc<dyn ProductStore>,
    source: Arc<dyn NutritionSource>,
    batch_size: usize,
}

impl ProductUpdater {
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `batch_size` is 0.
    pub fn new(
        store: Arc<dyn ProductStore>, source: Arc<dyn NutritionSource>, batch_size: usize,
    ) -> Result<Self, Error> {
        if batch_size == 0 {
            return Err(Error::InvalidInput("batch_size must be at least 1".into()));
        }
        Ok(Self { store, source, batch_size })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Refresh every cached product, page by page.
    ///
    /// Pages are processed strictly in sequence. Paging is keyed on the last
    /// seen id, so products added during the run land on later pages and no
    /// product is visited twice.
    ///
    /// # Errors
    ///
    /// Only store failures are returned. API failures skip the affected page.
    pub async fn update(&self) -> Result<RefreshReport, Error> {
        let mut report = RefreshReport::default();
        let mut after_id = 0;

        loop {
            let page = self.store.list_page(after_id, self.batch_size).await?;
            let Some(last) = page.last() else {
                break;
            };
            after_id = last.id;
            report.pages += 1;
            report.checked += page.len();

            let names: Vec<String> = page.iter().map(|p| p.name.clone()).collect();
            let fresh = match self.source.multiple_products_calories(&names).await {
                Ok(fresh) => fresh,
                Err(e) => {
                    tracing::warn!(
                        page = report.pages,
                        products = names.len(),
                        not_found = e.is_not_found(),
                        error = %e,
                        "skipping page"
                    );
                    report.skipped_pages += 1;
                    continue;
                }
            };

            let changed = stale_products(page, &fresh);
            if changed.is_empty() {
                tracing::debug!(page = report.pages, "page up to date");
                continue;
            }

            let updated = self.store.bulk_update(&changed).await?;
            tracing::debug!(page = report.pages, updated, "page refreshed");
            report.updated += updated;
        }

        tracing::info!(
            pages = report.pages,
            skipped_pages = report.skipped_pages,
            checked = report.checked,
            updated = report.updated,
            "product refresh finished"
        );

        Ok(report)
    }
}

/// Products whose fresh calorie value differs from the cached one.
///
/// Products missing from `fresh` are left alone, as are fresh values that
/// could not be stored.
fn stale_products(page: Vec<Product>, fresh: &HashMap<String, f64>) -> Vec<Product> {
    page.into_iter()
        .filter_map(|product| {
            let calories = *fresh.get(&product.name)?;
            if calories == product.calories {
                return None;
            }
            if let Err(e) = Product::validate(&product.name, calories) {
                tracing::warn!(product = %product.name, error = %e, "ignoring refreshed value");
                return None;
            }
            Some(Product { calories, ..product })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ClosedStore, FakeNutrition, RecordingStore};

    const FIVE: &[(&str, f64)] =
        &[("apple", 1.0), ("banana", 1.0), ("carrot", 1.0), ("date", 1.0), ("egg", 1.0)];

    const FIVE_FRESH: &[(&str, f64)] =
        &[("apple", 52.0), ("banana", 89.0), ("carrot", 41.0), ("date", 282.0), ("egg", 155.0)];

    fn updater(store: &Arc<RecordingStore>, source: &Arc<FakeNutrition>, batch_size: usize) -> ProductUpdater {
        ProductUpdater::new(store.clone(), source.clone(), batch_size).unwrap()
    }

    #[tokio::test]
    async fn test_zero_batch_size_rejected() {
        let store = Arc::new(RecordingStore::seeded(&[]).await);
        let source = Arc::new(FakeNutrition::with(&[]));
        let result = ProductUpdater::new(store, source, 0);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_updates_all_pages() {
        let store = Arc::new(RecordingStore::seeded(FIVE).await);
        let source = Arc::new(FakeNutrition::with(FIVE_FRESH));

        let report = updater(&store, &source, 2).update().await.unwrap();

        assert_eq!(report, RefreshReport { pages: 3, skipped_pages: 0, checked: 5, updated: 5 });
        assert_eq!(source.calls(), 3);
        assert_eq!(store.lookup("apple").await.unwrap(), Some(52.0));
        assert_eq!(store.lookup("egg").await.unwrap(), Some(155.0));
    }

    #[tokio::test]
    async fn test_pages_follow_id_order() {
        let store = Arc::new(RecordingStore::seeded(FIVE).await);
        let source = Arc::new(FakeNutrition::with(FIVE_FRESH));

        updater(&store, &source, 2).update().await.unwrap();

        assert_eq!(
            source.queries(),
            vec![
                vec!["apple".to_string(), "banana".to_string()],
                vec!["carrot".to_string(), "date".to_string()],
                vec!["egg".to_string()],
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_page_is_skipped() {
        let store = Arc::new(RecordingStore::seeded(FIVE).await);
        let source = Arc::new(FakeNutrition::with(FIVE_FRESH).failing_on(&[2]));

        let report = updater(&store, &source, 2).update().await.unwrap();

        assert_eq!(report, RefreshReport { pages: 3, skipped_pages: 1, checked: 5, updated: 3 });
        assert_eq!(source.calls(), 3);
        assert_eq!(store.bulk_updates(), 2);
        assert_eq!(store.lookup("apple").await.unwrap(), Some(52.0));
        assert_eq!(store.lookup("banana").await.unwrap(), Some(89.0));
        assert_eq!(store.lookup("carrot").await.unwrap(), Some(1.0));
        assert_eq!(store.lookup("date").await.unwrap(), Some(1.0));
        assert_eq!(store.lookup("egg").await.unwrap(), Some(155.0));
    }

    #[tokio::test]
    async fn test_not_found_page_is_skipped() {
        let store = Arc::new(RecordingStore::seeded(&[("apple", 1.0), ("mystery", 5.0), ("egg", 1.0)]).await);
        let source = Arc::new(FakeNutrition::with(&[("apple", 52.0), ("egg", 155.0)]));

        let report = updater(&store, &source, 1).update().await.unwrap();

        assert_eq!(report.skipped_pages, 1);
        assert_eq!(report.updated, 2);
        assert_eq!(store.lookup("mystery").await.unwrap(), Some(5.0));
    }

    #[tokio::test]
    async fn test_unchanged_values_are_not_written() {
        let store = Arc::new(RecordingStore::seeded(FIVE_FRESH).await);
        let source = Arc::new(FakeNutrition::with(FIVE_FRESH));

        let report = updater(&store, &source, 2).update().await.unwrap();

        assert_eq!(report.updated, 0);
        assert_eq!(store.bulk_updates(), 0);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_only_changed_rows_are_written() {
        let store = Arc::new(RecordingStore::seeded(&[("apple", 52.0), ("banana", 1.0)]).await);
        let before = store.db.get_product("apple").await.unwrap().unwrap();
        let source = Arc::new(FakeNutrition::with(&[("apple", 52.0), ("banana", 89.0)]));

        let report = updater(&store, &source, 10).update().await.unwrap();

        assert_eq!(report.updated, 1);
        assert_eq!(store.bulk_updates(), 1);
        let after = store.db.get_product("apple").await.unwrap().unwrap();
        assert_eq!(before.updated_at, after.updated_at);
    }

    #[tokio::test]
    async fn test_missing_names_left_untouched() {
        let store = Arc::new(RecordingStore::seeded(&[("fried potato", 1.0), ("unknown", 7.0), ("tomato", 1.0)]).await);
        let source = Arc::new(FakeNutrition::with(&[("fried potato", 307.3), ("tomato", 18.2)]));

        let report = updater(&store, &source, 3).update().await.unwrap();

        assert_eq!(report.updated, 2);
        assert_eq!(store.lookup("fried potato").await.unwrap(), Some(307.3));
        assert_eq!(store.lookup("unknown").await.unwrap(), Some(7.0));
        assert_eq!(store.lookup("tomato").await.unwrap(), Some(18.2));
    }

    #[tokio::test]
    async fn test_invalid_fresh_value_ignored() {
        let store = Arc::new(RecordingStore::seeded(&[("apple", 1.0), ("banana", 1.0)]).await);
        let source = Arc::new(FakeNutrition::with(&[("apple", -4.0), ("banana", 89.0)]));

        let report = updater(&store, &source, 2).update().await.unwrap();

        assert_eq!(report.updated, 1);
        assert_eq!(store.lookup("apple").await.unwrap(), Some(1.0));
        assert_eq!(store.lookup("banana").await.unwrap(), Some(89.0));
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = Arc::new(RecordingStore::seeded(&[]).await);
        let source = Arc::new(FakeNutrition::with(&[]));

        let report = updater(&store, &source, 2).update().await.unwrap();

        assert_eq!(report, RefreshReport::default());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_rows_added_mid_run_are_visited_once() {
        let store = Arc::new(RecordingStore::seeded(FIVE).await.inserting_after_first_page("fig", 1.0));
        let mut fresh = FIVE_FRESH.to_vec();
        fresh.push(("fig", 74.0));
        let source = Arc::new(FakeNutrition::with(&fresh));

        let report = updater(&store, &source, 2).update().await.unwrap();

        let queries = source.queries();
        let mut queried: Vec<String> = queries.iter().flatten().cloned().collect();
        let total = queried.len();
        queried.sort();
        queried.dedup();
        assert_eq!(queried.len(), total);
        assert_eq!(total, 6);
        assert_eq!(queries.last().unwrap(), &vec!["egg".to_string(), "fig".to_string()]);
        assert_eq!(report.checked, 6);
        assert_eq!(store.lookup("fig").await.unwrap(), Some(74.0));
    }

    #[tokio::test]
    async fn test_write_failure_keeps_earlier_pages() {
        let store = Arc::new(RecordingStore::seeded(FIVE).await.failing_bulk_update_on(&[2]));
        let source = Arc::new(FakeNutrition::with(FIVE_FRESH));

        let result = updater(&store, &source, 2).update().await;

        assert!(matches!(result, Err(Error::Database(_))));
        assert_eq!(source.calls(), 2);
        assert_eq!(store.lookup("apple").await.unwrap(), Some(52.0));
        assert_eq!(store.lookup("banana").await.unwrap(), Some(89.0));
        assert_eq!(store.lookup("carrot").await.unwrap(), Some(1.0));
        assert_eq!(store.lookup("egg").await.unwrap(), Some(1.0));
    }

    #[tokio::test]
    async fn test_store_failure_is_fatal() {
        let source = Arc::new(FakeNutrition::with(FIVE_FRESH));
        let updater = ProductUpdater::new(Arc::new(ClosedStore), source.clone(), 2).unwrap();

        let result = updater.update().await;

        assert!(matches!(result, Err(Error::Database(_))));
        assert_eq!(source.calls(), 0);
    }

    #[test]
    fn test_stale_products() {
        let page = vec![
            Product { id: 1, name: "apple".into(), calories: 52.0, updated_at: String::new() },
            Product { id: 2, name: "banana".into(), calories: 1.0, updated_at: String::new() },
            Product { id: 3, name: "carrot".into(), calories: 1.0, updated_at: String::new() },
        ];
        let fresh = HashMap::from([("apple".to_string(), 52.0), ("banana".to_string(), 89.0)]);

        let changed = stale_products(page, &fresh);

        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].id, 2);
        assert_eq!(changed[0].calories, 89.0);
    }
}
