//! In-process test doubles for the nutrition API and the product store.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use caltrack_core::{Error, Product, ProductDb, ProductStore};

use crate::nutrition::{NutritionError, NutritionSource};

/// Answers from a fixed table and records every query.
#[derive(Default)]
pub(crate) struct FakeNutrition {
    known: HashMap<String, f64>,
    failing_calls: Vec<usize>,
    calls: AtomicUsize,
    queries: Mutex<Vec<Vec<String>>>,
}

impl FakeNutrition {
    pub(crate) fn with(products: &[(&str, f64)]) -> Self {
        Self {
            known: products.iter().map(|(name, calories)| ((*name).to_string(), *calories)).collect(),
            ..Default::default()
        }
    }

    /// Make the given 1-based call numbers fail as unavailable.
    pub(crate) fn failing_on(mut self, calls: &[usize]) -> Self {
        self.failing_calls = calls.to_vec();
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn queries(&self) -> Vec<Vec<String>> {
        self.queries.lock().unwrap().clone()
    }

    fn record(&self, names: Vec<String>) -> Result<(), NutritionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.queries.lock().unwrap().push(names);
        if self.failing_calls.contains(&call) {
            return Err(NutritionError::Unavailable { status: 503 });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl NutritionSource for FakeNutrition {
    async fn single_product_calories(&self, product_name: &str) -> Result<f64, NutritionError> {
        self.record(vec![product_name.to_string()])?;
        self.known.get(product_name).copied().ok_or(NutritionError::ProductNotFound)
    }

    async fn multiple_products_calories(
        &self, product_names: &[String],
    ) -> Result<HashMap<String, f64>, NutritionError> {
        self.record(product_names.to_vec())?;
        let found: HashMap<String, f64> = product_names
            .iter()
            .filter_map(|name| self.known.get(name).map(|calories| (name.clone(), *calories)))
            .collect();
        if found.is_empty() {
            return Err(NutritionError::ProductNotFound);
        }
        Ok(found)
    }
}

/// Wraps `ProductDb` and counts calls to the write paths.
pub(crate) struct RecordingStore {
    pub(crate) db: ProductDb,
    upserts: AtomicUsize,
    bulk_updates: AtomicUsize,
    failing_bulk_updates: Vec<usize>,
    pending_insert: Mutex<Option<(String, f64)>>,
}

impl RecordingStore {
    pub(crate) async fn seeded(products: &[(&str, f64)]) -> Self {
        let db = ProductDb::open_in_memory().await.unwrap();
        for (name, calories) in products {
            db.upsert_product(name, *calories).await.unwrap();
        }
        Self {
            db,
            upserts: AtomicUsize::new(0),
            bulk_updates: AtomicUsize::new(0),
            failing_bulk_updates: Vec::new(),
            pending_insert: Mutex::new(None),
        }
    }

    /// Make the given 1-based `bulk_update` calls fail with a database error.
    pub(crate) fn failing_bulk_update_on(mut self, calls: &[usize]) -> Self {
        self.failing_bulk_updates = calls.to_vec();
        self
    }

    /// Insert a product right after the first page has been read.
    pub(crate) fn inserting_after_first_page(self, name: &str, calories: f64) -> Self {
        *self.pending_insert.lock().unwrap() = Some((name.to_string(), calories));
        self
    }

    pub(crate) fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub(crate) fn bulk_updates(&self) -> usize {
        self.bulk_updates.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ProductStore for RecordingStore {
    async fn lookup(&self, name: &str) -> Result<Option<f64>, Error> {
        self.db.lookup(name).await
    }

    async fn upsert(&self, name: &str, calories: f64) -> Result<(), Error> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.db.upsert(name, calories).await
    }

    async fn list_all(&self) -> Result<Vec<Product>, Error> {
        self.db.list_all().await
    }

    async fn list_page(&self, after_id: i64, limit: usize) -> Result<Vec<Product>, Error> {
        let page = self.db.list_page(after_id, limit).await?;
        let pending = self.pending_insert.lock().unwrap().take();
        if let Some((name, calories)) = pending {
            self.db.upsert(&name, calories).await?;
        }
        Ok(page)
    }

    async fn bulk_update(&self, changed: &[Product]) -> Result<u64, Error> {
        let call = self.bulk_updates.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing_bulk_updates.contains(&call) {
            return Err(closed());
        }
        self.db.bulk_update(changed).await
    }
}

/// A store whose connection is gone.
pub(crate) struct ClosedStore;

fn closed() -> Error {
    Error::Database(tokio_rusqlite::Error::ConnectionClosed)
}

#[async_trait::async_trait]
impl ProductStore for ClosedStore {
    async fn lookup(&self, _name: &str) -> Result<Option<f64>, Error> {
        Err(closed())
    }

    async fn upsert(&self, _name: &str, _calories: f64) -> Result<(), Error> {
        Err(closed())
    }

    async fn list_all(&self) -> Result<Vec<Product>, Error> {
        Err(closed())
    }

    async fn list_page(&self, _after_id: i64, _limit: usize) -> Result<Vec<Product>, Error> {
        Err(closed())
    }

    async fn bulk_update(&self, _changed: &[Product]) -> Result<u64, Error> {
        Err(closed())
    }
}
