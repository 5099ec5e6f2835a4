//! Product cache operations.
//!
//! Provides the `ProductStore` contract used by the finder and updater,
//! and its SQLite implementation on `ProductDb`.

use super::connection::ProductDb;
use crate::Error;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Maximum length of a product name in characters.
pub const MAX_NAME_LEN: usize = 50;

/// A cached product.
///
/// `calories` is the calorie content of 100 g/ml of the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub calories: f64,
    pub updated_at: String,
}

impl Product {
    /// Check that a name/calories pair can be stored.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidProduct` if the name is blank or longer than
    /// `MAX_NAME_LEN` characters, or if the calorie value is negative or not finite.
    pub fn validate(name: &str, calories: f64) -> Result<(), Error> {
        if name.trim().is_empty() {
            return Err(Error::InvalidProduct("product name must not be blank".into()));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(Error::InvalidProduct(format!(
                "product name too long: {} chars (max {MAX_NAME_LEN})",
                name.chars().count()
            )));
        }
        if !calories.is_finite() || calories < 0.0 {
            return Err(Error::InvalidProduct(format!("invalid calorie value for {name}: {calories}")));
        }
        Ok(())
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Product { id: row.get(0)?, name: row.get(1)?, calories: row.get(2)?, updated_at: row.get(3)? })
    }
}

/// Persistent name → calories table consumed by the finder and updater.
#[async_trait::async_trait]
pub trait ProductStore: Send + Sync {
    /// Exact, case-sensitive lookup by name.
    async fn lookup(&self, name: &str) -> Result<Option<f64>, Error>;

    /// Insert a product or overwrite the calories of an existing one.
    async fn upsert(&self, name: &str, calories: f64) -> Result<(), Error>;

    /// All products ordered by id.
    async fn list_all(&self) -> Result<Vec<Product>, Error>;

    /// Up to `limit` products with `id > after_id`, ordered by id.
    async fn list_page(&self, after_id: i64, limit: usize) -> Result<Vec<Product>, Error>;

    /// Overwrite the calories of the given products, all or nothing.
    ///
    /// Returns the number of rows updated.
    async fn bulk_update(&self, changed: &[Product]) -> Result<u64, Error>;
}

/// Map constraint violations on write to `InvalidProduct`.
fn write_error(name: &str, err: rusqlite::Error) -> Error {
    match err {
        rusqlite::Error::SqliteFailure(ref e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            Error::InvalidProduct(format!("{name}: {err}"))
        }
        other => other.into(),
    }
}

impl ProductDb {
    /// Get the cached calories for a product.
    ///
    /// Returns None if the name doesn't exist in the cache.
    pub async fn get_calories(&self, name: &str) -> Result<Option<f64>, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<Option<f64>, Error> {
                let mut stmt = conn.prepare("SELECT calories FROM products WHERE name = ?1")?;

                match stmt.query_row(params![name], |row| row.get(0)) {
                    Ok(calories) => Ok(Some(calories)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Get a full product row by name.
    pub async fn get_product(&self, name: &str) -> Result<Option<Product>, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Product>, Error> {
                let mut stmt = conn.prepare("SELECT id, name, calories, updated_at FROM products WHERE name = ?1")?;

                match stmt.query_row(params![name], Product::from_row) {
                    Ok(product) => Ok(Some(product)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or update a product.
    ///
    /// Uses UPSERT semantics: inserts if the name doesn't exist, overwrites
    /// the calories if it does. Concurrent writers for the same name do not
    /// conflict; the last write wins.
    pub async fn upsert_product(&self, name: &str, calories: f64) -> Result<(), Error> {
        Product::validate(name, calories)?;

        let name = name.to_string();
        let updated_at = Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO products (name, calories, updated_at)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(name) DO UPDATE SET
                        calories = excluded.calories,
                        updated_at = excluded.updated_at",
                    params![name, calories, updated_at],
                )
                .map_err(|e| write_error(&name, e))?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// List every product ordered by id.
    pub async fn list_products(&self) -> Result<Vec<Product>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<Product>, Error> {
                let mut stmt = conn.prepare("SELECT id, name, calories, updated_at FROM products ORDER BY id")?;
                let rows = stmt.query_map([], Product::from_row)?;
                rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
            })
            .await
            .map_err(Error::from)
    }

    /// List the next page of products after `after_id`.
    ///
    /// Keyset pagination: rows inserted while paging are picked up at the end
    /// and never shift earlier pages.
    pub async fn list_products_page(&self, after_id: i64, limit: usize) -> Result<Vec<Product>, Error> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.conn
            .call(move |conn| -> Result<Vec<Product>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, name, calories, updated_at FROM products
                    WHERE id > ?1 ORDER BY id LIMIT ?2",
                )?;
                let rows = stmt.query_map(params![after_id, limit], Product::from_row)?;
                rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
            })
            .await
            .map_err(Error::from)
    }

    /// Overwrite calories for the given products in a single transaction.
    ///
    /// Rows are matched by id. Returns the number of rows updated.
    pub async fn bulk_update_calories(&self, changed: &[Product]) -> Result<u64, Error> {
        if changed.is_empty() {
            return Ok(0);
        }
        for product in changed {
            Product::validate(&product.name, product.calories)?;
        }

        let changed = changed.to_vec();
        let updated_at = Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let tx = conn.transaction()?;
                let mut updated = 0u64;
                {
                    let mut stmt = tx.prepare("UPDATE products SET calories = ?1, updated_at = ?2 WHERE id = ?3")?;
                    for product in &changed {
                        updated += stmt
                            .execute(params![product.calories, updated_at, product.id])
                            .map_err(|e| write_error(&product.name, e))? as u64;
                    }
                }
                tx.commit()?;
                Ok(updated)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of cached products.
    pub async fn count_products(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Set every product to the same calorie value.
    ///
    /// Used to force the next refresh to rewrite every row. Returns the
    /// number of rows touched.
    pub async fn reset_calories(&self, calories: f64) -> Result<u64, Error> {
        if !calories.is_finite() || calories < 0.0 {
            return Err(Error::InvalidInput(format!("invalid calorie value: {calories}")));
        }
        let updated_at = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute(
                    "UPDATE products SET calories = ?1, updated_at = ?2",
                    params![calories, updated_at],
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[async_trait::async_trait]
impl ProductStore for ProductDb {
    async fn lookup(&self, name: &str) -> Result<Option<f64>, Error> {
        self.get_calories(name).await
    }

    async fn upsert(&self, name: &str, calories: f64) -> Result<(), Error> {
        self.upsert_product(name, calories).await
    }

    async fn list_all(&self) -> Result<Vec<Product>, Error> {
        self.list_products().await
    }

    async fn list_page(&self, after_id: i64, limit: usize) -> Result<Vec<Product>, Error> {
        self.list_products_page(after_id, limit).await
    }

    async fn bulk_update(&self, changed: &[Product]) -> Result<u64, Error> {
        self.bulk_update_calories(changed).await
    }
}
