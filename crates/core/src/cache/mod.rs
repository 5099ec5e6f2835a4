//! SQLite-backed cache of product calorie values.
//!
//! This module provides a persistent name → calories table using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Exact, case-sensitive lookups by product name
//! - Last-write-wins upserts
//! - Keyset pagination by insertion id for batch refreshes
//! - Transactional bulk updates
//! - Automatic schema migrations

pub mod connection;
pub mod migrations;
pub mod products;

pub use crate::Error;

pub use connection::ProductDb;
pub use products::{MAX_NAME_LEN, Product, ProductStore};
