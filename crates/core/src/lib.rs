//! Core types and shared functionality for caltrack.
//!
//! This crate provides:
//! - Product cache with SQLite backend
//! - Unified error types
//! - Configuration structures
//! - Portion calorie arithmetic

pub mod cache;
pub mod config;
pub mod error;
pub mod portion;

pub use cache::{Product, ProductDb, ProductStore};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use portion::{PortionCalories, portion_calories};
