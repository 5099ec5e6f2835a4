//! caltrack operator CLI.
//!
//! Usage:
//! ```bash
//! # Calories per 100 g/ml (cache first, nutrition API on a miss)
//! caltrack find watermelon
//!
//! # Calories of a 55 g portion
//! caltrack meal "fried potato" 55
//!
//! # Refresh every cached product now
//! caltrack refresh --batch-size 100
//!
//! # Inspect and edit the cache
//! caltrack list
//! caltrack set kiwi 61
//! caltrack reset --calories 10
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use caltrack_core::{AppConfig, ProductDb};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "caltrack", about = "Product calorie cache management", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Product cache database path override
    #[arg(long, global = true, env = "CALTRACK_DB_PATH")]
    db: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Calories per 100 g/ml of a product
    Find {
        /// Product name, matched exactly
        name: String,
    },

    /// Calories of a portion of a product
    Meal {
        /// Product name, matched exactly
        name: String,

        /// Portion size in grams or milliliters
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        portion_size: u32,
    },

    /// Re-fetch calories for every cached product
    Refresh {
        /// Products per nutrition API request (defaults to configured batch_size)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..=1000))]
        batch_size: Option<u64>,
    },

    /// List cached products
    List,

    /// Insert or overwrite a product's calories per 100 g/ml
    Set {
        name: String,
        calories: f64,
    },

    /// Set every cached product to the same calorie value
    Reset {
        #[arg(long, default_value_t = 10.0)]
        calories: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    let mut config = AppConfig::load().context("loading configuration")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    let db = ProductDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening product cache at {}", config.db_path.display()))?;

    let output = match cli.command {
        Command::Find { name } => commands::find(&config, db, &name).await?,
        Command::Meal { name, portion_size } => commands::meal(&config, db, &name, portion_size).await?,
        Command::Refresh { batch_size } => {
            let batch_size = batch_size.map_or(config.batch_size, |size| size as usize);
            commands::refresh(&config, db, batch_size).await?
        }
        Command::List => commands::list(&db).await?,
        Command::Set { name, calories } => commands::set(&db, &name, calories).await?,
        Command::Reset { calories } => commands::reset(&db, calories).await?,
    };

    println!("{output}");
    Ok(())
}
