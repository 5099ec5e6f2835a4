//! caltrack MCP server entry point.
//!
//! Boots the MCP server on stdio transport and, unless disabled, the
//! periodic product refresh. Logging goes to stderr to avoid interfering
//! with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use caltrack_client::{NutritionClient, NutritionSource, ProductFinder, ProductUpdater};
use caltrack_core::{AppConfig, ProductDb, ProductStore};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod scheduler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;

    let db = ProductDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening product cache at {}", config.db_path.display()))?;
    let client = NutritionClient::from_app_config(&config).context("creating nutrition API client")?;

    let store: Arc<dyn ProductStore> = Arc::new(db);
    let source: Arc<dyn NutritionSource> = Arc::new(client);

    let finder = ProductFinder::new(store.clone(), source.clone());
    let updater = ProductUpdater::new(store, source, config.batch_size)?;

    let refresh_task = config
        .refresh_interval()
        .map(|period| scheduler::spawn(updater.clone(), period));

    tracing::info!("Starting caltrack server on stdio transport");

    let handler = handler::CaltrackServer::new(finder, updater);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    if let Some(task) = refresh_task {
        task.abort();
    }

    Ok(())
}
