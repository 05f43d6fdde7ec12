//! # Catalog API
//!
//! Entry point: load configuration from the environment, build the store
//! client, serve until Ctrl+C.
//!
//! Missing `SUPABASE_URL` / `SUPABASE_KEY` is logged, not fatal.

use anyhow::Result;
use catalog_api::domain::config::LoggingConfig;
use catalog_api::{CatalogApiService, ServiceConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging(&LoggingConfig::from_env())?;
    let config = ServiceConfig::from_env();

    info!("===========================================");
    info!("  Catalog API v{}", catalog_api::VERSION);
    info!("===========================================");

    let service = CatalogApiService::from_config(config)?;
    service.startup_health_check().await;

    service.start(shutdown_signal()).await?;
    Ok(())
}

fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.with_thread_ids(true).finish())?;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
