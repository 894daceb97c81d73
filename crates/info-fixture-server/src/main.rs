//! Info fixture server - Main entry point
//!
//! A small JSON server used as a fixture by integration-test runners:
//! - Connects to the configured database and seeds the `testing` table
//! - Serves `/info/{id}` from that table
//! - Serves `/randint/{n}` with a random number

mod api;
mod config;
mod error;
mod router;
mod storage;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::storage::Storage;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub storage: Arc<dyn Storage>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info,info_fixture_server=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting info fixture server");

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded: {:?}", config);

    let storage = storage::connect(&config.storage)
        .await
        .context("Failed to connect to database")?;
    storage
        .apply_migrations()
        .await
        .context("Failed to seed the testing table")?;
    tracing::info!("Database initialized ({})", storage.backend());

    let state = Arc::new(AppState { config, storage });
    let addr = state.config.listen_addr();
    let app = router::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
