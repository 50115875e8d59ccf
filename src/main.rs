//! msgboard server entry point.
//!
//! Loads configuration, attempts database initialization once, and starts
//! the Axum HTTP server whether or not the database came up.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use msgboard::api;
use msgboard::app_state::AppState;
use msgboard::config::{LogFormat, ServiceConfig};
use msgboard::persistence::pool;
use msgboard::readiness::StoreState;
use msgboard::service::MessageService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServiceConfig::from_env().context("invalid service configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
    config.log_summary();

    // Bring up the database; failure means degraded mode, not exit
    let store = StoreState::from_init(pool::initialize(&config.database).await);
    let connected = store.is_connected();

    // Build application state
    let app_state = AppState::new(MessageService::new(store), config.settings);

    // Build router
    let app = api::build_app(app_state, &config);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(
        addr = %config.listen_addr,
        database = if connected { "connected" } else { "not connected" },
        "server listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
