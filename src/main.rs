//! Roomsync webhook service.
//!
//! Main entry point. Loads configuration, prepares the database, and
//! serves the webhook endpoint until shutdown.

use std::{str::FromStr, sync::Arc};

use anyhow::{Context, Result};
use roomsync_api::{AppState, Config, WebhookVerifier};
use roomsync_core::{storage, storage::Storage, RealClock};
use roomsync_upstream::SnapshotClient;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    init_tracing(&config.rust_log);

    info!("Starting roomsync webhook service");
    info!(
        database_url = %config.database_url_masked(),
        upstream = %config.upstream_base_url,
        host = %config.host,
        port = config.port,
        "Configuration loaded"
    );

    let pool = create_database_pool(&config).await?;
    info!("Database connection pool established");

    storage::run_migrations(&pool).await.context("Failed to prepare database schema")?;
    info!("Database schema ready");

    let state = AppState {
        storage: Storage::new(pool.clone()),
        verifier: WebhookVerifier::new(&config.webhook_secret)
            .context("Invalid webhook signing secret")?,
        snapshots: SnapshotClient::new(config.to_client_config())
            .context("Failed to build snapshot client")?,
        clock: Arc::new(RealClock::new()),
    };

    let addr = config.parse_server_addr()?;
    info!(addr = %addr, "Roomsync is ready to receive webhooks");

    roomsync_api::start_server(state, addr).await.context("Server failed")?;

    pool.close().await;
    info!("Database connections closed, shutdown complete");

    Ok(())
}

/// Initializes tracing with environment-based configuration.
///
/// `RUST_LOG` wins when set; the configured filter is the fallback.
fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer().with_target(true).with_file(true).with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

/// Opens the database, creating the file on first start.
async fn create_database_pool(config: &Config) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .context("Invalid DATABASE_URL")?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect_with(options)
        .await
        .context("Failed to open database")?;

    sqlx::query("SELECT 1")
        .fetch_one(&pool)
        .await
        .context("Failed to verify database connection")?;

    Ok(pool)
}
