use anyhow::{Context, Result};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use mentorhub_server::config::Config;
use mentorhub_server::realtime::RealtimeClient;
use mentorhub_server::router::create_router;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting mentorhub API server...");

    // --- Configuration ---
    let config_path =
        env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());
    info!("Loading configuration from: {}", config_path);
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    // --- Database Setup ---
    info!("Setting up database connection pool...");
    let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
    let pool = Pool::builder()
        .build(manager)
        .context("Failed to create database connection pool")?;
    let db_pool = Arc::new(pool);
    info!("Database pool created successfully.");

    // --- Migrations ---
    {
        let mut conn = db_pool
            .get()
            .context("Failed to get DB connection for migrations")?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| anyhow::anyhow!("Failed to run pending migrations: {}", e))?;
    }
    info!("Migrations up to date.");

    // --- Realtime relay client ---
    let realtime = RealtimeClient::new(config.relay_url.clone());
    info!("Relay publisher pointed at {}", config.relay_url);

    // --- Router & Server ---
    let app = create_router(db_pool, realtime);
    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen_addr format in config: {}", config.listen_addr))?;
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind TCP listener")?;
    info!("API server listening on {}", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .context("Axum server failed")?;

    info!("Application shut down.");
    Ok(())
}
