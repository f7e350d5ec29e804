// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use asset_brain::{
    bootstrap, domains::properties::Property, kernel::PgRecordStore, server::build_app, Config,
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,asset_brain=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Real Estate Asset Brain API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Migrations and sample data
    bootstrap::initialize(&pool, config.seed_sample_data)
        .await
        .context("Failed to initialize database")?;
    let properties = Property::count(&pool).await.context("Failed to count properties")?;
    if properties == 0 {
        tracing::warn!("No properties loaded; queries will only return the system overview");
    } else {
        tracing::info!(properties, "Portfolio loaded");
    }

    // Build application
    let store = Arc::new(PgRecordStore::new(pool.clone()));
    let app = build_app(pool, store, config.allowed_origins());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
