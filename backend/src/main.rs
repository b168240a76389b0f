use std::sync::Arc;

use anyhow::{Context, Result};
use bongii::{build_router, config::Config, db, feed_cleanup_task, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bongii=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Bongii server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Connect to database
    let db = db::create_pool(config.database_url(), config.database.max_connections)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url()))?;
    tracing::info!("Connected to database");

    // Run migrations
    db::run_migrations(&db)
        .await
        .context("Database migrations failed")?;
    tracing::info!("Database migrations completed");

    // Create application state
    let state = Arc::new(AppState::new(config.clone(), db));

    // Spawn background task to drop idle live feeds
    let cleanup_state = state.clone();
    let cleanup_period = config.feed_cleanup_interval();
    tokio::spawn(async move {
        feed_cleanup_task(cleanup_state, cleanup_period).await;
    });

    let app = build_router(state);

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("API: http://{}/api", addr);
    tracing::info!("Live feeds: ws://{}/ws/campaigns/{{code}}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    if let Some(dir) = &config.server.frontend_dir {
        tracing::info!("Serving frontend from {}", dir);
    }

    axum::serve(listener, app).await?;

    Ok(())
}
