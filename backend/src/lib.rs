pub mod auth;
pub mod board;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod utils;
pub mod websocket;

use std::{sync::Arc, time::Duration};

use axum::Router;
use config::Config;
use sqlx::SqlitePool;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use websocket::LiveFeeds;

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    pub db: SqlitePool,
    /// Live moderator-call feeds keyed by campaign code
    pub feeds: LiveFeeds,
}

impl AppState {
    pub fn new(config: Config, db: SqlitePool) -> Self {
        Self {
            config,
            db,
            feeds: LiveFeeds::new(),
        }
    }
}

/// Build the full application router: API, live feed, and the optional
/// static frontend as fallback
pub fn build_router(state: Arc<AppState>) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new().merge(routes::create_routes());

    if let Some(dir) = &state.config.server.frontend_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Background task that periodically drops live feeds nobody watches
pub async fn feed_cleanup_task(state: Arc<AppState>, period: Duration) {
    let mut interval = tokio::time::interval(period);

    loop {
        interval.tick().await;

        let removed = state.feeds.prune_idle();
        if removed > 0 {
            tracing::debug!(
                "Removed {} idle live feeds ({} still open)",
                removed,
                state.feeds.len()
            );
        }
    }
}
