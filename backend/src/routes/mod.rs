pub mod auth;
pub mod boards;
pub mod campaigns;
pub mod health;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::{websocket, AppState};

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ws/campaigns/{code}", get(websocket::handle_campaign_feed))
        .nest("/api", api_routes())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Accounts
        .route("/users", post(auth::register))
        .route(
            "/users/current",
            get(auth::current_user).put(auth::update_current_user),
        )
        .route("/login", post(auth::login))
        // Campaigns
        .route("/background-presets", get(campaigns::background_presets))
        .route(
            "/campaigns",
            get(campaigns::list_campaigns).post(campaigns::create_campaign),
        )
        .route("/campaigns/user", get(campaigns::my_campaigns))
        .route("/campaigns/validate/{code}", get(campaigns::validate_campaign))
        .route(
            "/campaigns/{code}",
            get(campaigns::get_campaign).delete(campaigns::delete_campaign),
        )
        .route("/campaigns/{code}/start", post(campaigns::start_campaign))
        .route("/campaigns/{code}/call", post(campaigns::call_item))
        .route("/campaigns/{code}/results", get(campaigns::campaign_results))
        // Boards
        .route("/campaigns/{code}/board", post(boards::submit_board))
        .route("/campaigns/{code}/boards", get(boards::campaign_boards))
        .route("/boards", get(boards::list_boards))
        .route(
            "/boards/{board_code}",
            get(boards::get_board).put(boards::update_board),
        )
}
