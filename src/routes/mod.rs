use axum::{Router, routing::get};
use std::sync::Arc;

use crate::{config::Config, services::leaderboard_service::LeaderboardService};

pub mod leaderboard;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check OK")
    )
)]
pub async fn health_check() -> &'static str {
    "OK"
}

pub fn init_routes(leaderboard_service: Arc<LeaderboardService>, config: Arc<Config>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(leaderboard::leaderboard_routes(leaderboard_service, config))
}
