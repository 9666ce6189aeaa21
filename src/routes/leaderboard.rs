use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, put},
    Json, Router,
};
use std::sync::Arc;

use crate::config::Config;
use crate::error::LeaderboardError;
use crate::models::category::CategoriesResponse;
use crate::models::leaderboard::{MessageResponse, RankResponse, SubmitScoreRequest, SubmitScoreResponse};
use crate::services::leaderboard_service::{LeaderboardService, Submission};

type LeaderboardState = (Arc<LeaderboardService>, Arc<Config>);

#[utoipa::path(
    put,
    path = "/leaderboard/update",
    request_body = SubmitScoreRequest,
    responses(
        (status = 200, description = "Leaderboard updated", body = SubmitScoreResponse),
        (status = 400, description = "Player, timing, or category missing or malformed", body = MessageResponse),
        (status = 500, description = "Store unavailable", body = MessageResponse)
    )
)]
pub async fn update_leaderboard(
    State((service, _config)): State<LeaderboardState>,
    payload: Result<Json<SubmitScoreRequest>, JsonRejection>,
) -> Result<Json<SubmitScoreResponse>, LeaderboardError> {
    let Json(req) = payload.map_err(|e| LeaderboardError::Validation(e.body_text()))?;
    let submission = Submission::try_from(req)?;
    let category = submission.category.clone();

    service.submit(submission).await?;

    Ok(Json(SubmitScoreResponse {
        message: "Leaderboard updated".to_string(),
        category,
    }))
}

#[utoipa::path(
    get,
    path = "/leaderboard/rank/{category}",
    params(
        ("category" = String, Path, description = "Category name")
    ),
    responses(
        (status = 200, description = "Top entries, fastest first", body = RankResponse),
        (status = 500, description = "Store unavailable", body = MessageResponse)
    )
)]
pub async fn get_rank(
    State((service, _config)): State<LeaderboardState>,
    Path(category): Path<String>,
) -> Result<Json<RankResponse>, LeaderboardError> {
    service.query(&category).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/leaderboard/rank",
    responses(
        (status = 200, description = "Top entries of the default category", body = RankResponse),
        (status = 500, description = "Store unavailable", body = MessageResponse)
    )
)]
pub async fn get_default_rank(
    State((service, config)): State<LeaderboardState>,
) -> Result<Json<RankResponse>, LeaderboardError> {
    service.query(&config.default_category).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/leaderboard/categories",
    responses(
        (status = 200, description = "Known categories, most recently updated first", body = CategoriesResponse),
        (status = 500, description = "Store unavailable", body = MessageResponse)
    )
)]
pub async fn list_categories(
    State((service, _config)): State<LeaderboardState>,
) -> Result<Json<CategoriesResponse>, LeaderboardError> {
    let categories = service.list_categories().await?;
    Ok(Json(categories.into()))
}

pub fn leaderboard_routes(service: Arc<LeaderboardService>, config: Arc<Config>) -> Router {
    Router::new()
        .route("/leaderboard/update", put(update_leaderboard))
        .route("/leaderboard/rank", get(get_default_rank))
        .route("/leaderboard/rank/{category}", get(get_rank))
        .route("/leaderboard/categories", get(list_categories))
        .with_state((service, config))
}
