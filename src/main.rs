use axum::Router;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::{Config, StoreBackend},
    routes::init_routes,
    services::leaderboard_service::LeaderboardService,
    store::{InMemoryScoreStore, MongoScoreStore, ScoreStore},
};

mod config;
mod db;
mod error;
mod logging;
mod models;
mod routes;
mod services;
mod store;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health_check,
        routes::leaderboard::update_leaderboard,
        routes::leaderboard::get_rank,
        routes::leaderboard::get_default_rank,
        routes::leaderboard::list_categories,
    ),
    components(
        schemas(
            models::leaderboard::SubmitScoreRequest,
            models::leaderboard::SubmitScoreResponse,
            models::leaderboard::MessageResponse,
            models::leaderboard::RankResponse,
            models::leaderboard::RankedEntry,
            models::leaderboard::LatestSubmission,
            models::category::CategoriesResponse,
        )
    )
)]
struct ApiDoc;

async fn build_store(config: &Config) -> Result<Arc<dyn ScoreStore>, Box<dyn std::error::Error>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory score store; data is lost on restart");
            Ok(Arc::new(InMemoryScoreStore::new()))
        }
        StoreBackend::Mongo => {
            let uri = config.mongodb_uri.as_deref().ok_or("MONGODB_URI must be set")?;
            let db = Arc::new(db::init_db(uri, &config.mongodb_database).await?);
            let store = MongoScoreStore::new(db);
            store.ensure_indexes().await?;
            tracing::info!(database = %config.mongodb_database, "connected to MongoDB");
            Ok(Arc::new(store))
        }
    }
}

pub fn build_app(leaderboard_service: Arc<LeaderboardService>, config: Arc<Config>) -> Router {
    Router::new()
        .merge(init_routes(leaderboard_service, config))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    logging::init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "leaderboard service stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let store = build_store(&config).await?;
    let leaderboard_service = Arc::new(LeaderboardService::new(store, config.top_n));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = build_app(leaderboard_service, Arc::new(config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server is running");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests;
