use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::leaderboard::MessageResponse;

pub const VALIDATION_MESSAGE: &str = "Player, timing, and category required";
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Failure of a single store round-trip.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("mongodb error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("stored record could not be (de)serialised: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("invalid submission: {0}")]
    Validation(String),
    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),
}

impl LeaderboardError {
    pub fn status(&self) -> StatusCode {
        match self {
            LeaderboardError::Validation(_) => StatusCode::BAD_REQUEST,
            LeaderboardError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LeaderboardError {
    fn into_response(self) -> Response {
        // detail stays in the logs
        let message = match &self {
            LeaderboardError::Validation(_) => VALIDATION_MESSAGE,
            LeaderboardError::StoreUnavailable(_) => INTERNAL_MESSAGE,
        };
        (self.status(), Json(MessageResponse::new(message))).into_response()
    }
}
