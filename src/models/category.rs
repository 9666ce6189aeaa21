use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response DTO for `GET /leaderboard/categories`.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct CategoriesResponse {
    pub success: bool,
    /// Most recently updated first, then categories without an update record in name order.
    pub data: Vec<String>,
}

impl From<Vec<String>> for CategoriesResponse {
    fn from(data: Vec<String>) -> Self {
        CategoriesResponse { success: true, data }
    }
}
