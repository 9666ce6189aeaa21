use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Two timings closer than this are the same submission after a JSON round-trip.
pub const TIMING_TOLERANCE: f64 = 1e-9;

/// One row of a category's ranked set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    pub player: String,
    pub timing: f64,
}

/// The most recent write to a category. Overwritten wholesale on every submission.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LatestSubmission {
    pub player: String,
    pub timing: f64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

impl LatestSubmission {
    /// Player identity and timing are the whole match key; timing alone never matches.
    pub fn matches(&self, entry: &ScoreEntry) -> bool {
        self.player == entry.player && (self.timing - entry.timing).abs() <= TIMING_TOLERANCE
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub player: String,
    pub timing: f64,
    pub is_latest: bool,
}

/// Request DTO for `PUT /leaderboard/update`. Every field is optional so that
/// missing values surface as a validation error rather than a body rejection.
#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct SubmitScoreRequest {
    /// A string, or a number taken as its decimal text.
    #[schema(value_type = Option<String>)]
    pub player: Option<Value>,
    /// A JSON number or a numeric string.
    #[schema(value_type = Option<f64>)]
    pub timing: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub category: Option<Value>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct SubmitScoreResponse {
    pub message: String,
    pub category: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self { message: message.to_string() }
    }
}

/// Response DTO for `GET /leaderboard/rank/{category}`.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankResponse {
    pub success: bool,
    pub category: String,
    pub data: Vec<RankedEntry>,
    pub latest_submission: Option<LatestSubmission>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latest(player: &str, timing: f64) -> LatestSubmission {
        LatestSubmission { player: player.to_string(), timing, updated_at: 0 }
    }

    #[test]
    fn match_needs_player_and_timing() {
        let entry = ScoreEntry { player: "alice".to_string(), timing: 12.345 };
        assert!(latest("alice", 12.345).matches(&entry));
        assert!(!latest("bob", 12.345).matches(&entry));
        assert!(!latest("alice", 12.346).matches(&entry));
    }

    #[test]
    fn match_absorbs_round_trip_noise() {
        let timing: f64 = serde_json::from_str(&serde_json::to_string(&(0.1 + 0.2)).unwrap()).unwrap();
        let entry = ScoreEntry { player: "alice".to_string(), timing };
        assert!(latest("alice", 0.3).matches(&entry));
    }

    #[test]
    fn latest_submission_uses_camel_case() {
        let json = serde_json::to_value(latest("alice", 1.5)).unwrap();
        assert_eq!(json["updatedAt"], 0);
        assert_eq!(json["player"], "alice");
    }
}
