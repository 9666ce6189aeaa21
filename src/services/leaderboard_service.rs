use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{LeaderboardError, StoreError};
use crate::models::leaderboard::{LatestSubmission, RankResponse, RankedEntry, ScoreEntry, SubmitScoreRequest};
use crate::store::{self, ScoreStore};

/// A submission that passed validation. Nothing reaches the store without one.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub category: String,
    pub player: String,
    pub timing: f64,
}

impl TryFrom<SubmitScoreRequest> for Submission {
    type Error = LeaderboardError;

    fn try_from(req: SubmitScoreRequest) -> Result<Self, Self::Error> {
        let category = required_text("category", req.category)?;
        let player = required_text("player", req.player)?;
        let timing = req
            .timing
            .as_ref()
            .and_then(parse_timing)
            .ok_or_else(|| LeaderboardError::Validation("timing must be a finite number".to_string()))?;

        Ok(Submission { category, player, timing })
    }
}

/// Strings pass through and numbers become their decimal text; blank strings,
/// booleans, null, arrays and objects are rejected.
fn required_text(field: &str, value: Option<Value>) -> Result<String, LeaderboardError> {
    match value {
        Some(Value::String(v)) if !v.trim().is_empty() => Ok(v),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(LeaderboardError::Validation(format!("{field} is required"))),
    }
}

/// Accepts a JSON number or a numeric string; anything non-finite is rejected.
pub fn parse_timing(value: &Value) -> Option<f64> {
    let timing = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    timing.is_finite().then_some(timing)
}

pub struct LeaderboardService {
    store: Arc<dyn ScoreStore>,
    top_n: usize,
}

impl LeaderboardService {
    pub fn new(store: Arc<dyn ScoreStore>, top_n: usize) -> Self {
        Self { store, top_n }
    }

    /// Records a submission: ranked-set upsert, activity timestamp, latest record.
    /// The three writes are independent store calls; a failure part way is reported
    /// but not rolled back.
    pub async fn submit(&self, submission: Submission) -> Result<LatestSubmission, LeaderboardError> {
        let Submission { category, player, timing } = submission;
        let now = chrono::Utc::now().timestamp_millis();
        let latest = LatestSubmission { player, timing, updated_at: now };

        self.write_submission(&category, &latest)
            .await
            .inspect_err(|e| tracing::error!(operation = "submit", %category, error = %e, "store write failed"))?;

        tracing::debug!(%category, player = %latest.player, timing, "leaderboard updated");
        Ok(latest)
    }

    async fn write_submission(&self, category: &str, latest: &LatestSubmission) -> Result<(), StoreError> {
        self.store
            .zadd(&store::scores_key(category), &latest.player, latest.timing)
            .await?;
        self.store
            .zadd(store::UPDATED_KEY, category, latest.updated_at as f64)
            .await?;
        let record = serde_json::to_string(latest)?;
        self.store.set(&store::latest_key(category), &record).await
    }

    /// Top-N of a category, lowest timing first. Unknown categories rank empty.
    pub async fn query(&self, category: &str) -> Result<RankResponse, LeaderboardError> {
        if category.trim().is_empty() {
            return Err(LeaderboardError::Validation("category is required".to_string()));
        }

        let (entries, latest) = self
            .read_ranking(category)
            .await
            .inspect_err(|e| tracing::error!(operation = "query", %category, error = %e, "store read failed"))?;

        let data = annotate(entries, latest.as_ref());
        Ok(RankResponse {
            success: true,
            category: category.to_string(),
            data,
            latest_submission: latest,
        })
    }

    async fn read_ranking(&self, category: &str) -> Result<(Vec<ScoreEntry>, Option<LatestSubmission>), StoreError> {
        let entries = self
            .store
            .zrange(&store::scores_key(category), self.top_n)
            .await?
            .into_iter()
            .map(|(player, timing)| ScoreEntry { player, timing })
            .collect();

        let latest = match self.store.get(&store::latest_key(category)).await? {
            Some(raw) => Some(serde_json::from_str::<LatestSubmission>(&raw)?),
            None => None,
        };
        Ok((entries, latest))
    }

    /// Every category with at least one score. Categories with an update record
    /// come first, newest first; the rest follow in name order.
    pub async fn list_categories(&self) -> Result<Vec<String>, LeaderboardError> {
        let (known, updates) = self
            .read_categories()
            .await
            .inspect_err(|e| tracing::error!(operation = "list_categories", error = %e, "store read failed"))?;

        Ok(order_categories(known, updates))
    }

    async fn read_categories(&self) -> Result<(BTreeSet<String>, Vec<String>), StoreError> {
        let known = self
            .store
            .scan_prefix(store::SCORES_PREFIX)
            .await?
            .iter()
            .filter_map(|key| store::category_from_scores_key(key))
            .map(str::to_string)
            .collect();

        let updates = self
            .store
            .zrevrange_all(store::UPDATED_KEY)
            .await?
            .into_iter()
            .map(|(category, _)| category)
            .collect();
        Ok((known, updates))
    }
}

/// Flags the row that matches the latest submission on (player, timing). Players are
/// unique within a ranked set, so at most one row can match.
pub fn annotate(entries: Vec<ScoreEntry>, latest: Option<&LatestSubmission>) -> Vec<RankedEntry> {
    entries
        .into_iter()
        .map(|entry| RankedEntry {
            is_latest: latest.is_some_and(|l| l.matches(&entry)),
            player: entry.player,
            timing: entry.timing,
        })
        .collect()
}

/// `updates` is newest first. Entries without scores are dropped; scored categories
/// missing from `updates` are appended in lexicographic order.
pub fn order_categories(mut known: BTreeSet<String>, updates: Vec<String>) -> Vec<String> {
    let mut ordered = Vec::with_capacity(known.len());
    for category in updates {
        if known.remove(&category) {
            ordered.push(category);
        }
    }
    ordered.extend(known);
    ordered
}
