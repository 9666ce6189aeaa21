//! Score Store seam.
//!
//! The leaderboard only needs a handful of ranked-set and scalar-record
//! primitives. Every method is a single store round-trip and is atomic on its
//! own key; nothing spans keys.
//!
//! ## Key layout
//!
//! ```text
//! leaderboard:scores:{category}   → ranked set, member = player, score = timing
//! leaderboard:updated             → ranked set, member = category, score = epoch millis
//! leaderboard:latest:{category}   → LatestSubmission JSON
//! ```
//!
//! Equal scores are ordered by write sequence: the member whose current score
//! was written first comes first in ascending reads.

mod memory;
mod mongo;

pub use memory::InMemoryScoreStore;
pub use mongo::MongoScoreStore;

use async_trait::async_trait;

use crate::error::StoreError;

pub const SCORES_PREFIX: &str = "leaderboard:scores:";
pub const UPDATED_KEY: &str = "leaderboard:updated";
pub const LATEST_PREFIX: &str = "leaderboard:latest:";

pub fn scores_key(category: &str) -> String {
    format!("{SCORES_PREFIX}{category}")
}

pub fn latest_key(category: &str) -> String {
    format!("{LATEST_PREFIX}{category}")
}

/// Inverse of [`scores_key`].
pub fn category_from_scores_key(key: &str) -> Option<&str> {
    key.strip_prefix(SCORES_PREFIX)
}

#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Upserts `member` with `score`; a new write moves the member to the back of its tie group.
    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError>;

    /// Up to `limit` members, lowest score first.
    async fn zrange(&self, key: &str, limit: usize) -> Result<Vec<(String, f64)>, StoreError>;

    /// Every member, highest score first; ties latest write first.
    async fn zrevrange_all(&self, key: &str) -> Result<Vec<(String, f64)>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Keys of non-empty ranked sets starting with `prefix`.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}
