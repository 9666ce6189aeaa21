use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use async_trait::async_trait;
use chrono::Utc;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, Bson},
    options::IndexOptions,
    Collection, Database, IndexModel,
};
use serde::{Deserialize, Serialize};

use super::ScoreStore;
use crate::error::StoreError;

/// One member of a ranked set.
#[derive(Serialize, Deserialize, Debug, Clone)]
struct RankedMember {
    key: String,
    member: String,
    score: f64,
    seq: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct Record {
    key: String,
    value: String,
}

/// Ranked sets and records kept as MongoDB documents, one document per member.
pub struct MongoScoreStore {
    ranked: Collection<RankedMember>,
    records: Collection<Record>,
    seq: WriteSequence,
}

impl MongoScoreStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            ranked: db.collection("ranked_sets"),
            records: db.collection("records"),
            seq: WriteSequence::default(),
        }
    }

    /// Unique (key, member) backs the upsert; (key, score, seq) backs range reads.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        self.ranked
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "key": 1, "member": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;
        self.ranked
            .create_index(IndexModel::builder().keys(doc! { "key": 1, "score": 1, "seq": 1 }).build())
            .await?;
        self.records
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "key": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;
        Ok(())
    }

    async fn collect(&self, key: &str, direction: i32, limit: Option<i64>) -> Result<Vec<(String, f64)>, StoreError> {
        let find = self
            .ranked
            .find(doc! { "key": key })
            .sort(doc! { "score": direction, "seq": direction });
        let mut cursor = match limit {
            Some(limit) => find.limit(limit).await?,
            None => find.await?,
        };

        let mut members = Vec::new();
        while let Some(entry) = cursor.try_next().await? {
            members.push((entry.member, entry.score));
        }
        Ok(members)
    }
}

/// Strictly increasing write sequence for tie-breaking. Follows the nanosecond
/// clock while it moves forward and keeps counting when it stalls or steps back.
#[derive(Debug, Default)]
pub(crate) struct WriteSequence {
    last: AtomicI64,
}

impl WriteSequence {
    pub(crate) fn next(&self) -> i64 {
        self.advance(Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX - 1))
    }

    fn advance(&self, now: i64) -> i64 {
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)))
            .unwrap_or_else(|last| last);
        now.max(previous + 1)
    }
}

#[async_trait]
impl ScoreStore for MongoScoreStore {
    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError> {
        self.ranked
            .update_one(
                doc! { "key": key, "member": member },
                doc! { "$set": { "score": score, "seq": self.seq.next() } },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn zrange(&self, key: &str, limit: usize) -> Result<Vec<(String, f64)>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.collect(key, 1, Some(limit)).await
    }

    async fn zrevrange_all(&self, key: &str) -> Result<Vec<(String, f64)>, StoreError> {
        self.collect(key, -1, None).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.records
            .update_one(doc! { "key": key }, doc! { "$set": { "value": value } })
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let record = self.records.find_one(doc! { "key": key }).await?;
        Ok(record.map(|r| r.value))
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let pattern = format!("^{}", escape_regex(prefix));
        let keys = self
            .ranked
            .distinct("key", doc! { "key": { "$regex": pattern } })
            .await?;

        Ok(keys
            .into_iter()
            .filter_map(|key| match key {
                Bson::String(key) => Some(key),
                _ => None,
            })
            .collect())
    }
}

fn escape_regex(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if "\\^$.|?*+()[]{}".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
