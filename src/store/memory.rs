use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::ScoreStore;
use crate::error::StoreError;

#[derive(Debug, Clone, Copy)]
struct Scored {
    score: f64,
    seq: u64,
}

#[derive(Default)]
struct Inner {
    seq: u64,
    ranked: HashMap<String, HashMap<String, Scored>>,
    records: HashMap<String, String>,
}

impl Inner {
    fn sorted(&self, key: &str) -> Vec<(String, Scored)> {
        let mut members: Vec<(String, Scored)> = self
            .ranked
            .get(key)
            .map(|set| set.iter().map(|(m, s)| (m.clone(), *s)).collect())
            .unwrap_or_default();
        members.sort_by(|(_, a), (_, b)| a.score.total_cmp(&b.score).then(a.seq.cmp(&b.seq)));
        members
    }
}

/// Process-local store for development and tests. Each call takes the lock once.
#[derive(Default)]
pub struct InMemoryScoreStore {
    inner: RwLock<Inner>,
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScoreStore for InMemoryScoreStore {
    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.seq += 1;
        let seq = inner.seq;
        inner
            .ranked
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string(), Scored { score, seq });
        Ok(())
    }

    async fn zrange(&self, key: &str, limit: usize) -> Result<Vec<(String, f64)>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .sorted(key)
            .into_iter()
            .take(limit)
            .map(|(member, s)| (member, s.score))
            .collect())
    }

    async fn zrevrange_all(&self, key: &str) -> Result<Vec<(String, f64)>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .sorted(key)
            .into_iter()
            .rev()
            .map(|(member, s)| (member, s.score))
            .collect())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.write().await.records.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.inner.read().await.records.get(key).cloned())
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .ranked
            .iter()
            .filter(|(key, set)| key.starts_with(prefix) && !set.is_empty())
            .map(|(key, _)| key.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn zadd_overwrites_member() {
        let store = InMemoryScoreStore::new();
        store.zadd("k", "alice", 12.0).await.unwrap();
        store.zadd("k", "alice", 9.5).await.unwrap();

        let members = store.zrange("k", 10).await.unwrap();
        assert_eq!(members, vec![("alice".to_string(), 9.5)]);
    }

    #[tokio::test]
    async fn ties_follow_write_order() {
        let store = InMemoryScoreStore::new();
        store.zadd("k", "zed", 5.0).await.unwrap();
        store.zadd("k", "amy", 5.0).await.unwrap();
        store.zadd("k", "bob", 1.0).await.unwrap();

        let asc: Vec<String> = store.zrange("k", 10).await.unwrap().into_iter().map(|(m, _)| m).collect();
        assert_eq!(asc, ["bob", "zed", "amy"]);

        let desc: Vec<String> = store.zrevrange_all("k").await.unwrap().into_iter().map(|(m, _)| m).collect();
        assert_eq!(desc, ["amy", "zed", "bob"]);
    }

    #[tokio::test]
    async fn zrange_honours_limit_and_missing_keys() {
        let store = InMemoryScoreStore::new();
        for i in 0..5 {
            store.zadd("k", &format!("p{i}"), i as f64).await.unwrap();
        }
        assert_eq!(store.zrange("k", 3).await.unwrap().len(), 3);
        assert!(store.zrange("nope", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn scan_prefix_lists_ranked_keys_only() {
        let store = InMemoryScoreStore::new();
        store.zadd("leaderboard:scores:a", "p", 1.0).await.unwrap();
        store.zadd("other:b", "p", 1.0).await.unwrap();
        store.set("leaderboard:scores:record", "{}").await.unwrap();

        let keys = store.scan_prefix("leaderboard:scores:").await.unwrap();
        assert_eq!(keys, vec!["leaderboard:scores:a".to_string()]);
        assert_eq!(store.get("leaderboard:scores:record").await.unwrap().as_deref(), Some("{}"));
    }
}
