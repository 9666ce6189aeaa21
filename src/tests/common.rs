use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{self, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tower::ServiceExt;

use crate::{
    build_app,
    config::Config,
    error::StoreError,
    services::leaderboard_service::LeaderboardService,
    store::{InMemoryScoreStore, ScoreStore},
};

pub struct TestContext {
    pub app: Router,
    pub store: Arc<CountingStore>,
    pub service: Arc<LeaderboardService>,
}

pub fn setup() -> TestContext {
    setup_with_top_n(Config::default().top_n)
}

pub fn setup_with_top_n(top_n: usize) -> TestContext {
    let store = Arc::new(CountingStore::default());
    let service = Arc::new(LeaderboardService::new(store.clone(), top_n));
    let config = Config { top_n, ..Config::default() };
    let app = build_app(service.clone(), Arc::new(config));

    TestContext { app, store, service }
}

/// App whose store fails every call.
pub fn setup_failing() -> Router {
    let service = Arc::new(LeaderboardService::new(Arc::new(FailingStore), 10));
    build_app(service, Arc::new(Config::default()))
}

/// In-memory store that counts mutating calls.
#[derive(Default)]
pub struct CountingStore {
    pub inner: InMemoryScoreStore,
    writes: AtomicUsize,
}

impl CountingStore {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoreStore for CountingStore {
    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.zadd(key, member, score).await
    }

    async fn zrange(&self, key: &str, limit: usize) -> Result<Vec<(String, f64)>, StoreError> {
        self.inner.zrange(key, limit).await
    }

    async fn zrevrange_all(&self, key: &str) -> Result<Vec<(String, f64)>, StoreError> {
        self.inner.zrevrange_all(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key).await
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.inner.scan_prefix(prefix).await
    }
}

pub struct FailingStore;

fn down() -> StoreError {
    StoreError::Unavailable("connection refused".to_string())
}

#[async_trait]
impl ScoreStore for FailingStore {
    async fn zadd(&self, _key: &str, _member: &str, _score: f64) -> Result<(), StoreError> {
        Err(down())
    }

    async fn zrange(&self, _key: &str, _limit: usize) -> Result<Vec<(String, f64)>, StoreError> {
        Err(down())
    }

    async fn zrevrange_all(&self, _key: &str) -> Result<Vec<(String, f64)>, StoreError> {
        Err(down())
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(down())
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(down())
    }

    async fn scan_prefix(&self, _prefix: &str) -> Result<Vec<String>, StoreError> {
        Err(down())
    }
}

/// Sends one request through the router and decodes the JSON body (Null when empty or not JSON).
pub async fn send(app: &Router, method: http::Method, uri: &str, body: Option<Body>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(http::header::CONTENT_TYPE, "application/json");
    }
    let request = builder.body(body.unwrap_or_else(Body::empty)).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub async fn submit(app: &Router, payload: &Value) -> (StatusCode, Value) {
    send(app, http::Method::PUT, "/leaderboard/update", Some(json_body(payload))).await
}

pub async fn rank(app: &Router, category: &str) -> (StatusCode, Value) {
    send(app, http::Method::GET, &format!("/leaderboard/rank/{category}"), None).await
}

pub async fn categories(app: &Router) -> Vec<String> {
    let (status, body) = send(app, http::Method::GET, "/leaderboard/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_value(body["data"].clone()).unwrap()
}

/// Helper to create a JSON body for requests.
pub fn json_body(json: &Value) -> Body {
    Body::from(json.to_string())
}
