//! HTTP API integration tests.
//!
//! Each test binds a server to an ephemeral port and drives it over HTTP.

#![cfg(feature = "http")]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rankboard::http::{self, App};
use rankboard::{
    EntityDirectory, EntityId, InMemoryEntityDirectory, InMemoryScoreStore, RankboardConfig,
    RankingEngine, RequestContext, Score, ScoreEntry, ScoreStore, StoreError,
};
use serde_json::{json, Value};

type TestApp = App<InMemoryScoreStore, InMemoryEntityDirectory>;

/// Score store whose writes can be switched off.
#[derive(Clone, Default)]
struct SwitchableStore {
    inner: InMemoryScoreStore,
    reject_writes: Arc<AtomicBool>,
}

#[async_trait]
impl ScoreStore for SwitchableStore {
    async fn upsert(&self, id: EntityId, score: Score) -> Result<(), StoreError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        self.inner.upsert(id, score).await
    }

    async fn score_of(&self, id: EntityId) -> Result<Option<Score>, StoreError> {
        self.inner.score_of(id).await
    }

    async fn count_greater_than(&self, score: Score) -> Result<u64, StoreError> {
        self.inner.count_greater_than(score).await
    }

    async fn range_descending(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<ScoreEntry>, StoreError> {
        self.inner.range_descending(offset, limit).await
    }

    async fn pipelined_score_of(
        &self,
        ids: &[EntityId],
    ) -> Result<HashMap<EntityId, Score>, StoreError> {
        self.inner.pipelined_score_of(ids).await
    }

    async fn cardinality(&self) -> Result<u64, StoreError> {
        self.inner.cardinality().await
    }
}

async fn app_with(users: &[(&str, i64)]) -> Arc<TestApp> {
    let engine = RankingEngine::new(InMemoryScoreStore::new());
    let directory = InMemoryEntityDirectory::new();
    let cx = RequestContext::new();
    for (name, rating) in users {
        let record = directory.create(name).await.unwrap();
        engine.set_score(&cx, record.id, Score(*rating)).await.unwrap();
    }
    Arc::new(App::new(engine, directory, RankboardConfig::default()))
}

/// Bind to port 0 and return the actual address.
async fn start_server<S>(app: Arc<App<S, InMemoryEntityDirectory>>) -> String
where
    S: ScoreStore + Clone + 'static,
{
    let router = http::router(app);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn health_reports_population() {
    let base = start_server(app_with(&[("a", 100), ("b", 200)]).await).await;
    let body: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({ "ok": true, "population": 2 }));
}

#[tokio::test]
async fn leaderboard_joins_names_and_ties() {
    let app = app_with(&[
        ("alice", 1000),
        ("bob", 1000),
        ("carol", 900),
        ("dave", 800),
    ])
    .await;
    let base = start_server(app).await;

    let resp = reqwest::get(format!("{base}/api/leaderboard?page=1&limit=3"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();

    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 3);
    assert_eq!(body["total"], 4);
    assert_eq!(
        body["data"],
        json!([
            { "rank": 1, "user_id": 1, "username": "alice", "rating": 1000 },
            { "rank": 1, "user_id": 2, "username": "bob", "rating": 1000 },
            { "rank": 3, "user_id": 3, "username": "carol", "rating": 900 },
        ])
    );

    let body: Value = reqwest::get(format!("{base}/api/leaderboard?page=2&limit=3"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        body["data"],
        json!([{ "rank": 4, "user_id": 4, "username": "dave", "rating": 800 }])
    );
}

#[tokio::test]
async fn leaderboard_falls_back_on_bad_params() {
    let base = start_server(app_with(&[("a", 100)]).await).await;
    let body: Value = reqwest::get(format!("{base}/api/leaderboard?page=-2&limit=1000"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 50);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn create_update_and_fetch_user() {
    let app = app_with(&[("alice", 1000)]).await;
    let base = start_server(app.clone()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/users"))
        .json(&json!({ "username": "bob", "rating": 1200 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["username"], "bob");
    assert_eq!(created["global_rank"], 1);
    let id = created["id"].as_u64().unwrap();

    let resp = client
        .post(format!("{base}/api/users/{id}/update-rating"))
        .json(&json!({ "rating": 900 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["global_rank"], 2);

    let fetched: Value = client
        .get(format!("{base}/api/users/{id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["rating"], 900);
    assert_eq!(fetched["global_rank"], 2);

    let rank = app
        .engine()
        .rank_of(&RequestContext::new(), EntityId(id))
        .await
        .unwrap();
    assert_eq!(rank, 2);
}

#[tokio::test]
async fn rating_bounds_are_enforced() {
    let base = start_server(app_with(&[("alice", 1000)]).await).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/users"))
        .json(&json!({ "username": "low", "rating": 99 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "rating must be between 100 and 5000");

    let resp = client
        .post(format!("{base}/api/users/1/update-rating"))
        .json(&json!({ "rating": 5001 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn unknown_and_malformed_ids() {
    let base = start_server(app_with(&[]).await).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/api/users/77")).send().await.unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client.get(format!("{base}/api/users/nobody")).send().await.unwrap();
    assert_eq!(resp.status(), 400);

    let resp = client
        .post(format!("{base}/api/users/77/update-rating"))
        .json(&json!({ "rating": 1000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let base = start_server(app_with(&[("alice", 1000)]).await).await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/api/users"))
        .json(&json!({ "username": "alice", "rating": 300 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
}

#[tokio::test]
async fn search_returns_ranks() {
    let app = app_with(&[
        ("rahul_kumar", 1500),
        ("rahul_burman", 1500),
        ("riley_nair", 2000),
    ])
    .await;
    app.directory().create("rahul_rao").await.unwrap();
    let base = start_server(app).await;

    let body: Value = reqwest::get(format!("{base}/api/search?q=rahul"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let data = body["data"].as_array().unwrap();
    let summary: Vec<(String, Value)> = data
        .iter()
        .map(|u| (u["username"].as_str().unwrap().to_string(), u["global_rank"].clone()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("rahul_burman".to_string(), json!(2)),
            ("rahul_kumar".to_string(), json!(2)),
            ("rahul_rao".to_string(), Value::Null),
        ]
    );

    let resp = reqwest::get(format!("{base}/api/search?q=")).await.unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn cancelled_server_rejects_engine_calls() {
    let app = app_with(&[("a", 100)]).await;
    app.shutdown_token().cancel();
    let base = start_server(app).await;

    let resp = reqwest::get(format!("{base}/api/leaderboard")).await.unwrap();
    assert_eq!(resp.status(), 499);
}

#[tokio::test]
async fn malformed_input_is_a_json_400() {
    let base = start_server(app_with(&[("alice", 1000)]).await).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/api/search?q=a&limit=abc"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());

    for payload in [
        json!({ "username": "x" }),
        json!({ "username": "x", "rating": "high" }),
    ] {
        let resp = client
            .post(format!("{base}/api/users"))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400, "payload {payload}");
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"].is_string(), "payload {payload}");
    }

    let resp = client
        .post(format!("{base}/api/users/1/update-rating"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());

    let resp = client
        .post(format!("{base}/api/users"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn failed_score_write_releases_the_username() {
    let store = SwitchableStore::default();
    let app = Arc::new(App::new(
        RankingEngine::new(store.clone()),
        InMemoryEntityDirectory::new(),
        RankboardConfig::default(),
    ));
    let base = start_server(app.clone()).await;
    let client = reqwest::Client::new();
    let request = json!({ "username": "bob", "rating": 1200 });

    store.reject_writes.store(true, Ordering::SeqCst);
    let resp = client
        .post(format!("{base}/api/users"))
        .json(&request)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 503);
    assert!(app.directory().search_prefix("bob", 10).await.unwrap().is_empty());

    store.reject_writes.store(false, Ordering::SeqCst);
    let resp = client
        .post(format!("{base}/api/users"))
        .json(&request)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["username"], "bob");
    assert_eq!(created["global_rank"], 1);
}
