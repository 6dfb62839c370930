//! HTTP API over the ranking engine and the entity directory.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /health` - `{ "ok": true, "population": n }`.
//! - `GET /api/leaderboard?page=&limit=` - one ranked page joined with names.
//! - `GET /api/search?q=&limit=` - prefix search with global ranks.
//! - `GET /api/users/:id` - one user with rating and rank.
//! - `POST /api/users` - `{ "username", "rating" }`, responds 201.
//! - `POST /api/users/:id/update-rating` - `{ "rating" }`.
//!
//! Every request runs under a [`RequestContext`] with the configured timeout,
//! derived from the app's shutdown token so in-flight store calls stop when the
//! server does.

use std::fmt;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::config::RankboardConfig;
use crate::context::RequestContext;
use crate::directory::{DirectoryError, EntityDirectory};
use crate::error::RankError;
use crate::ranking::RankingEngine;
use crate::score::{EntityId, Score};
use crate::search::{RankedProfile, SearchError, SearchService};
use crate::store::ScoreStore;

/// Shared state behind every route.
pub struct App<S, D> {
    search: SearchService<S, D>,
    config: RankboardConfig,
    shutdown: CancellationToken,
}

impl<S, D> App<S, D>
where
    S: ScoreStore + Clone,
    D: EntityDirectory,
{
    pub fn new(engine: RankingEngine<S>, directory: D, config: RankboardConfig) -> Self {
        Self {
            search: SearchService::new(engine, directory),
            config,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn engine(&self) -> &RankingEngine<S> {
        self.search.engine()
    }

    pub fn directory(&self) -> &D {
        self.search.directory()
    }

    pub fn config(&self) -> &RankboardConfig {
        &self.config
    }

    /// Cancelling this token stops the server and every in-flight request.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    fn request_context(&self) -> RequestContext {
        RequestContext::with_token(self.shutdown.child_token())
            .deadline(tokio::time::Instant::now() + self.config.request_timeout())
    }

    fn check_rating(&self, rating: Score) -> Result<(), ApiError> {
        if rating.within(self.config.min_score, self.config.max_score) {
            Ok(())
        } else {
            Err(ApiError::BadRequest(format!(
                "rating must be between {} and {}",
                self.config.min_score, self.config.max_score
            )))
        }
    }
}

/// Error type for HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    Rank(RankError),
    Directory(DirectoryError),
    BadRequest(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Rank(e) => write!(f, "{}", e),
            ApiError::Directory(e) => write!(f, "{}", e),
            ApiError::BadRequest(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Rank(e) => e.status_code(),
            ApiError::Directory(e) => e.status_code(),
            ApiError::BadRequest(_) => 400,
        }
    }
}

impl From<RankError> for ApiError {
    fn from(err: RankError) -> Self {
        ApiError::Rank(err)
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        ApiError::Directory(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Directory(e) => ApiError::Directory(e),
            SearchError::Rank(e) => ApiError::Rank(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Build an axum `Router` serving the API for `app`.
pub fn router<S, D>(app: Arc<App<S, D>>) -> Router
where
    S: ScoreStore + Clone + 'static,
    D: EntityDirectory + 'static,
{
    Router::new()
        .route("/health", get(health::<S, D>))
        .route("/api/leaderboard", get(leaderboard::<S, D>))
        .route("/api/search", get(search::<S, D>))
        .route("/api/users", post(create_user::<S, D>))
        .route("/api/users/:id", get(get_user::<S, D>))
        .route("/api/users/:id/update-rating", post(update_rating::<S, D>))
        .with_state(app)
}

/// Serve the API at `addr` (e.g. `"0.0.0.0:8080"`) until the app's shutdown
/// token is cancelled.
pub async fn serve<S, D>(app: Arc<App<S, D>>, addr: &str) -> Result<(), std::io::Error>
where
    S: ScoreStore + Clone + 'static,
    D: EntityDirectory + 'static,
{
    let shutdown = app.shutdown_token();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tracing::info!(addr = %local, "rankboard listening");
    axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    page: Option<String>,
    limit: Option<String>,
}

impl PageParams {
    /// (page, limit, offset). Unparseable or out-of-range values fall back to
    /// page 1 and the default limit.
    fn resolve(&self, config: &RankboardConfig) -> Result<(i64, i64, i64), ApiError> {
        let page = self
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        let limit = self
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| (1..=config.max_page_limit).contains(l))
            .unwrap_or(config.default_page_limit);
        let offset = (page - 1)
            .checked_mul(limit)
            .ok_or_else(|| ApiError::BadRequest(format!("page {} is out of range", page)))?;
        Ok((page, limit, offset))
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub rating: Score,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRating {
    pub rating: Score,
}

async fn health<S, D>(State(app): State<Arc<App<S, D>>>) -> Result<Json<Value>, ApiError>
where
    S: ScoreStore + Clone + 'static,
    D: EntityDirectory + 'static,
{
    let population = app.engine().population(&app.request_context()).await?;
    Ok(Json(json!({ "ok": true, "population": population })))
}

async fn leaderboard<S, D>(
    State(app): State<Arc<App<S, D>>>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError>
where
    S: ScoreStore + Clone + 'static,
    D: EntityDirectory + 'static,
{
    let Query(params) = params?;
    let (page, limit, offset) = params.resolve(app.config())?;
    let cx = app.request_context();

    let rows = app.engine().page(&cx, offset, limit).await?;
    let total = app.engine().population(&cx).await?;

    let ids: Vec<EntityId> = rows.iter().map(|r| r.id).collect();
    let names = app.directory().metadata_for(&ids).await?;

    let data: Vec<Value> = rows
        .iter()
        .map(|row| {
            json!({
                "rank": row.rank,
                "user_id": row.id,
                "username": names.get(&row.id).map(|r| r.display_name.as_str()),
                "rating": row.score,
            })
        })
        .collect();

    Ok(Json(json!({
        "data": data,
        "page": page,
        "limit": limit,
        "total": total,
    })))
}

async fn search<S, D>(
    State(app): State<Arc<App<S, D>>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError>
where
    S: ScoreStore + Clone + 'static,
    D: EntityDirectory + 'static,
{
    let Query(params) = params?;
    let prefix = params.q.trim();
    if prefix.is_empty() {
        return Err(ApiError::BadRequest("query parameter q is required".into()));
    }
    let limit = params
        .limit
        .filter(|l| (1..=app.config().max_page_limit as usize).contains(l))
        .unwrap_or(app.config().default_search_limit);

    let results = app
        .search
        .search(&app.request_context(), prefix, limit)
        .await?;
    Ok(Json(json!({ "data": results })))
}

async fn get_user<S, D>(
    State(app): State<Arc<App<S, D>>>,
    Path(id): Path<String>,
) -> Result<Json<RankedProfile>, ApiError>
where
    S: ScoreStore + Clone + 'static,
    D: EntityDirectory + 'static,
{
    let id = parse_id(&id)?;
    let record = app
        .directory()
        .get(id)
        .await?
        .ok_or(DirectoryError::NotFound(id))?;
    let standing = app
        .engine()
        .standings_of(&app.request_context(), &[id])
        .await?
        .remove(&id);

    Ok(Json(RankedProfile {
        id,
        username: record.display_name,
        rating: standing.map(|s| s.score),
        global_rank: standing.map(|s| s.rank),
        created_at: record.created_at,
        updated_at: record.updated_at,
    }))
}

async fn create_user<S, D>(
    State(app): State<Arc<App<S, D>>>,
    input: Result<Json<CreateUser>, JsonRejection>,
) -> Result<(StatusCode, Json<RankedProfile>), ApiError>
where
    S: ScoreStore + Clone + 'static,
    D: EntityDirectory + 'static,
{
    let Json(input) = input?;
    let username = input.username.trim();
    if username.is_empty() {
        return Err(ApiError::BadRequest("username is required".into()));
    }
    app.check_rating(input.rating)?;

    let cx = app.request_context();
    let record = app.directory().create(username).await?;
    if let Err(err) = app.engine().set_score(&cx, record.id, input.rating).await {
        // Release the name so the client can retry the same request.
        if let Err(cleanup) = app.directory().remove(record.id).await {
            tracing::error!(id = %record.id, error = %cleanup, "failed to roll back user");
        }
        return Err(err.into());
    }

    // The user exists once scored; a failed rank read only leaves the rank out.
    let rank = match app.engine().rank_of(&cx, record.id).await {
        Ok(rank) => Some(rank),
        Err(err) => {
            tracing::warn!(id = %record.id, error = %err, "rank unavailable for new user");
            None
        }
    };

    tracing::info!(id = %record.id, username, rating = %input.rating, "user created");
    Ok((
        StatusCode::CREATED,
        Json(RankedProfile {
            id: record.id,
            username: record.display_name,
            rating: Some(input.rating),
            global_rank: rank,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }),
    ))
}

async fn update_rating<S, D>(
    State(app): State<Arc<App<S, D>>>,
    Path(id): Path<String>,
    input: Result<Json<UpdateRating>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
    S: ScoreStore + Clone + 'static,
    D: EntityDirectory + 'static,
{
    let Json(input) = input?;
    let id = parse_id(&id)?;
    app.check_rating(input.rating)?;

    let cx = app.request_context();
    app.directory().touch(id).await?;
    app.engine().set_score(&cx, id, input.rating).await?;
    let rank = app.engine().rank_of(&cx, id).await?;

    Ok(Json(json!({
        "message": "rating updated successfully",
        "id": id,
        "rating": input.rating,
        "global_rank": rank,
    })))
}

fn parse_id(raw: &str) -> Result<EntityId, ApiError> {
    raw.parse::<EntityId>()
        .map_err(|_| ApiError::BadRequest(format!("invalid user id: {}", raw)))
}
