//! Prefix search over display names, decorated with global ranks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::RequestContext;
use crate::directory::{DirectoryError, EntityDirectory};
use crate::error::RankError;
use crate::ranking::RankingEngine;
use crate::score::{EntityId, Rank, Score};
use crate::store::ScoreStore;

/// A directory record joined with its current standing.
///
/// `rating` and `global_rank` are `None` for entities that were never scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedProfile {
    pub id: EntityId,
    pub username: String,
    pub rating: Option<Score>,
    pub global_rank: Option<Rank>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    Directory(DirectoryError),
    Rank(RankError),
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::Directory(e) => write!(f, "search failed: {}", e),
            SearchError::Rank(e) => write!(f, "search failed: {}", e),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SearchError::Directory(e) => Some(e),
            SearchError::Rank(e) => Some(e),
        }
    }
}

impl From<DirectoryError> for SearchError {
    fn from(err: DirectoryError) -> Self {
        SearchError::Directory(err)
    }
}

impl From<RankError> for SearchError {
    fn from(err: RankError) -> Self {
        SearchError::Rank(err)
    }
}

pub struct SearchService<S, D> {
    engine: RankingEngine<S>,
    directory: D,
}

impl<S, D> SearchService<S, D>
where
    S: ScoreStore + Clone,
    D: EntityDirectory,
{
    pub fn new(engine: RankingEngine<S>, directory: D) -> Self {
        Self { engine, directory }
    }

    /// Up to `limit` entities whose name starts with `prefix`, in name order,
    /// each with its global rank. All hits are ranked in a single batch.
    pub async fn search(
        &self,
        cx: &RequestContext,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<RankedProfile>, SearchError> {
        let hits = self.directory.search_prefix(prefix, limit).await?;
        if hits.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<EntityId> = hits.iter().map(|r| r.id).collect();
        let standings = self.engine.standings_of(cx, &ids).await?;

        Ok(hits
            .into_iter()
            .map(|record| {
                let standing = standings.get(&record.id);
                RankedProfile {
                    id: record.id,
                    username: record.display_name,
                    rating: standing.map(|s| s.score),
                    global_rank: standing.map(|s| s.rank),
                    created_at: record.created_at,
                    updated_at: record.updated_at,
                }
            })
            .collect())
    }

    pub fn engine(&self) -> &RankingEngine<S> {
        &self.engine
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }
}
