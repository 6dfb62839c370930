//! Ranking engine - single, batch and paginated tie-aware rank queries.
//!
//! Ranks follow standard competition ranking: entities sharing a score share a
//! rank, and the next lower score's rank skips ahead by the tie group's size
//! (`1, 1, 3, 4`). All three read paths agree with each other for any entity
//! at the same instant.
//!
//! ## Example
//!
//! ```ignore
//! use rankboard::{InMemoryScoreStore, RankingEngine, RequestContext, EntityId, Score};
//!
//! let engine = RankingEngine::new(InMemoryScoreStore::new());
//! let cx = RequestContext::new();
//!
//! engine.set_score(&cx, EntityId(1), Score(1000)).await?;
//! engine.set_score(&cx, EntityId(2), Score(1000)).await?;
//!
//! assert_eq!(engine.rank_of(&cx, EntityId(2)).await?, 1);
//! let page = engine.page(&cx, 0, 50).await?;
//! ```

mod batch;
mod groups;
mod pager;
mod rank;

use std::collections::HashMap;

use crate::context::RequestContext;
use crate::error::RankError;
use crate::score::{EntityId, Rank, RankedEntry, Score, Standing};
use crate::store::ScoreStore;

pub use batch::BatchRankResolver;
pub use pager::LeaderboardPager;
pub use rank::RankResolver;

/// The four engine operations over one injected store handle.
///
/// Holds no mutable state of its own; every clone of `S` must address the
/// same underlying index.
pub struct RankingEngine<S> {
    store: S,
    single: RankResolver<S>,
    batch: BatchRankResolver<S>,
    pager: LeaderboardPager<S>,
}

impl<S: ScoreStore + Clone> RankingEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            single: RankResolver::new(store.clone()),
            batch: BatchRankResolver::new(store.clone()),
            pager: LeaderboardPager::new(store.clone()),
            store,
        }
    }

    /// See [`RankResolver::rank_of`].
    pub async fn rank_of(&self, cx: &RequestContext, id: EntityId) -> Result<Rank, RankError> {
        self.single.rank_of(cx, id).await
    }

    /// See [`BatchRankResolver::ranks_of`].
    pub async fn ranks_of(
        &self,
        cx: &RequestContext,
        ids: &[EntityId],
    ) -> Result<HashMap<EntityId, Rank>, RankError> {
        self.batch.ranks_of(cx, ids).await
    }

    /// See [`BatchRankResolver::standings_of`].
    pub async fn standings_of(
        &self,
        cx: &RequestContext,
        ids: &[EntityId],
    ) -> Result<HashMap<EntityId, Standing>, RankError> {
        self.batch.standings_of(cx, ids).await
    }

    /// See [`LeaderboardPager::page`].
    pub async fn page(
        &self,
        cx: &RequestContext,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<RankedEntry>, RankError> {
        self.pager.page(cx, offset, limit).await
    }

    /// Overwrite the score of `id`. Bounds are not checked here.
    pub async fn set_score(
        &self,
        cx: &RequestContext,
        id: EntityId,
        score: Score,
    ) -> Result<(), RankError> {
        cx.run("set_score", self.store.upsert(id, score)).await?;
        tracing::debug!(%id, %score, "score updated");
        Ok(())
    }

    /// Current score of `id`, if any.
    pub async fn score_of(
        &self,
        cx: &RequestContext,
        id: EntityId,
    ) -> Result<Option<Score>, RankError> {
        cx.run("score_of", self.store.score_of(id)).await
    }

    /// Number of ranked entities.
    pub async fn population(&self, cx: &RequestContext) -> Result<u64, RankError> {
        cx.run("population", self.store.cardinality()).await
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: ScoreStore + Clone> Clone for RankingEngine<S> {
    fn clone(&self) -> Self {
        Self::new(self.store.clone())
    }
}
