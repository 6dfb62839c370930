use crate::context::RequestContext;
use crate::error::RankError;
use crate::score::{rank_from_count, EntityId, Rank};
use crate::store::ScoreStore;

/// Tie-aware rank of a single entity: `1 + |{e : score(e) > score(target)}|`.
pub struct RankResolver<S> {
    store: S,
}

impl<S: ScoreStore> RankResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Rank of `id`, or [`RankError::NotFound`] when it has no score.
    pub async fn rank_of(&self, cx: &RequestContext, id: EntityId) -> Result<Rank, RankError> {
        let score = cx
            .run("rank_of", self.store.score_of(id))
            .await?
            .ok_or(RankError::NotFound(id))?;

        let higher = cx
            .run("rank_of", self.store.count_greater_than(score))
            .await?;

        tracing::debug!(%id, %score, higher, "resolved rank");
        Ok(rank_from_count(higher))
    }
}
