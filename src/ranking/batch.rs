use std::collections::HashMap;

use super::groups::ScoreGroups;
use crate::context::RequestContext;
use crate::error::RankError;
use crate::score::{EntityId, Rank, Standing};
use crate::store::ScoreStore;

/// Ranks for many entities at once.
///
/// Scores are read in one pipelined call, then ids are bucketed by score so a
/// tie group of any size costs a single count query. Store cost is
/// O(distinct scores) rather than O(ids).
pub struct BatchRankResolver<S> {
    store: S,
}

impl<S: ScoreStore> BatchRankResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Rank of every id in `ids` that has a score. Unscored ids are left out;
    /// duplicates collapse. A store failure fails the whole batch.
    pub async fn ranks_of(
        &self,
        cx: &RequestContext,
        ids: &[EntityId],
    ) -> Result<HashMap<EntityId, Rank>, RankError> {
        Ok(self
            .standings_of(cx, ids)
            .await?
            .into_iter()
            .map(|(id, standing)| (id, standing.rank))
            .collect())
    }

    /// Like [`ranks_of`](Self::ranks_of) but keeps the score each rank was
    /// derived from.
    pub async fn standings_of(
        &self,
        cx: &RequestContext,
        ids: &[EntityId],
    ) -> Result<HashMap<EntityId, Standing>, RankError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let scores = cx
            .run("ranks_of", self.store.pipelined_score_of(ids))
            .await?;
        let groups = ScoreGroups::from_pairs(scores);
        if groups.is_empty() {
            return Ok(HashMap::new());
        }

        let table = groups.rank_table(&self.store, cx, "ranks_of").await?;
        let standings = groups.assign(&table);

        tracing::debug!(
            requested = ids.len(),
            ranked = standings.len(),
            distinct_scores = groups.distinct(),
            "resolved batch ranks"
        );
        Ok(standings)
    }
}
