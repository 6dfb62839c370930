use super::groups::ScoreGroups;
use crate::context::RequestContext;
use crate::error::RankError;
use crate::score::{RankedEntry, ScoreEntry};
use crate::store::ScoreStore;

/// Leaderboard windows with globally correct ranks.
///
/// A row's rank is always `1 + count(score > row.score)` over the whole store,
/// never `offset + position`. The positional formula breaks as soon as a tie
/// group straddles the window's first row.
pub struct LeaderboardPager<S> {
    store: S,
}

impl<S: ScoreStore> LeaderboardPager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Rows at positions `[offset, offset + limit)` of the descending order.
    ///
    /// An offset past the end yields an empty page. `limit` has no upper bound
    /// here; callers clamp it.
    pub async fn page(
        &self,
        cx: &RequestContext,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<RankedEntry>, RankError> {
        let (offset, limit) = validate_window(offset, limit)?;

        let window = cx
            .run("page", self.store.range_descending(offset, limit))
            .await?;
        if window.is_empty() {
            return Ok(Vec::new());
        }

        let groups = ScoreGroups::from_pairs(window.iter().map(|e| (e.id, e.score)));
        let table = groups.rank_table(&self.store, cx, "page").await?;

        tracing::debug!(
            offset,
            limit,
            rows = window.len(),
            distinct_scores = groups.distinct(),
            "resolved leaderboard page"
        );

        // The table was built from this window's scores, so every lookup hits.
        Ok(window
            .into_iter()
            .map(|ScoreEntry { id, score }| RankedEntry {
                rank: table[&score],
                id,
                score,
            })
            .collect())
    }
}

fn validate_window(offset: i64, limit: i64) -> Result<(u64, u64), RankError> {
    let offset = u64::try_from(offset).map_err(|_| {
        RankError::InvalidArgument(format!("offset must be non-negative, got {}", offset))
    })?;
    if limit <= 0 {
        return Err(RankError::InvalidArgument(format!(
            "limit must be positive, got {}",
            limit
        )));
    }
    Ok((offset, limit as u64))
}
