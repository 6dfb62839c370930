//! Tie groups - ids bucketed by exact score so each distinct score costs one
//! count query no matter how many entities share it.

use std::collections::{BTreeMap, HashMap};

use futures::future::try_join_all;

use crate::context::RequestContext;
use crate::error::RankError;
use crate::score::{rank_from_count, EntityId, Rank, Score, Standing};
use crate::store::ScoreStore;

#[derive(Debug, Default)]
pub(crate) struct ScoreGroups {
    groups: BTreeMap<Score, Vec<EntityId>>,
}

impl ScoreGroups {
    pub(crate) fn from_pairs(pairs: impl IntoIterator<Item = (EntityId, Score)>) -> Self {
        let mut groups: BTreeMap<Score, Vec<EntityId>> = BTreeMap::new();
        for (id, score) in pairs {
            groups.entry(score).or_default().push(id);
        }
        Self { groups }
    }

    pub(crate) fn distinct(&self) -> usize {
        self.groups.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Rank of every distinct score, one `count_greater_than` per score.
    ///
    /// The count queries are issued concurrently and awaited as a unit: one
    /// failure or a fired context drops the rest.
    pub(crate) async fn rank_table<S>(
        &self,
        store: &S,
        cx: &RequestContext,
        operation: &'static str,
    ) -> Result<HashMap<Score, Rank>, RankError>
    where
        S: ScoreStore + ?Sized,
    {
        let scores: Vec<Score> = self.groups.keys().copied().collect();
        let counts = cx
            .run(
                operation,
                try_join_all(scores.iter().map(|score| store.count_greater_than(*score))),
            )
            .await?;

        Ok(scores
            .into_iter()
            .zip(counts)
            .map(|(score, higher)| (score, rank_from_count(higher)))
            .collect())
    }

    /// Expand a rank table back to every member id.
    pub(crate) fn assign(&self, table: &HashMap<Score, Rank>) -> HashMap<EntityId, Standing> {
        let mut standings = HashMap::new();
        for (score, ids) in &self.groups {
            if let Some(rank) = table.get(score) {
                for id in ids {
                    standings.insert(
                        *id,
                        Standing {
                            score: *score,
                            rank: *rank,
                        },
                    );
                }
            }
        }
        standings
    }
}
