//! InMemoryScoreStore - BTreeSet-backed score store for testing and development.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Bound::{Excluded, Unbounded};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::{ScoreStore, StoreError};
use crate::score::{EntityId, Score, ScoreEntry};

#[derive(Default)]
struct Index {
    scores: HashMap<EntityId, Score>,
    /// Descending score, ascending id.
    ordered: BTreeSet<(Reverse<Score>, EntityId)>,
    /// Members per distinct score. Counting walks distinct scores, not entries.
    tallies: BTreeMap<Score, u64>,
}

impl Index {
    fn upsert(&mut self, id: EntityId, score: Score) {
        if let Some(previous) = self.scores.insert(id, score) {
            if previous == score {
                return;
            }
            self.ordered.remove(&(Reverse(previous), id));
            self.release(previous);
        }
        self.ordered.insert((Reverse(score), id));
        *self.tallies.entry(score).or_insert(0) += 1;
    }

    fn release(&mut self, score: Score) {
        if let Some(members) = self.tallies.get_mut(&score) {
            *members -= 1;
            if *members == 0 {
                self.tallies.remove(&score);
            }
        }
    }

    fn count_greater_than(&self, score: Score) -> u64 {
        self.tallies
            .range((Excluded(score), Unbounded))
            .map(|(_, members)| members)
            .sum()
    }
}

/// In-memory score store backed by an ordered set plus an id → score map.
///
/// Clone-friendly via Arc; clones share the same index.
#[derive(Clone, Default)]
pub struct InMemoryScoreStore {
    index: Arc<RwLock<Index>>,
}

impl InMemoryScoreStore {
    /// Create a new empty score store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`. Later duplicates win.
    pub fn with_entries(entries: impl IntoIterator<Item = ScoreEntry>) -> Self {
        let mut index = Index::default();
        for entry in entries {
            index.upsert(entry.id, entry.score);
        }
        Self {
            index: Arc::new(RwLock::new(index)),
        }
    }

    fn read(
        &self,
        operation: &'static str,
    ) -> Result<std::sync::RwLockReadGuard<'_, Index>, StoreError> {
        self.index
            .read()
            .map_err(|_| StoreError::LockPoisoned(operation))
    }
}

#[async_trait]
impl ScoreStore for InMemoryScoreStore {
    async fn upsert(&self, id: EntityId, score: Score) -> Result<(), StoreError> {
        let mut index = self
            .index
            .write()
            .map_err(|_| StoreError::LockPoisoned("upsert"))?;
        index.upsert(id, score);
        Ok(())
    }

    async fn score_of(&self, id: EntityId) -> Result<Option<Score>, StoreError> {
        Ok(self.read("score_of")?.scores.get(&id).copied())
    }

    async fn count_greater_than(&self, score: Score) -> Result<u64, StoreError> {
        Ok(self.read("count_greater_than")?.count_greater_than(score))
    }

    async fn range_descending(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<ScoreEntry>, StoreError> {
        let index = self.read("range_descending")?;
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(index
            .ordered
            .iter()
            .skip(offset)
            .take(limit)
            .map(|(Reverse(score), id)| ScoreEntry {
                id: *id,
                score: *score,
            })
            .collect())
    }

    async fn pipelined_score_of(
        &self,
        ids: &[EntityId],
    ) -> Result<HashMap<EntityId, Score>, StoreError> {
        let index = self.read("pipelined_score_of")?;
        Ok(ids
            .iter()
            .filter_map(|id| index.scores.get(id).map(|score| (*id, *score)))
            .collect())
    }

    async fn cardinality(&self) -> Result<u64, StoreError> {
        Ok(self.read("cardinality")?.scores.len() as u64)
    }
}
