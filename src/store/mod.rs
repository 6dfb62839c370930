//! Score store - the ordered id → score index the ranking engine reads from.
//!
//! The engine treats the store as a remote sorted-set service: every call may
//! block on the network and may fail with a transport error. Batched lookups go
//! through [`ScoreStore::pipelined_score_of`] so N reads cost one round trip.
//!
//! ## Example
//!
//! ```ignore
//! use rankboard::{InMemoryScoreStore, ScoreStore, EntityId, Score};
//!
//! let store = InMemoryScoreStore::new();
//! store.upsert(EntityId(1), Score(1000)).await?;
//! let higher = store.count_greater_than(Score(900)).await?;
//! ```

mod in_memory;

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

use crate::score::{EntityId, Score, ScoreEntry};

/// Error type for score store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or rejected the request.
    Unavailable(String),
    /// The store did not answer in time.
    Timeout(String),
    /// An in-process store's lock was poisoned.
    LockPoisoned(&'static str),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "score store unavailable: {}", msg),
            StoreError::Timeout(msg) => write!(f, "score store timed out: {}", msg),
            StoreError::LockPoisoned(operation) => {
                write!(f, "score store lock poisoned during {}", operation)
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Ordered id → score index.
///
/// Implementations must keep at most one entry per id and must order
/// [`range_descending`](ScoreStore::range_descending) by score descending, then
/// by id ascending, so repeated pages over an unchanged store are identical.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Insert or overwrite the score of `id`.
    async fn upsert(&self, id: EntityId, score: Score) -> Result<(), StoreError>;

    /// Current score of `id`, or `None` when it has never been scored.
    async fn score_of(&self, id: EntityId) -> Result<Option<Score>, StoreError>;

    /// Number of entries whose score is strictly greater than `score`.
    async fn count_greater_than(&self, score: Score) -> Result<u64, StoreError>;

    /// Up to `limit` entries starting at position `offset` of the descending order.
    async fn range_descending(&self, offset: u64, limit: u64)
        -> Result<Vec<ScoreEntry>, StoreError>;

    /// Batched [`score_of`](ScoreStore::score_of) in one round trip. Ids without
    /// a score are left out of the result.
    async fn pipelined_score_of(
        &self,
        ids: &[EntityId],
    ) -> Result<HashMap<EntityId, Score>, StoreError>;

    /// Number of scored entities.
    async fn cardinality(&self) -> Result<u64, StoreError>;
}

pub use in_memory::InMemoryScoreStore;
