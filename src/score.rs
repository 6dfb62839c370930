//! Score and identifier primitives shared by the store and the resolvers.
//!
//! Both types are thin newtypes so ids and scores can't be swapped by accident.
//! They serialize transparently (`42`, not `{"0": 42}`) and parse from the
//! plain decimal form used in URLs and store keys.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opaque, stable identifier of a ranked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl EntityId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        EntityId(value)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(EntityId)
    }
}

/// The value entities are ranked by. Higher is better.
///
/// The engine only relies on the total order; bounds are a caller policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(pub i64);

impl Score {
    pub fn get(self) -> i64 {
        self.0
    }

    /// True when `self` lies in the inclusive range `[min, max]`.
    pub fn within(self, min: Score, max: Score) -> bool {
        min <= self && self <= max
    }
}

impl From<i64> for Score {
    fn from(value: i64) -> Self {
        Score(value)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Score {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Score)
    }
}

/// 1-based competition rank.
pub type Rank = u64;

/// Rank of an entity given how many entries score strictly higher.
pub fn rank_from_count(higher: u64) -> Rank {
    higher + 1
}

/// One (id, score) pair as held by a score store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub id: EntityId,
    pub score: Score,
}

impl ScoreEntry {
    pub fn new(id: u64, score: i64) -> Self {
        Self {
            id: EntityId(id),
            score: Score(score),
        }
    }
}

/// Score and rank of one entity at the time it was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub score: Score,
    pub rank: Rank,
}

/// A ranked leaderboard row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub rank: Rank,
    pub id: EntityId,
    pub score: Score,
}
