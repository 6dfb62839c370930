//! Tie-aware leaderboard ranking over a sorted score index.
//!
//! The engine answers three read questions and one write:
//!
//! - [`RankingEngine::rank_of`] - rank of one entity.
//! - [`RankingEngine::ranks_of`] - ranks of many entities in O(distinct scores)
//!   store round trips.
//! - [`RankingEngine::page`] - a leaderboard window whose ranks match
//!   `rank_of` for every row, including tie groups split across pages.
//! - [`RankingEngine::set_score`] - overwrite a score.
//!
//! Storage is injected through the [`ScoreStore`] trait; [`InMemoryScoreStore`]
//! implements it for tests and single-node deployments.

mod config;
mod context;
mod directory;
mod error;
mod ranking;
mod score;
mod search;
mod store;

pub mod seed;

#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "http")]
pub mod logging;

pub use config::{ConfigError, RankboardConfig};
pub use context::RequestContext;
pub use directory::{DirectoryError, EntityDirectory, EntityRecord, InMemoryEntityDirectory};
pub use error::{CancelReason, RankError};
pub use ranking::{BatchRankResolver, LeaderboardPager, RankResolver, RankingEngine};
pub use score::{rank_from_count, EntityId, Rank, RankedEntry, Score, ScoreEntry, Standing};
pub use search::{RankedProfile, SearchError, SearchService};
pub use store::{InMemoryScoreStore, ScoreStore, StoreError};

// Re-exported so callers can build contexts from their own tokens.
pub use tokio_util::sync::CancellationToken;
