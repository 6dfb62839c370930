//! Random population for demos and load tests.

use std::collections::HashSet;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::context::RequestContext;
use crate::directory::{DirectoryError, EntityDirectory, EntityRecord};
use crate::error::RankError;
use crate::ranking::RankingEngine;
use crate::score::Score;
use crate::store::ScoreStore;

const FIRST_NAMES: &[&str] = &[
    "rahul", "brandon", "cody", "lee", "leslie", "wade", "soham", "brandie", "jorge", "kristin",
    "alex", "sam", "taylor", "jordan", "casey", "riley", "avery", "quinn", "dakota", "skyler",
    "morgan", "cameron", "hayden", "logan", "blake", "sage", "river", "phoenix", "rowan",
    "finley",
];

const LAST_NAMES: &[&str] = &[
    "burman", "mathur", "kumar", "singh", "patel", "sharma", "gupta", "verma", "reddy", "rao",
    "mehta", "jain", "agarwal", "malik", "kapoor", "chopra", "nair", "iyer", "menon",
    "krishnan", "raman", "sundaram",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedError {
    Directory(DirectoryError),
    Rank(RankError),
}

impl fmt::Display for SeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedError::Directory(e) => write!(f, "seeding failed: {}", e),
            SeedError::Rank(e) => write!(f, "seeding failed: {}", e),
        }
    }
}

impl std::error::Error for SeedError {}

impl From<DirectoryError> for SeedError {
    fn from(err: DirectoryError) -> Self {
        SeedError::Directory(err)
    }
}

impl From<RankError> for SeedError {
    fn from(err: RankError) -> Self {
        SeedError::Rank(err)
    }
}

/// Create `count` users named `first_last` (suffixed `_2`, `_3`, ... on
/// collision) with uniformly random scores in `[min, max]`.
pub async fn seed_population<S, D, R>(
    cx: &RequestContext,
    engine: &RankingEngine<S>,
    directory: &D,
    count: usize,
    (min, max): (Score, Score),
    rng: &mut R,
) -> Result<Vec<EntityRecord>, SeedError>
where
    S: ScoreStore + Clone,
    D: EntityDirectory,
    R: Rng + Send,
{
    let mut used = HashSet::with_capacity(count);
    let mut created = Vec::with_capacity(count);

    for _ in 0..count {
        let name = unique_name(rng, &mut used);
        let score = Score(rng.gen_range(min.get()..=max.get()));

        let record = directory.create(&name).await?;
        engine.set_score(cx, record.id, score).await?;
        created.push(record);
    }

    tracing::info!(count, %min, %max, "seeded population");
    Ok(created)
}

fn unique_name<R: Rng>(rng: &mut R, used: &mut HashSet<String>) -> String {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("user");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("anon");
    let base = format!("{}_{}", first, last);

    let mut name = base.clone();
    let mut suffix = 2;
    while used.contains(&name) {
        name = format!("{}_{}", base, suffix);
        suffix += 1;
    }
    used.insert(name.clone());
    name
}
