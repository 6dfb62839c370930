//! Page boundaries, completeness and tie groups split across pages.

use std::collections::HashSet;

use rankboard::{EntityId, InMemoryScoreStore, RankingEngine, RequestContext, ScoreEntry};

use crate::support::{random_population, reference_order, reference_ranks};

#[tokio::test]
async fn tie_group_straddling_a_boundary_keeps_one_rank() {
    // Positions 9..=12 (1-based) share score 500; pages of 10 split them 2 / 2.
    let mut entries: Vec<ScoreEntry> = (1..=8u64).map(|id| ScoreEntry::new(id, 1000 - id as i64)).collect();
    entries.extend((9..=12).map(|id| ScoreEntry::new(id, 500)));
    entries.extend((13..=20u64).map(|id| ScoreEntry::new(id, 400 - id as i64)));

    let engine = RankingEngine::new(InMemoryScoreStore::with_entries(entries));
    let cx = RequestContext::new();

    let first = engine.page(&cx, 0, 10).await.unwrap();
    let second = engine.page(&cx, 10, 10).await.unwrap();

    let tail: Vec<(u64, u64)> = first[8..].iter().map(|r| (r.id.get(), r.rank)).collect();
    let head: Vec<(u64, u64)> = second[..2].iter().map(|r| (r.id.get(), r.rank)).collect();
    assert_eq!(tail, vec![(9, 9), (10, 9)]);
    assert_eq!(head, vec![(11, 9), (12, 9)]);

    // The rank after the group jumps by the group's size.
    assert_eq!(second[2].rank, 13);

    for id in 9..=12 {
        assert_eq!(engine.rank_of(&cx, EntityId(id)).await.unwrap(), 9);
    }
}

#[tokio::test]
async fn concatenated_pages_reproduce_the_full_order() {
    let entries = random_population(42, 737, 100, 180);
    let expected = reference_order(&entries);
    let engine = RankingEngine::new(InMemoryScoreStore::with_entries(entries.iter().copied()));
    let cx = RequestContext::new();

    for k in [1_i64, 7, 50, 100, 736, 737, 1000] {
        let mut collected = Vec::new();
        let mut offset = 0;
        loop {
            let page = engine.page(&cx, offset, k).await.unwrap();
            if page.is_empty() {
                break;
            }
            assert!(page.len() as i64 <= k);
            collected.extend(page.into_iter().map(|r| ScoreEntry {
                id: r.id,
                score: r.score,
            }));
            offset += k;
        }

        assert_eq!(collected, expected, "page size {}", k);
        let unique: HashSet<EntityId> = collected.iter().map(|e| e.id).collect();
        assert_eq!(unique.len(), entries.len());
    }
}

#[tokio::test]
async fn ranks_within_a_page_are_competition_ranks() {
    let entries = random_population(9, 400, 1, 30);
    let expected = reference_ranks(&entries);
    let engine = RankingEngine::new(InMemoryScoreStore::with_entries(entries.iter().copied()));
    let cx = RequestContext::new();

    let page = engine.page(&cx, 120, 80).await.unwrap();
    for pair in page.windows(2) {
        assert!(pair[0].score >= pair[1].score);
        assert!(pair[0].rank <= pair[1].rank);
        if pair[0].score == pair[1].score {
            assert_eq!(pair[0].rank, pair[1].rank);
            assert!(pair[0].id < pair[1].id);
        }
    }
    for row in &page {
        assert_eq!(row.rank, expected[&row.id]);
    }
}

#[tokio::test]
async fn repeated_queries_are_deterministic() {
    let entries = random_population(3, 300, 1, 5);
    let engine = RankingEngine::new(InMemoryScoreStore::with_entries(entries));
    let cx = RequestContext::new();

    let a = engine.page(&cx, 40, 60).await.unwrap();
    let b = engine.page(&cx, 40, 60).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn empty_store_has_empty_pages() {
    let engine = RankingEngine::new(InMemoryScoreStore::new());
    let page = engine.page(&RequestContext::new(), 0, 50).await.unwrap();
    assert!(page.is_empty());
}

#[tokio::test]
async fn offset_past_population_is_empty() {
    let engine = RankingEngine::new(InMemoryScoreStore::with_entries(
        (1..=10u64).map(|id| ScoreEntry::new(id, id as i64)),
    ));
    let cx = RequestContext::new();
    assert!(engine.page(&cx, 10, 5).await.unwrap().is_empty());
    assert!(engine.page(&cx, 1_000_000, 5).await.unwrap().is_empty());
    assert_eq!(engine.page(&cx, 8, 5).await.unwrap().len(), 2);
}

#[tokio::test]
async fn limit_may_cover_the_whole_population() {
    let entries = random_population(77, 2500, 100, 5000);
    let engine = RankingEngine::new(InMemoryScoreStore::with_entries(entries.iter().copied()));
    let page = engine
        .page(&RequestContext::new(), 0, 2500)
        .await
        .unwrap();
    assert_eq!(page.len(), 2500);
    assert_eq!(page[0].rank, 1);
}
