//! End-to-end tests: rating history in, ranked recommendations out.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use engine::RecommendationEngine;
use peers::{PeerPool, PeerVector, SyntheticPeerPool};
use scoring::Category;
use store::{
    Catalog, CatalogItem, ContentKind, Credits, DiscoverFilter, ItemId, MemoryCatalog,
    MemoryRatingStore, RatingEvent, RatingScore,
};

const NOW: i64 = 1_700_000_000; // late 2023
const ACTION: u32 = 28;
const DRAMA: u32 = 18;
const COMEDY: u32 = 35;

fn item(id: u32, genres: Vec<u32>, year: u16, rating: f32) -> CatalogItem {
    CatalogItem {
        id,
        kind: ContentKind::Movie,
        title: format!("Item {id}"),
        genres,
        release_year: Some(year),
        rating,
        credits: Credits::default(),
        companies: vec![],
    }
}

fn catalog() -> MemoryCatalog {
    let mut items = vec![item(1000, vec![ACTION], 2023, 8.5)];
    for i in 0..20 {
        items.push(item(
            1001 + i,
            vec![if i % 2 == 0 { ACTION } else { DRAMA }],
            2015 + (i % 9) as u16,
            6.0 + (i % 25) as f32 / 10.0,
        ));
    }
    MemoryCatalog::with_items(items)
}

fn rating(item_id: u32, score: u8, genres: Vec<u32>, year: u16, offset_days: i64) -> RatingEvent {
    RatingEvent {
        item_id,
        kind: ContentKind::Movie,
        score: RatingScore::Simple(score),
        timestamp: NOW - offset_days * 86_400,
        review: None,
        genres,
        release_year: Some(year),
        credits: Credits::default(),
        companies: vec![],
    }
}

fn engine_with(history: Vec<RatingEvent>) -> RecommendationEngine {
    engine_with_parts(
        history,
        Arc::new(catalog()),
        Arc::new(SyntheticPeerPool::from_vectors(vec![])),
    )
}

fn engine_with_parts(
    history: Vec<RatingEvent>,
    catalog: Arc<dyn Catalog>,
    pool: Arc<dyn PeerPool>,
) -> RecommendationEngine {
    // RUST_LOG=debug cargo test -p engine -- --nocapture
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let store = Arc::new(MemoryRatingStore::from_events(history).unwrap());
    RecommendationEngine::with_clock(store, catalog, pool, Arc::new(|| NOW))
}

fn peer(peer_id: u32, pairs: &[(ItemId, f32)]) -> PeerVector {
    PeerVector {
        peer_id,
        ratings: pairs.iter().copied().collect(),
    }
}

/// Fails every discover call that carries no genre or year constraint
struct PartialOutageCatalog {
    inner: MemoryCatalog,
}

#[async_trait]
impl Catalog for PartialOutageCatalog {
    async fn discover(&self, filter: &DiscoverFilter) -> anyhow::Result<Vec<CatalogItem>> {
        if filter.genres.is_empty() && filter.year_range.is_none() {
            anyhow::bail!("catalog shard unavailable");
        }
        self.inner.discover(filter).await
    }

    async fn details(&self, item_id: ItemId) -> anyhow::Result<Option<CatalogItem>> {
        self.inner.details(item_id).await
    }
}

/// Delays every discover call, leaving aggregations parked mid-flight
struct SlowCatalog {
    inner: MemoryCatalog,
    delay: Duration,
}

#[async_trait]
impl Catalog for SlowCatalog {
    async fn discover(&self, filter: &DiscoverFilter) -> anyhow::Result<Vec<CatalogItem>> {
        tokio::time::sleep(self.delay).await;
        self.inner.discover(filter).await
    }

    async fn details(&self, item_id: ItemId) -> anyhow::Result<Option<CatalogItem>> {
        self.inner.details(item_id).await
    }
}

#[tokio::test]
async fn test_zero_ratings_is_the_still_learning_state() {
    let engine = engine_with(vec![]);

    let profile = engine.profile();
    assert!(!profile.has_enough_data());
    assert_eq!(profile.metrics.completeness, 0.0);
    assert!(engine.recommendations().await.is_empty());
}

#[tokio::test]
async fn test_three_strong_ratings_unlock_recommendations() {
    let history = (0..3)
        .map(|i| rating(1001 + i, 9, vec![ACTION], 2020, i as i64))
        .collect();
    let engine = engine_with(history);

    let profile = engine.profile();
    assert!(profile.has_enough_data());
    assert!(profile.genre_affinities[&ACTION].score > 5.0);
    assert!(!engine.recommendations().await.is_empty());
}

#[tokio::test]
async fn test_rated_items_never_recommended() {
    let history: Vec<RatingEvent> = (0..8)
        .map(|i| rating(1001 + i, 8, vec![ACTION], 2020, i as i64))
        .collect();
    let engine = engine_with(history);

    let recs = engine.recommendations().await;
    assert!(!recs.is_empty());
    for rec in &recs {
        assert!(
            !(1001..1009).contains(&rec.item.id),
            "rated item {} leaked into recommendations",
            rec.item.id
        );
    }
}

#[tokio::test]
async fn test_strong_genre_fit_lands_in_perfect_match() {
    // 20 high ratings, all Action from the early 2020s
    let history: Vec<RatingEvent> = (0..20)
        .map(|i| {
            rating(
                2000 + i,
                if i % 2 == 0 { 9 } else { 8 },
                vec![ACTION],
                2020 + (i % 4) as u16,
                i as i64 * 2,
            )
        })
        .collect();
    let engine = engine_with(history);

    let recs = engine.recommendations().await;
    let hit = recs
        .iter()
        .find(|r| r.item.id == 1000)
        .expect("the recent high-rated Action item should be recommended");

    assert!(hit.match_score >= 85, "match was {}", hit.match_score);
    assert_eq!(hit.category, Category::PerfectMatch);
    assert!(!hit.reasoning.primary.is_empty());
}

#[tokio::test]
async fn test_results_sorted_by_priority_and_capped() {
    let history: Vec<RatingEvent> = (0..10)
        .map(|i| rating(2000 + i, 8, vec![ACTION, DRAMA], 2018, i as i64))
        .collect();
    let engine = engine_with(history);

    let recs = engine.recommendations().await;
    assert!(recs.len() <= 30);
    for pair in recs.windows(2) {
        assert!(pair[0].priority >= pair[1].priority);
    }
    for rec in &recs {
        assert!(rec.match_score >= 60);
        assert!(rec.confidence >= 0.1 && rec.confidence <= 1.0);
    }

    // All-movie catalog: the series filter has nothing to return
    assert!(engine
        .recommendations_of_kind(ContentKind::Series)
        .await
        .is_empty());
}

#[tokio::test]
async fn test_category_filter_is_a_strict_subset() {
    let history: Vec<RatingEvent> = (0..10)
        .map(|i| rating(2000 + i, 9, vec![ACTION], 2020, i as i64))
        .collect();
    let engine = engine_with(history);

    let picks = engine
        .recommendations_by_category(Category::PerfectMatch)
        .await;
    for rec in &picks {
        assert_eq!(rec.category, Category::PerfectMatch);
    }
}

#[tokio::test]
async fn test_accepted_rating_bumps_generation_and_stale_does_not() {
    let engine = engine_with(vec![rating(1001, 8, vec![ACTION], 2020, 5)]);
    let before = engine.generation();

    // Newer rating for the same item replaces and rebuilds
    let applied = engine.rate(rating(1001, 4, vec![ACTION], 2020, 1)).unwrap();
    assert!(applied);
    assert_eq!(engine.generation(), before + 1);

    // An older event for the same item is dropped without a rebuild
    let stale = engine.rate(rating(1001, 10, vec![ACTION], 2020, 30)).unwrap();
    assert!(!stale);
    assert_eq!(engine.generation(), before + 1);
}

#[tokio::test]
async fn test_insights_summarize_the_list() {
    let history: Vec<RatingEvent> = (0..10)
        .map(|i| rating(2000 + i, 9, vec![ACTION], 2020, i as i64))
        .collect();
    let engine = engine_with(history);

    let insights = engine.insights().await;
    assert!(insights.total > 0);
    assert!(insights.average_match >= 60.0);
    let counted: usize = insights.category_distribution.values().sum();
    assert_eq!(counted, insights.total);
}

#[tokio::test]
async fn test_peer_endorsed_item_surfaces_with_peer_reason() {
    // Item 500 is reachable through peers only: wrong genre for the
    // genre strategy, below the 7.5 quality floor, wrong decade
    let catalog = MemoryCatalog::with_items(vec![
        item(500, vec![COMEDY], 1999, 7.0),
        item(1000, vec![ACTION], 2023, 8.5),
    ]);

    let history = vec![
        rating(1001, 9, vec![ACTION], 2020, 1),
        rating(1002, 5, vec![ACTION], 2020, 2),
        rating(1003, 8, vec![ACTION], 2020, 3),
    ];
    // Both peers track the user's ratings closely and endorse item 500
    let pool = SyntheticPeerPool::from_vectors(vec![
        peer(1, &[(1001, 5.0), (1002, 2.0), (1003, 4.0), (500, 5.0)]),
        peer(2, &[(1001, 4.0), (1002, 3.0), (1003, 4.0), (500, 4.0)]),
    ]);
    let engine = engine_with_parts(history, Arc::new(catalog), Arc::new(pool));

    let recs = engine.recommendations().await;
    let endorsed = recs
        .iter()
        .find(|r| r.item.id == 500)
        .expect("peer-endorsed item should be recommended");
    assert!(
        endorsed
            .reasoning
            .lines()
            .iter()
            .any(|line| line.contains("taste similar to yours")),
        "peer support missing from reasoning: {:?}",
        endorsed.reasoning.lines()
    );
    // Endorsements of items the user already rated never come back
    assert!(recs.iter().all(|r| r.item.id != 1001));
}

#[tokio::test]
async fn test_failed_strategy_degrades_to_zero_candidates() {
    // Item 600 is reachable through the unconstrained quality query only
    let mut items = vec![item(600, vec![COMEDY], 2016, 8.6)];
    for i in 0..10 {
        items.push(item(1001 + i, vec![ACTION], 2020, 7.0));
    }
    let history: Vec<RatingEvent> = (0..8)
        .map(|i| rating(2000 + i, 8, vec![ACTION], 2020, i as i64))
        .collect();
    let pool = || Arc::new(SyntheticPeerPool::from_vectors(vec![]));

    // Healthy catalog: the quality strategy surfaces item 600
    let healthy = engine_with_parts(
        history.clone(),
        Arc::new(MemoryCatalog::with_items(items.clone())),
        pool(),
    );
    let recs = healthy.recommendations().await;
    assert!(recs.iter().any(|r| r.item.id == 600));

    // Same catalog behind an outage of unconstrained queries: the
    // quality strategy contributes nothing, the rest still deliver
    let degraded = engine_with_parts(
        history,
        Arc::new(PartialOutageCatalog {
            inner: MemoryCatalog::with_items(items),
        }),
        pool(),
    );
    let recs = degraded.recommendations().await;
    assert!(!recs.is_empty(), "other strategies must still deliver");
    assert!(recs.iter().all(|r| r.item.id != 600));
}

#[tokio::test]
async fn test_mid_flight_rating_invalidates_stale_aggregation() {
    let history: Vec<RatingEvent> = (0..5)
        .map(|i| rating(1001 + i, 9, vec![ACTION], 2020, i as i64))
        .collect();
    let slow = |delay| {
        Arc::new(SlowCatalog {
            inner: catalog(),
            delay,
        })
    };
    let pool = || Arc::new(SyntheticPeerPool::from_vectors(vec![]));

    // Uncontended, the strong recent Action item is recommended
    let control = engine_with_parts(history.clone(), slow(Duration::from_millis(20)), pool());
    let recs = control.recommendations().await;
    assert!(recs.iter().any(|r| r.item.id == 1000));

    // Rate item 1000 while an aggregation is parked inside the catalog:
    // the in-flight pass goes stale and the recomputed result must
    // reflect the fresh history, which now excludes 1000
    let engine = Arc::new(engine_with_parts(
        history,
        slow(Duration::from_millis(150)),
        pool(),
    ));
    let in_flight = tokio::spawn({
        let engine = engine.clone();
        async move { engine.recommendations().await }
    });
    tokio::time::sleep(Duration::from_millis(30)).await;

    let generation_before = engine.generation();
    assert!(engine.rate(rating(1000, 9, vec![ACTION], 2023, 0)).unwrap());
    assert_eq!(engine.generation(), generation_before + 1);

    let recs = in_flight.await.unwrap();
    assert!(
        recs.iter().all(|r| r.item.id != 1000),
        "stale aggregation leaked a now-rated item"
    );
}

#[tokio::test]
async fn test_explain_returns_reason_lines() {
    let history: Vec<RatingEvent> = (0..5)
        .map(|i| rating(2000 + i, 9, vec![ACTION], 2020, i as i64))
        .collect();
    let engine = engine_with(history);

    let reasons = engine.explain(1000).await.unwrap();
    assert!(!reasons.is_empty());
    assert!(engine.explain(999_999).await.unwrap().is_empty());
}
