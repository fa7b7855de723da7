//! The engine facade: the one object presentation layers talk to.
//!
//! Owns the profile snapshot and its lifecycle. Every accepted rating
//! bumps a generation counter and rebuilds the snapshot whole; an
//! aggregation that raced with a rating observes the stale generation
//! after its awaits and recomputes from the fresh snapshot, so a stale
//! result never reaches the caller.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use tracing::{debug, info, instrument};

use peers::PeerPool;
use profile::{build, FollowingState, UserTasteProfile};
use scoring::{Category, ContentScorer, Recommendation};
use store::{Catalog, ContentKind, ItemId, RatingEvent, RatingStore, Timestamp};

use crate::aggregator::Aggregator;
use crate::debounce::Debouncer;
use crate::insights::RecommendationInsights;

const YEAR_SECS: i64 = 31_557_600;

/// Quiet period for coalescing refresh bursts
const DEBOUNCE_QUIET: Duration = Duration::from_millis(300);

type Clock = Arc<dyn Fn() -> Timestamp + Send + Sync>;

fn system_clock() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn year_of(ts: Timestamp) -> u16 {
    (1970 + ts / YEAR_SECS) as u16
}

/// The personalization engine.
///
/// Stateless per invocation: scoring and aggregation read an immutable
/// profile snapshot, and the snapshot is replaced, never mutated.
pub struct RecommendationEngine {
    store: Arc<dyn RatingStore>,
    catalog: Arc<dyn Catalog>,
    aggregator: Aggregator,
    debouncer: Debouncer,

    following: RwLock<FollowingState>,
    snapshot: RwLock<Arc<UserTasteProfile>>,
    /// Bumped by every accepted rating; stale aggregations recompute
    generation: AtomicU64,
    clock: Clock,
}

impl RecommendationEngine {
    pub fn new(
        store: Arc<dyn RatingStore>,
        catalog: Arc<dyn Catalog>,
        pool: Arc<dyn PeerPool>,
    ) -> Self {
        Self::with_clock(store, catalog, pool, Arc::new(system_clock))
    }

    /// Same engine with an injected clock, for deterministic tests
    pub fn with_clock(
        store: Arc<dyn RatingStore>,
        catalog: Arc<dyn Catalog>,
        pool: Arc<dyn PeerPool>,
        clock: Clock,
    ) -> Self {
        let engine = Self {
            aggregator: Aggregator::new(catalog.clone(), pool),
            debouncer: Debouncer::new(DEBOUNCE_QUIET),
            store,
            catalog,
            following: RwLock::new(FollowingState::default()),
            snapshot: RwLock::new(Arc::new(UserTasteProfile::default())),
            generation: AtomicU64::new(0),
            clock,
        };
        engine.rebuild();
        engine
    }

    // =========================================================================
    // Ratings & profile lifecycle
    // =========================================================================

    /// Submit a rating. Accepted ratings replace any existing rating for
    /// the item and trigger a full profile rebuild; stale events (older
    /// than the stored rating) return `Ok(false)` and change nothing.
    #[instrument(skip_all, fields(item_id = event.item_id))]
    pub fn rate(&self, event: RatingEvent) -> Result<bool> {
        let applied = self.store.upsert(event)?;
        if applied {
            self.rebuild();
        }
        Ok(applied)
    }

    /// Replace the followed creators/studios and rebuild
    pub fn set_following(&self, following: FollowingState) {
        *self.following.write().expect("following lock poisoned") = following;
        self.rebuild();
    }

    /// Force a synchronous profile rebuild from the current history
    pub fn rebuild(&self) {
        let history = self.store.list();
        let following = self
            .following
            .read()
            .expect("following lock poisoned")
            .clone();
        let now = (self.clock)();
        let rebuilt = Arc::new(build(&history, &following, now));

        *self.snapshot.write().expect("profile lock poisoned") = rebuilt;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!(ratings = history.len(), generation, "profile rebuilt");
    }

    /// The current profile snapshot; cheap, clones an `Arc`
    pub fn profile(&self) -> Arc<UserTasteProfile> {
        self.snapshot.read().expect("profile lock poisoned").clone()
    }

    // =========================================================================
    // Recommendations
    // =========================================================================

    /// The full ranked recommendation list.
    ///
    /// Empty below the data threshold — the "still learning" state, not
    /// an error. Recomputes if a rating landed mid-aggregation.
    pub async fn recommendations(&self) -> Vec<Recommendation> {
        loop {
            let generation = self.generation.load(Ordering::SeqCst);
            let profile = self.profile();
            if !profile.has_enough_data() {
                debug!("below data threshold, returning empty list");
                return Vec::new();
            }

            let user_ratings = self.peer_vector();
            let exclude = self.store.rated_ids();
            let now_year = year_of((self.clock)());
            let results = self
                .aggregator
                .aggregate(&profile, &user_ratings, &exclude, now_year)
                .await;

            if self.generation.load(Ordering::SeqCst) == generation {
                return results;
            }
            debug!("aggregation raced a rating, recomputing from fresh snapshot");
        }
    }

    /// Recommendations filtered to one content kind
    pub async fn recommendations_of_kind(&self, kind: ContentKind) -> Vec<Recommendation> {
        self.recommendations()
            .await
            .into_iter()
            .filter(|r| r.item.kind == kind)
            .collect()
    }

    /// Recommendations filtered to one category
    pub async fn recommendations_by_category(&self, category: Category) -> Vec<Recommendation> {
        self.recommendations()
            .await
            .into_iter()
            .filter(|r| r.category == category)
            .collect()
    }

    /// Debounced refresh: coalesces bursts, only the latest request
    /// computes. `None` means this request was superseded.
    pub async fn refresh_debounced(&self) -> Option<Vec<Recommendation>> {
        if !self.debouncer.acquire().await {
            return None;
        }
        Some(self.recommendations().await)
    }

    /// Summary statistics for the current recommendation list
    pub async fn insights(&self) -> RecommendationInsights {
        let recs = self.recommendations().await;
        RecommendationInsights::from_recommendations(&recs)
    }

    /// Explain why one item would (or would not) be recommended, as
    /// ordered reason lines. Empty for unknown items.
    pub async fn explain(&self, item_id: ItemId) -> Result<Vec<String>> {
        let Some(item) = self.catalog.details(item_id).await? else {
            return Ok(Vec::new());
        };
        let profile = self.profile();
        let scorer = ContentScorer::new(&profile, year_of((self.clock)()));
        Ok(scorer.score(&item, None).reasoning.lines())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// The user's rating vector on the peer pool's 1-5 scale
    fn peer_vector(&self) -> HashMap<ItemId, f32> {
        self.store
            .list()
            .iter()
            .map(|e| (e.item_id, e.score.simple_equivalent() / 2.0))
            .collect()
    }

    /// Current profile generation, observable by tests and diagnostics
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
