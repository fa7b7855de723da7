//! Recommendation aggregator: runs the discovery strategies concurrently,
//! scores everything, then dedups, gates, categorizes and ranks.
//!
//! A failed strategy contributes zero candidates; the aggregation itself
//! never fails. An empty result is the expected "not enough data yet"
//! terminal state, not an error.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use peers::{rank_peers, PeerMatch, PeerPool};
use profile::UserTasteProfile;
use scoring::{Category, ContentScorer, PeerSignal, Recommendation, Reasoning, ScoredItem};
use store::{Catalog, CatalogItem, DiscoverFilter, ItemId};

/// Per-strategy candidate cap, bounding total work per aggregation
const STRATEGY_CAP: usize = 15;

/// Candidates below this match score never reach categorization
const MIN_MATCH_SCORE: u8 = 60;

/// Final result cap
const MAX_RESULTS: usize = 30;

/// How many top genres the genre-led strategy queries for
const GENRE_FANOUT: usize = 3;

/// Absolute catalog rating the quality-led strategy starts at
const QUALITY_FLOOR: f32 = 7.5;

/// A peer rating at or above this counts as an endorsement (1-5 scale)
const PEER_ENDORSE_FLOOR: f32 = 3.5;

/// Pulls candidates from the catalog and the peer pool and turns them
/// into the final ranked recommendation list.
pub struct Aggregator {
    catalog: Arc<dyn Catalog>,
    pool: Arc<dyn PeerPool>,
}

impl Aggregator {
    pub fn new(catalog: Arc<dyn Catalog>, pool: Arc<dyn PeerPool>) -> Self {
        Self { catalog, pool }
    }

    /// Run all discovery strategies, score, dedup, gate, categorize, rank.
    ///
    /// `user_ratings` is the 1-5-scale rating vector fed to peer
    /// similarity; `exclude` is the already-rated id set.
    #[instrument(skip_all, fields(excluded = exclude.len()))]
    pub async fn aggregate(
        &self,
        profile: &UserTasteProfile,
        user_ratings: &HashMap<ItemId, f32>,
        exclude: &HashSet<ItemId>,
        now_year: u16,
    ) -> Vec<Recommendation> {
        let peer_matches = rank_peers(user_ratings, self.pool.as_ref());

        let (genre_led, quality_led, decade_led, peer_led) = tokio::join!(
            self.genre_led(profile, exclude),
            self.quality_led(exclude),
            self.decade_led(profile, exclude),
            self.peer_led(&peer_matches, user_ratings, exclude),
        );

        let scorer = ContentScorer::new(profile, now_year);
        let mut best: HashMap<ItemId, ScoredItem> = HashMap::new();

        let plain = genre_led
            .into_iter()
            .chain(quality_led)
            .chain(decade_led)
            .map(|item| (item, None));
        let endorsed = peer_led
            .into_iter()
            .map(|(item, signal)| (item, Some(signal)));

        for (item, signal) in plain.chain(endorsed) {
            if exclude.contains(&item.id) {
                continue;
            }
            let scored = scorer.score(&item, signal);
            merge_candidate(&mut best, scored);
        }

        let mut results: Vec<Recommendation> = best
            .into_values()
            .filter(|s| s.match_score >= MIN_MATCH_SCORE)
            .map(finalize)
            .collect();

        // Priority descending, id as the tiebreaker for determinism
        results.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.item.id.cmp(&b.item.id)));
        results.truncate(MAX_RESULTS);

        debug!(results = results.len(), "aggregation complete");
        results
    }

    // =========================================================================
    // Discovery strategies
    // =========================================================================

    /// Items matching the user's top profiled genres
    async fn genre_led(
        &self,
        profile: &UserTasteProfile,
        exclude: &HashSet<ItemId>,
    ) -> Vec<CatalogItem> {
        let genres = profile.top_genres(GENRE_FANOUT);
        if genres.is_empty() {
            return Vec::new();
        }
        let filter = DiscoverFilter {
            genres,
            min_rating: Some(6.0),
            exclude: exclude.clone(),
            limit: STRATEGY_CAP,
            ..Default::default()
        };
        self.discover("genre_led", &filter).await
    }

    /// High-quality items irrespective of genre
    async fn quality_led(&self, exclude: &HashSet<ItemId>) -> Vec<CatalogItem> {
        let filter = DiscoverFilter {
            min_rating: Some(QUALITY_FLOOR),
            exclude: exclude.clone(),
            limit: STRATEGY_CAP,
            ..Default::default()
        };
        self.discover("quality_led", &filter).await
    }

    /// Items from the decades the user keeps coming back to
    async fn decade_led(
        &self,
        profile: &UserTasteProfile,
        exclude: &HashSet<ItemId>,
    ) -> Vec<CatalogItem> {
        let decades = profile.top_decades(2);
        if decades.is_empty() {
            return Vec::new();
        }

        let mut candidates = Vec::new();
        let per_decade = STRATEGY_CAP / decades.len();
        for decade in decades {
            let filter = DiscoverFilter {
                year_range: Some((decade, decade + 9)),
                min_rating: Some(6.5),
                exclude: exclude.clone(),
                limit: per_decade,
                ..Default::default()
            };
            candidates.extend(self.discover("decade_led", &filter).await);
        }
        candidates
    }

    /// Items endorsed by similar peers, weighted by similarity.
    ///
    /// Runs only when similarity found peers; each candidate carries a
    /// [`PeerSignal`] so the explanation can cite the support.
    async fn peer_led(
        &self,
        matches: &[PeerMatch],
        user_ratings: &HashMap<ItemId, f32>,
        exclude: &HashSet<ItemId>,
    ) -> Vec<(CatalogItem, PeerSignal)> {
        if matches.is_empty() {
            return Vec::new();
        }

        struct Tally {
            weighted_sum: f32,
            weight: f32,
            voters: u32,
        }
        let mut tallies: HashMap<ItemId, Tally> = HashMap::new();

        for peer_match in matches {
            let Some(peer) = self
                .pool
                .peers()
                .iter()
                .find(|p| p.peer_id == peer_match.peer_id)
            else {
                continue;
            };
            for (&item_id, &rating) in &peer.ratings {
                if rating < PEER_ENDORSE_FLOOR
                    || user_ratings.contains_key(&item_id)
                    || exclude.contains(&item_id)
                {
                    continue;
                }
                let tally = tallies.entry(item_id).or_insert(Tally {
                    weighted_sum: 0.0,
                    weight: 0.0,
                    voters: 0,
                });
                tally.weighted_sum += rating * peer_match.similarity;
                tally.weight += peer_match.similarity;
                tally.voters += 1;
            }
        }

        let mut ranked: Vec<(ItemId, PeerSignal)> = tallies
            .into_iter()
            .filter(|(_, t)| t.weight > 0.0)
            .map(|(id, t)| {
                (
                    id,
                    PeerSignal {
                        support: t.weighted_sum / t.weight,
                        voters: t.voters,
                    },
                )
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.1.support
                .partial_cmp(&a.1.support)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        ranked.truncate(STRATEGY_CAP);

        let mut candidates = Vec::with_capacity(ranked.len());
        for (item_id, signal) in ranked {
            match self.catalog.details(item_id).await {
                Ok(Some(item)) => candidates.push((item, signal)),
                Ok(None) => {}
                Err(error) => {
                    warn!(item_id, %error, "peer_led detail lookup failed, skipping");
                }
            }
        }
        candidates
    }

    /// One discover call with the degrade-to-empty failure contract
    async fn discover(&self, strategy: &'static str, filter: &DiscoverFilter) -> Vec<CatalogItem> {
        match self.catalog.discover(filter).await {
            Ok(items) => items,
            Err(error) => {
                warn!(strategy, %error, "discovery failed, contributing zero candidates");
                Vec::new()
            }
        }
    }
}

/// Keep the highest-scoring instance of a duplicate, merging reasons from
/// the losing instance up to the reason cap
fn merge_candidate(best: &mut HashMap<ItemId, ScoredItem>, scored: ScoredItem) {
    match best.entry(scored.item.id) {
        std::collections::hash_map::Entry::Vacant(slot) => {
            slot.insert(scored);
        }
        std::collections::hash_map::Entry::Occupied(mut slot) => {
            let (mut winner, loser) = if scored.match_score > slot.get().match_score {
                (scored, slot.get().reasoning.clone())
            } else {
                (slot.get().clone(), scored.reasoning)
            };
            for reason in loser.lines() {
                winner.reasoning.merge(reason);
            }
            slot.insert(winner);
        }
    }
}

/// First matching category wins
fn categorize(scored: &ScoredItem) -> Category {
    if scored.match_score >= 85 {
        Category::PerfectMatch
    } else if scored.item.rating >= 8.0 {
        Category::QualityPick
    } else if scored.factors.creator_match >= 80.0 {
        Category::CreatorPick
    } else if scored.item.rating >= 7.5 {
        Category::HiddenGem
    } else if scored.match_score >= 70 {
        Category::Discovery
    } else {
        Category::Trending
    }
}

fn finalize(scored: ScoredItem) -> Recommendation {
    let category = categorize(&scored);
    let priority = (category.base_weight()
        + scored.confidence * 20.0
        + (scored.match_score as f32 - 50.0) / 5.0)
        .round() as i32;

    Recommendation {
        item: scored.item,
        match_score: scored.match_score,
        confidence: scored.confidence,
        factors: scored.factors,
        reasoning: scored.reasoning,
        category,
        priority,
        metadata: scored.metadata,
    }
}
