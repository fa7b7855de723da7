//! Multi-factor content scorer.
//!
//! Every candidate gets six factor values on a 0-100 scale, a weighted
//! match score and a confidence estimate. Scoring reads a profile
//! snapshot and the item, nothing else, so batches parallelize freely.

use rayon::prelude::*;
use tracing::{debug, instrument};

use profile::{Trend, UserTasteProfile};
use store::CatalogItem;

use crate::explain::build_reasoning;
use crate::types::{FactorBreakdown, PeerSignal, RecMetadata, ScoredItem};

/// Items at least this recent get the recency-bias boost in the temporal
/// fallback
const FRESH_AGE_YEARS: u16 = 3;

/// Items past this age start losing temporal score in the fallback
const STALE_AGE_YEARS: u16 = 10;

/// Scores catalog items against one profile snapshot.
///
/// Borrows the profile for its whole lifetime; callers hand a scorer a
/// batch and drop it, they never keep one across profile rebuilds.
pub struct ContentScorer<'a> {
    profile: &'a UserTasteProfile,
    now_year: u16,
}

impl<'a> ContentScorer<'a> {
    pub fn new(profile: &'a UserTasteProfile, now_year: u16) -> Self {
        Self { profile, now_year }
    }

    /// Score one candidate, optionally carrying peer support from the
    /// collaborative strategy
    pub fn score(&self, item: &CatalogItem, peer: Option<PeerSignal>) -> ScoredItem {
        let factors = FactorBreakdown {
            genre_match: self.genre_match(item),
            quality_match: self.quality_match(item),
            temporal_match: self.temporal_match(item),
            creator_match: self.creator_match(item),
            behavioral_match: self.behavioral_match(item),
            social_match: self.social_match(),
        };

        let match_score = factors.weighted_total().round().clamp(0.0, 100.0) as u8;
        let confidence = self.confidence(&factors, item);
        let reasoning = build_reasoning(&factors, item, peer);

        debug!(
            item_id = item.id,
            match_score, confidence, "scored candidate"
        );

        ScoredItem {
            item: item.clone(),
            match_score,
            confidence,
            factors,
            reasoning,
            metadata: RecMetadata::for_item(item, self.now_year),
        }
    }

    /// Score a batch in parallel, preserving input order
    #[instrument(skip_all, fields(candidates = items.len()))]
    pub fn score_batch(&self, items: &[CatalogItem]) -> Vec<ScoredItem> {
        items.par_iter().map(|item| self.score(item, None)).collect()
    }

    // =========================================================================
    // Factors
    // =========================================================================

    /// Confidence-weighted mean of the item's genre affinities, with a
    /// trend bonus per increasing genre and a penalty per decreasing one
    fn genre_match(&self, item: &CatalogItem) -> f32 {
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        let mut trend_bonus = 0.0;

        for genre in &item.genres {
            if let Some(affinity) = self.profile.genre_affinities.get(genre) {
                weighted_sum += affinity.score * 10.0 * affinity.confidence;
                weight_total += affinity.confidence;
                trend_bonus += match affinity.trend {
                    Trend::Increasing => 5.0,
                    Trend::Decreasing => -3.0,
                    Trend::Stable => 0.0,
                };
            }
        }

        if weight_total == 0.0 {
            return 50.0;
        }
        (weighted_sum / weight_total + trend_bonus).clamp(0.0, 100.0)
    }

    /// 100 inside the preferred range, linear decay with distance outside
    fn quality_match(&self, item: &CatalogItem) -> f32 {
        let rating = item.rating * 10.0;
        let (low, high) = self.profile.quality.preferred_range;

        if rating >= low && rating <= high {
            return 100.0;
        }
        let distance = if rating < low {
            low - rating
        } else {
            rating - high
        };
        (100.0 - distance).max(0.0)
    }

    /// Stored decade bucket when the user has history there, otherwise a
    /// recency heuristic scaled by the user's own recency bias
    fn temporal_match(&self, item: &CatalogItem) -> f32 {
        let Some(year) = item.release_year else {
            return 50.0;
        };
        let decade = (year / 10) * 10;

        if let Some(bucket) = self.profile.temporal.get(&decade) {
            return (bucket.score + bucket.count as f32 * 2.0).min(100.0);
        }

        let age = item.age_years(self.now_year);
        if age <= FRESH_AGE_YEARS {
            60.0 + self.profile.behavioral.recency_bias / 100.0 * 30.0
        } else if age <= STALE_AGE_YEARS {
            60.0
        } else {
            (60.0 - (age - STALE_AGE_YEARS) as f32 * 2.0).max(30.0)
        }
    }

    /// Mean of the known creator and studio affinities in the item's
    /// credits. No known creators means a deterministic neutral 50.
    fn creator_match(&self, item: &CatalogItem) -> f32 {
        let mut sum = 0.0;
        let mut count = 0u32;

        let people = item
            .credits
            .billed_cast()
            .iter()
            .chain(&item.credits.directors)
            .chain(&item.credits.writers);
        for person in people {
            if let Some(affinity) = self.profile.creators.get(&person.id) {
                sum += affinity.average_rating;
                count += 1;
            }
        }
        for company in &item.companies {
            if let Some(affinity) = self.profile.studios.get(&company.id) {
                sum += affinity.average_rating;
                count += 1;
            }
        }

        if count == 0 {
            return 50.0;
        }
        sum / count as f32
    }

    /// Rewards genre novelty in proportion to the user's exploration
    /// tendency, then leans toward their movie/series split
    fn behavioral_match(&self, item: &CatalogItem) -> f32 {
        let mut score = 50.0;

        if !item.genres.is_empty() {
            let unknown = item
                .genres
                .iter()
                .filter(|g| !self.profile.genre_affinities.contains_key(g))
                .count();
            let novelty_share = unknown as f32 / item.genres.len() as f32;
            score += novelty_share * self.profile.behavioral.exploration_tendency / 100.0 * 20.0;
        }

        let kind_pref = match item.kind {
            store::ContentKind::Movie => self.profile.kind_split.movie,
            store::ContentKind::Series => self.profile.kind_split.series,
        };
        score += (kind_pref - 50.0) / 5.0;

        score.clamp(0.0, 100.0)
    }

    /// Small nudge from who the user follows; item-independent
    fn social_match(&self) -> f32 {
        let social = &self.profile.social;
        let score =
            50.0 + (social.influence_score - 50.0) / 10.0 + social.diversity_index / 10.0;
        score.clamp(0.0, 100.0)
    }

    // =========================================================================
    // Confidence
    // =========================================================================

    /// Blend of profile trust, factor agreement and the item's own quality
    /// signal. Never zero: the floor marks "low trust", not "no trust".
    fn confidence(&self, factors: &FactorBreakdown, item: &CatalogItem) -> f32 {
        let reliability = self.profile.metrics.reliability / 100.0;
        let completeness = self.profile.metrics.completeness / 100.0;

        let values = factors.values();
        let mean = values.iter().sum::<f32>() / values.len() as f32;
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / values.len() as f32;
        let consistency = (1.0 - variance.sqrt() / 50.0).max(0.0);

        let item_quality = (item.rating / 8.0).min(1.0);

        (reliability * 0.4 + completeness * 0.3 + consistency * 0.2 + item_quality * 0.1)
            .clamp(0.1, 1.0)
    }
}
