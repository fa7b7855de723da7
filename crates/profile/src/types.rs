//! The structured taste profile and its component metrics.
//!
//! A [`UserTasteProfile`] is a disposable snapshot: the builder produces a
//! fresh one every time the rating history changes, and nothing downstream
//! ever mutates it in place.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use store::{CompanyId, GenreId, PersonId, Timestamp};

/// Whether a genre's recent ratings run above or below its long-run mean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

/// Per-genre running preference.
///
/// `score` lives on a 1-10 scale with 5 as neutral; each new rating nudges
/// it toward the extremes, damped by the remaining headroom so it never
/// clamps abruptly at the bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenreAffinity {
    /// 1-10, 5 = neutral
    pub score: f32,
    /// 0-1, derived from sample count
    pub confidence: f32,
    pub sample_size: usize,
    pub trend: Trend,
    pub last_touched: Timestamp,
}

/// How the user rates relative to the absolute scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatingPattern {
    Generous,
    Critical,
    Balanced,
}

/// Statistical summary of the rating history on the 0-100 scale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityProfile {
    pub average_rating: f32,
    pub variance: f32,
    /// One standard deviation around the mean, clamped to [0, 100]
    pub preferred_range: (f32, f32),
    pub pattern: RatingPattern,
}

impl Default for QualityProfile {
    /// Neutral quality profile for an empty history
    fn default() -> Self {
        Self {
            average_rating: 50.0,
            variance: 0.0,
            preferred_range: (40.0, 80.0),
            pattern: RatingPattern::Balanced,
        }
    }
}

/// The role through which a person earned their affinity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreatorRole {
    Actor,
    Director,
    Writer,
}

/// Running weighted average of the detailed-rating component a creator
/// keeps receiving (acting for actors, direction for directors, screenplay
/// for writers)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorAffinity {
    pub id: PersonId,
    pub name: String,
    pub role: CreatorRole,
    /// 0-100
    pub average_rating: f32,
    pub total_ratings: u32,
}

/// Running weighted average of overall ratings for a production company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioAffinity {
    pub id: CompanyId,
    pub name: String,
    /// 0-100
    pub average_rating: f32,
    pub total_ratings: u32,
}

/// Aggregate stats for one release decade, keyed by decade start year
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecadeBucket {
    /// 0-100, the mean rating given to items from this decade
    pub score: f32,
    pub count: usize,
    pub average_rating: f32,
}

/// Movie vs. series preference split, both 0-100 and summing to 100
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindSplit {
    pub movie: f32,
    pub series: f32,
}

impl Default for KindSplit {
    fn default() -> Self {
        Self {
            movie: 50.0,
            series: 50.0,
        }
    }
}

/// How the user behaves, independent of what they like
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehavioralMetrics {
    /// Ratings per day over the trailing 30 days
    pub rating_frequency: f32,
    /// Share of ratings that are detailed, 0-100
    pub detailed_ratio: f32,
    /// Willingness to rate outside known genres, 0-100
    pub exploration_tendency: f32,
    /// 100 minus the standard deviation of given scores, floor 0
    pub consistency: f32,
    /// Share of ratings given to items at most 2 years old, 0-100
    pub recency_bias: f32,
}

impl Default for BehavioralMetrics {
    fn default() -> Self {
        Self {
            rating_frequency: 0.0,
            detailed_ratio: 0.0,
            exploration_tendency: 0.0,
            consistency: 50.0,
            recency_bias: 50.0,
        }
    }
}

/// Signals derived from who the user follows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialMetrics {
    pub following_count: usize,
    /// Spread of followed creators across the three roles, 0-100
    pub diversity_index: f32,
    /// Mean affinity of followed creators, 0-100
    pub influence_score: f32,
}

/// Meta-metrics describing how much and how trustworthy the underlying
/// data is. Callers branch on these instead of null-checking fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileMetrics {
    /// 0-100
    pub completeness: f32,
    /// 0-100
    pub reliability: f32,
    pub data_points: usize,
    pub last_updated: Timestamp,
}

/// The followed-creators state fed into the builder alongside the history
#[derive(Debug, Clone, Default)]
pub struct FollowingState {
    pub creators: Vec<PersonId>,
    pub studios: Vec<CompanyId>,
}

/// The aggregate taste profile: a pure function of the rating history and
/// following state, rebuilt whole on every meaningful change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserTasteProfile {
    pub genre_affinities: HashMap<GenreId, GenreAffinity>,
    pub quality: QualityProfile,
    /// Keyed by decade start year (1990 for "1990s")
    pub temporal: HashMap<u16, DecadeBucket>,
    pub kind_split: KindSplit,
    pub creators: HashMap<PersonId, CreatorAffinity>,
    pub studios: HashMap<CompanyId, StudioAffinity>,
    pub behavioral: BehavioralMetrics,
    pub social: SocialMetrics,
    pub metrics: ProfileMetrics,
}

impl UserTasteProfile {
    /// Completeness threshold below which the engine reports the
    /// "still learning" state. A handful of ratings in one genre is
    /// already enough to clear it; an empty history never does.
    pub const ENOUGH_DATA_THRESHOLD: f32 = 5.0;

    /// Whether the profile rests on enough data to drive recommendations
    pub fn has_enough_data(&self) -> bool {
        self.metrics.completeness >= Self::ENOUGH_DATA_THRESHOLD
    }

    /// Top genres by affinity score, strongest first, above-neutral only
    pub fn top_genres(&self, limit: usize) -> Vec<GenreId> {
        let mut ranked: Vec<(&GenreId, &GenreAffinity)> = self
            .genre_affinities
            .iter()
            .filter(|(_, a)| a.score > 5.0)
            .collect();
        ranked.sort_by(|a, b| {
            b.1.score
                .partial_cmp(&a.1.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(b.0))
        });
        ranked.into_iter().take(limit).map(|(id, _)| *id).collect()
    }

    /// Decades the user has shown affinity for, most-loved first
    pub fn top_decades(&self, limit: usize) -> Vec<u16> {
        let mut ranked: Vec<(&u16, &DecadeBucket)> = self
            .temporal
            .iter()
            .filter(|(_, b)| b.score > 50.0)
            .collect();
        ranked.sort_by(|a, b| {
            b.1.score
                .partial_cmp(&a.1.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(b.0))
        });
        ranked.into_iter().take(limit).map(|(d, _)| *d).collect()
    }
}
