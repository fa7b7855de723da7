//! Scored-recommendation types: the factor breakdown, explanation,
//! category and display metadata attached to each candidate.

use serde::{Deserialize, Serialize};

use store::CatalogItem;

/// The six scoring factors, in weight order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Factor {
    Genre,
    Quality,
    Temporal,
    Creator,
    Behavioral,
    Social,
}

/// All six factor values, each normalized to 0-100 before weighting
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FactorBreakdown {
    pub genre_match: f32,
    pub quality_match: f32,
    pub temporal_match: f32,
    pub creator_match: f32,
    pub behavioral_match: f32,
    pub social_match: f32,
}

impl FactorBreakdown {
    /// Factor weights, summing to 1.0. Genre dominates; social is a nudge.
    pub const WEIGHTS: [(Factor, f32); 6] = [
        (Factor::Genre, 0.35),
        (Factor::Quality, 0.25),
        (Factor::Temporal, 0.15),
        (Factor::Creator, 0.10),
        (Factor::Behavioral, 0.10),
        (Factor::Social, 0.05),
    ];

    pub fn value(&self, factor: Factor) -> f32 {
        match factor {
            Factor::Genre => self.genre_match,
            Factor::Quality => self.quality_match,
            Factor::Temporal => self.temporal_match,
            Factor::Creator => self.creator_match,
            Factor::Behavioral => self.behavioral_match,
            Factor::Social => self.social_match,
        }
    }

    pub fn values(&self) -> [f32; 6] {
        [
            self.genre_match,
            self.quality_match,
            self.temporal_match,
            self.creator_match,
            self.behavioral_match,
            self.social_match,
        ]
    }

    /// Factors sorted by value, strongest first
    pub fn ranked(&self) -> Vec<(Factor, f32)> {
        let mut pairs: Vec<(Factor, f32)> = Self::WEIGHTS
            .iter()
            .map(|&(factor, _)| (factor, self.value(factor)))
            .collect();
        pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        pairs
    }

    /// The weighted combination, in [0, 100]
    pub fn weighted_total(&self) -> f32 {
        Self::WEIGHTS
            .iter()
            .map(|&(factor, weight)| self.value(factor) * weight)
            .sum()
    }
}

/// Human-readable explanation: one primary sentence, up to two runner-ups
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reasoning {
    pub primary: String,
    pub secondary: Vec<String>,
}

impl Reasoning {
    /// Combined reasons from all contributing strategies are capped here
    pub const MAX_REASONS: usize = 3;

    /// All reasons in display order
    pub fn lines(&self) -> Vec<String> {
        std::iter::once(self.primary.clone())
            .chain(self.secondary.iter().cloned())
            .collect()
    }

    /// Fold in a reason from another discovery strategy, respecting the cap
    pub fn merge(&mut self, reason: String) {
        if self.primary == reason || self.secondary.contains(&reason) {
            return;
        }
        if 1 + self.secondary.len() < Self::MAX_REASONS {
            self.secondary.push(reason);
        }
    }
}

/// Quality band of the item's own catalog rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityTier {
    Excellent,
    Good,
    Decent,
}

/// How broadly known the item is likely to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopularityTier {
    Mainstream,
    Popular,
    Niche,
}

/// Display metadata derived from the item itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecMetadata {
    pub decade: Option<String>,
    pub quality_tier: QualityTier,
    /// 0-100, decays with item age
    pub novelty_score: f32,
    pub popularity_tier: PopularityTier,
}

impl RecMetadata {
    pub fn for_item(item: &CatalogItem, now_year: u16) -> Self {
        let quality_tier = if item.rating >= 8.0 {
            QualityTier::Excellent
        } else if item.rating >= 7.0 {
            QualityTier::Good
        } else {
            QualityTier::Decent
        };
        let popularity_tier = if item.rating >= 8.0 {
            PopularityTier::Mainstream
        } else if item.rating >= 6.5 {
            PopularityTier::Popular
        } else {
            PopularityTier::Niche
        };
        Self {
            decade: item.decade(),
            quality_tier,
            novelty_score: (100.0 - item.age_years(now_year) as f32 * 2.0).max(0.0),
            popularity_tier,
        }
    }
}

/// Why a recommendation made the final list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    PerfectMatch,
    QualityPick,
    CreatorPick,
    HiddenGem,
    Discovery,
    Trending,
}

impl Category {
    /// Base weight feeding the priority sort key
    pub fn base_weight(&self) -> f32 {
        match self {
            Category::PerfectMatch => 100.0,
            Category::QualityPick => 90.0,
            Category::CreatorPick => 85.0,
            Category::HiddenGem => 80.0,
            Category::Discovery => 70.0,
            Category::Trending => 60.0,
        }
    }
}

/// Collaborative support for a candidate that came through the peer-led
/// strategy. Not part of the six-factor blend; it adds an explanation
/// reason and nothing else.
#[derive(Debug, Clone, Copy)]
pub struct PeerSignal {
    /// Similarity-weighted mean peer rating, 1-5 scale
    pub support: f32,
    pub voters: u32,
}

/// A scored candidate before the aggregator layers on category and
/// priority
#[derive(Debug, Clone)]
pub struct ScoredItem {
    pub item: CatalogItem,
    /// 0-100
    pub match_score: u8,
    /// [0.1, 1.0], never zero
    pub confidence: f32,
    pub factors: FactorBreakdown,
    pub reasoning: Reasoning,
    pub metadata: RecMetadata,
}

/// The final shape handed to presentation layers
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub item: CatalogItem,
    pub match_score: u8,
    pub confidence: f32,
    pub factors: FactorBreakdown,
    pub reasoning: Reasoning,
    pub category: Category,
    pub priority: i32,
    pub metadata: RecMetadata,
}
