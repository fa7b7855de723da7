//! Multi-factor content scoring.
//!
//! The [`ContentScorer`] turns a profile snapshot plus a candidate item
//! into a scored recommendation: six weighted factors, a 0-100 match
//! score, a confidence estimate and a short human-readable explanation.
//! Scoring is pure and `rayon`-parallel in batches; the aggregator layer
//! above decides categories, priorities and caps.

pub mod explain;
pub mod scorer;
pub mod types;

pub use explain::build_reasoning;
pub use scorer::ContentScorer;
pub use types::{
    Category, Factor, FactorBreakdown, PeerSignal, PopularityTier, QualityTier, RecMetadata,
    Reasoning, Recommendation, ScoredItem,
};
