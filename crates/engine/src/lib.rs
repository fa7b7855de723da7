//! # Engine Crate
//!
//! The orchestration layer of the personalization engine: the
//! [`RecommendationEngine`] facade that presentation layers talk to.
//!
//! Under the facade, the [`Aggregator`](aggregator::Aggregator) runs four
//! discovery strategies concurrently against the catalog and the peer
//! pool, scores everything through the content scorer, then dedups,
//! gates, categorizes and ranks. Refresh bursts coalesce through the
//! [`Debouncer`](debounce::Debouncer), and a generation counter makes
//! sure an aggregation that raced a new rating is discarded and
//! recomputed instead of surfacing stale results.

pub mod aggregator;
pub mod debounce;
pub mod engine;
pub mod insights;

// Re-export commonly used types
pub use aggregator::Aggregator;
pub use debounce::Debouncer;
pub use engine::RecommendationEngine;
pub use insights::{ConfidenceLevel, RecommendationInsights};
