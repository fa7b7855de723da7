//! # Profile Crate
//!
//! Turns the rating history into a structured [`UserTasteProfile`]:
//! genre affinities, quality tolerance, decade preferences, creator and
//! studio affinities, behavioral and social metrics, and the
//! completeness/reliability meta-metrics callers branch on.
//!
//! The builder is a pure function: same history, same following state,
//! same `now` — same profile. Profiles are disposable snapshots that get
//! rebuilt, never patched in place.
//!
//! ## Example Usage
//!
//! ```ignore
//! use profile::{build, FollowingState};
//!
//! let history = rating_store.list();
//! let profile = build(&history, &FollowingState::default(), now);
//!
//! if profile.has_enough_data() {
//!     let favorites = profile.top_genres(3);
//! }
//! ```

pub mod builder;
pub mod types;

// Re-export commonly used types
pub use builder::build;
pub use types::{
    BehavioralMetrics, CreatorAffinity, CreatorRole, DecadeBucket, FollowingState, GenreAffinity,
    KindSplit, ProfileMetrics, QualityProfile, RatingPattern, SocialMetrics, StudioAffinity,
    Trend, UserTasteProfile,
};
