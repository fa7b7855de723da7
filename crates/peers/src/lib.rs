//! # Peers Crate
//!
//! Collaborative signals for the personalization engine:
//!
//! - [`PeerPool`]: the injectable source of peer rating vectors. The
//!   shipping implementation is [`SyntheticPeerPool`], an explicitly
//!   simulated stand-in that is deterministic under a fixed seed; a real
//!   peer-data ingestion path can replace it behind the same trait.
//! - [`rank_peers`]: Pearson-correlation ranking of the pool against the
//!   active user's rating vector, with the overlap and similarity floors
//!   that keep one-item coincidences out of the results.

pub mod pool;
pub mod similarity;

// Re-export commonly used types
pub use pool::{PeerId, PeerPool, PeerVector, SyntheticPeerPool};
pub use similarity::{pearson, rank_peers, PeerMatch, MIN_USER_RATINGS};
