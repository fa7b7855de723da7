//! Peer rating vectors and the injectable pool behind them.
//!
//! Real aggregate peer data does not exist yet, so the shipping pool is
//! synthetic: a fixed-size set of generated rating vectors. The
//! [`PeerPool`] trait isolates that stand-in so a real ingestion path can
//! replace it without touching the similarity engine or the aggregator.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use store::ItemId;

/// Identifier for a peer in the pool
pub type PeerId = u32;

/// One peer's ratings on the 1-5 scale, immutable once generated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerVector {
    pub peer_id: PeerId,
    pub ratings: HashMap<ItemId, f32>,
}

impl PeerVector {
    pub fn rating(&self, item_id: ItemId) -> Option<f32> {
        self.ratings.get(&item_id).copied()
    }
}

/// Read-only source of peer rating vectors.
///
/// The pool is fixed for the lifetime of a scoring pass; nothing writes
/// to it from the scoring side.
pub trait PeerPool: Send + Sync {
    fn peers(&self) -> &[PeerVector];
}

/// Simulation stand-in for real peer data.
///
/// Deterministic under a fixed seed: each peer rates 15-30 of the given
/// items, with 70% of ratings in the 3-5 band to mimic the skew of real
/// rating distributions.
#[derive(Debug)]
pub struct SyntheticPeerPool {
    peers: Vec<PeerVector>,
}

impl SyntheticPeerPool {
    pub const DEFAULT_PEER_COUNT: usize = 50;

    pub fn generate(seed: u64, peer_count: usize, item_ids: &[ItemId]) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut peers = Vec::with_capacity(peer_count);

        for peer_id in 1..=peer_count as PeerId {
            let rating_count = rng.gen_range(15..=30).min(item_ids.len());
            let mut shuffled: Vec<ItemId> = item_ids.to_vec();
            shuffled.shuffle(&mut rng);

            let mut ratings = HashMap::with_capacity(rating_count);
            for &item_id in shuffled.iter().take(rating_count) {
                let rating = if rng.gen_bool(0.7) {
                    rng.gen_range(3..=5) as f32
                } else {
                    rng.gen_range(1..=2) as f32
                };
                ratings.insert(item_id, rating);
            }
            peers.push(PeerVector { peer_id, ratings });
        }

        Self { peers }
    }

    /// Hand-built pool, mainly for tests
    pub fn from_vectors(peers: Vec<PeerVector>) -> Self {
        Self { peers }
    }
}

impl PeerPool for SyntheticPeerPool {
    fn peers(&self) -> &[PeerVector] {
        &self.peers
    }
}
