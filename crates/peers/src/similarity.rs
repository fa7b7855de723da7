//! Pearson-correlation peer similarity.
//!
//! Compares the active user's rating vector against every peer in the
//! pool and keeps the closest matches. The scan is embarrassingly
//! parallel, so it runs over Rayon like every other hot loop in this
//! workspace.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, instrument};

use store::ItemId;

use crate::pool::{PeerId, PeerPool};

/// Minimum ratings the active user needs before similarity runs at all
pub const MIN_USER_RATINGS: usize = 3;

/// Minimum commonly-rated items for a peer to be comparable
pub const MIN_OVERLAP: usize = 2;

/// Similarity below this is noise, not signal
pub const MIN_SIMILARITY: f32 = 0.1;

/// How many peers the result set is capped at
pub const MAX_PEERS: usize = 10;

/// One peer's closeness to the active user
#[derive(Debug, Clone, PartialEq)]
pub struct PeerMatch {
    pub peer_id: PeerId,
    pub similarity: f32,
    pub overlap: usize,
}

/// Rank the pool against the user's rating vector.
///
/// Returns matches with `overlap >= 2` and `similarity > 0.1`, strongest
/// first, capped at 10. A user with fewer than 3 ratings gets an empty
/// list — that is the "not enough data" state, not an error.
#[instrument(skip_all, fields(user_ratings = user_ratings.len()))]
pub fn rank_peers(user_ratings: &HashMap<ItemId, f32>, pool: &dyn PeerPool) -> Vec<PeerMatch> {
    if user_ratings.len() < MIN_USER_RATINGS {
        debug!("too few ratings for peer similarity");
        return Vec::new();
    }

    let mut matches: Vec<PeerMatch> = pool
        .peers()
        .par_iter()
        .filter_map(|peer| {
            let overlap = user_ratings
                .keys()
                .filter(|id| peer.ratings.contains_key(id))
                .count();
            if overlap < MIN_OVERLAP {
                return None;
            }
            let similarity = pearson(user_ratings, &peer.ratings);
            (similarity > MIN_SIMILARITY).then_some(PeerMatch {
                peer_id: peer.peer_id,
                similarity,
                overlap,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.peer_id.cmp(&b.peer_id))
    });
    matches.truncate(MAX_PEERS);

    debug!(matches = matches.len(), "ranked peer pool");
    matches
}

/// Pearson correlation over the intersection of the two vectors.
///
/// A zero-variance denominator means one side rated every common item
/// identically; that is defined as similarity 0, never NaN.
pub fn pearson(a: &HashMap<ItemId, f32>, b: &HashMap<ItemId, f32>) -> f32 {
    let common: Vec<ItemId> = a.keys().filter(|id| b.contains_key(id)).copied().collect();
    if common.len() < MIN_OVERLAP {
        return 0.0;
    }

    let n = common.len() as f32;
    let (mut sum_a, mut sum_b, mut sum_a_sq, mut sum_b_sq, mut sum_ab) =
        (0.0f32, 0.0f32, 0.0f32, 0.0f32, 0.0f32);
    for id in &common {
        let (x, y) = (a[id], b[id]);
        sum_a += x;
        sum_b += y;
        sum_a_sq += x * x;
        sum_b_sq += y * y;
        sum_ab += x * y;
    }

    let numerator = sum_ab - (sum_a * sum_b / n);
    let denominator =
        ((sum_a_sq - sum_a * sum_a / n) * (sum_b_sq - sum_b * sum_b / n)).sqrt();

    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{PeerVector, SyntheticPeerPool};

    fn vector(pairs: &[(ItemId, f32)]) -> HashMap<ItemId, f32> {
        pairs.iter().copied().collect()
    }

    fn pool_of(vectors: Vec<(PeerId, Vec<(ItemId, f32)>)>) -> SyntheticPeerPool {
        SyntheticPeerPool::from_vectors(
            vectors
                .into_iter()
                .map(|(peer_id, pairs)| PeerVector {
                    peer_id,
                    ratings: vector(&pairs),
                })
                .collect(),
        )
    }

    #[test]
    fn test_identical_vectors_give_similarity_one() {
        let user = vector(&[(1, 5.0), (2, 3.0), (3, 4.0)]);
        let pool = pool_of(vec![(1, vec![(1, 5.0), (2, 3.0), (3, 4.0)])]);

        let matches = rank_peers(&user, &pool);
        assert_eq!(matches.len(), 1);
        assert!((matches[0].similarity - 1.0).abs() < 1e-6);
        assert_eq!(matches[0].overlap, 3);
    }

    #[test]
    fn test_zero_overlap_peer_is_excluded() {
        let user = vector(&[(1, 5.0), (2, 3.0), (3, 4.0)]);
        let pool = pool_of(vec![(1, vec![(10, 5.0), (11, 3.0)])]);
        assert!(rank_peers(&user, &pool).is_empty());
    }

    #[test]
    fn test_single_common_item_is_excluded_regardless_of_fit() {
        let user = vector(&[(1, 5.0), (2, 3.0), (3, 4.0)]);
        let pool = pool_of(vec![(1, vec![(1, 5.0), (20, 2.0)])]);
        assert!(rank_peers(&user, &pool).is_empty());
    }

    #[test]
    fn test_zero_variance_overlap_is_zero_not_nan() {
        let a = vector(&[(1, 3.0), (2, 3.0), (3, 3.0)]);
        let b = vector(&[(1, 5.0), (2, 1.0), (3, 4.0)]);
        assert_eq!(pearson(&a, &b), 0.0);
    }

    #[test]
    fn test_too_few_user_ratings_yields_empty() {
        let user = vector(&[(1, 5.0), (2, 3.0)]);
        let pool = pool_of(vec![(1, vec![(1, 5.0), (2, 3.0)])]);
        assert!(rank_peers(&user, &pool).is_empty());
    }

    #[test]
    fn test_results_sorted_and_capped() {
        let user = vector(&[(1, 5.0), (2, 1.0), (3, 4.0), (4, 2.0)]);
        // Peer 1 agrees perfectly, peer 2 agrees loosely, peer 3 disagrees
        let pool = pool_of(vec![
            (1, vec![(1, 5.0), (2, 1.0), (3, 4.0)]),
            (2, vec![(1, 4.0), (2, 2.0), (3, 4.0)]),
            (3, vec![(1, 1.0), (2, 5.0), (3, 1.0)]),
        ]);

        let matches = rank_peers(&user, &pool);
        assert_eq!(matches.len(), 2, "anti-correlated peer must not appear");
        assert_eq!(matches[0].peer_id, 1);
        assert!(matches[0].similarity >= matches[1].similarity);
    }

    #[test]
    fn test_negative_correlation_filtered() {
        let user = vector(&[(1, 5.0), (2, 1.0), (3, 5.0)]);
        let pool = pool_of(vec![(1, vec![(1, 1.0), (2, 5.0), (3, 1.0)])]);
        assert!(rank_peers(&user, &pool).is_empty());
    }
}
