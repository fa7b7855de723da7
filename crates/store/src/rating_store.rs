//! The Rating Store: ordered, deduplicated-by-item rating history.
//!
//! This is the source of truth for everything downstream. The store
//! enforces two things at its boundary:
//! - score ranges (malformed ratings never reach the profile builder)
//! - at most one current rating per item, last-write-wins by timestamp

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use tracing::debug;

use crate::error::{Result, StoreError};
use crate::types::{ItemId, RatingEvent, RatingScore};

/// Source-of-truth interface for a user's rating history.
///
/// `Send + Sync` so the engine can share one store across concurrent
/// aggregation passes.
pub trait RatingStore: Send + Sync {
    /// All current ratings, ordered by timestamp ascending
    fn list(&self) -> Vec<RatingEvent>;

    /// Insert or replace the rating for an item.
    ///
    /// Returns `Ok(true)` if the event was applied, `Ok(false)` if it was
    /// dropped because a newer rating for the same item already exists.
    fn upsert(&self, event: RatingEvent) -> Result<bool>;

    /// Ids of every rated item, the exclusion set for discovery
    fn rated_ids(&self) -> HashSet<ItemId>;

    /// Number of distinct rated items
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, item_id: ItemId) -> bool;
}

/// In-memory implementation backed by a `HashMap<ItemId, RatingEvent>`.
///
/// One entry per item guarantees the replace-not-append invariant by
/// construction.
#[derive(Debug, Default)]
pub struct MemoryRatingStore {
    ratings: RwLock<HashMap<ItemId, RatingEvent>>,
}

impl MemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a batch of events, e.g. an imported history.
    /// Events that fail validation are returned as errors immediately.
    pub fn from_events(events: Vec<RatingEvent>) -> Result<Self> {
        let store = Self::new();
        for event in events {
            store.upsert(event)?;
        }
        Ok(store)
    }

    fn validate(event: &RatingEvent) -> Result<()> {
        match event.score {
            RatingScore::Simple(s) if !(1..=10).contains(&s) => {
                Err(StoreError::SimpleScoreOutOfRange {
                    item_id: event.item_id,
                    score: s,
                })
            }
            RatingScore::Detailed {
                overall,
                acting,
                screenplay,
                direction,
            } => {
                for (component, score) in [
                    ("overall", overall),
                    ("acting", acting),
                    ("screenplay", screenplay),
                    ("direction", direction),
                ] {
                    if score > 100 {
                        return Err(StoreError::DetailedScoreOutOfRange {
                            item_id: event.item_id,
                            component,
                            score,
                        });
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl RatingStore for MemoryRatingStore {
    fn list(&self) -> Vec<RatingEvent> {
        let guard = self.ratings.read().expect("rating store lock poisoned");
        let mut events: Vec<RatingEvent> = guard.values().cloned().collect();
        events.sort_by_key(|e| (e.timestamp, e.item_id));
        events
    }

    fn upsert(&self, event: RatingEvent) -> Result<bool> {
        Self::validate(&event)?;

        let mut guard = self.ratings.write().expect("rating store lock poisoned");
        match guard.get(&event.item_id) {
            // Last-write-wins: keep whichever rating is newer
            Some(existing) if existing.timestamp > event.timestamp => {
                debug!(
                    item_id = event.item_id,
                    "dropping stale rating (existing is newer)"
                );
                Ok(false)
            }
            _ => {
                guard.insert(event.item_id, event);
                Ok(true)
            }
        }
    }

    fn rated_ids(&self) -> HashSet<ItemId> {
        let guard = self.ratings.read().expect("rating store lock poisoned");
        guard.keys().copied().collect()
    }

    fn len(&self) -> usize {
        let guard = self.ratings.read().expect("rating store lock poisoned");
        guard.len()
    }

    fn contains(&self, item_id: ItemId) -> bool {
        let guard = self.ratings.read().expect("rating store lock poisoned");
        guard.contains_key(&item_id)
    }
}
