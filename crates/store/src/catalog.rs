//! The catalog collaborator: a remote, read-only content catalog.
//!
//! The engine only ever consumes this seam through the [`Catalog`] trait;
//! discovery strategies pass a [`DiscoverFilter`] and treat any failure as
//! "zero candidates", never as a fatal error. A deterministic in-memory
//! implementation ships for tests and demos.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{CatalogItem, ContentKind, GenreId, ItemId};

/// Filter passed to [`Catalog::discover`].
///
/// Empty `genres` means "any genre"; `exclude` is the already-rated set.
#[derive(Debug, Clone, Default)]
pub struct DiscoverFilter {
    pub kind: Option<ContentKind>,
    pub genres: Vec<GenreId>,
    pub year_range: Option<(u16, u16)>,
    pub min_rating: Option<f32>,
    pub max_rating: Option<f32>,
    pub exclude: HashSet<ItemId>,
    pub limit: usize,
}

impl DiscoverFilter {
    pub fn matches(&self, item: &CatalogItem) -> bool {
        if let Some(kind) = self.kind {
            if item.kind != kind {
                return false;
            }
        }
        if !self.genres.is_empty() && !item.genres.iter().any(|g| self.genres.contains(g)) {
            return false;
        }
        if let Some((start, end)) = self.year_range {
            match item.release_year {
                Some(year) if year >= start && year <= end => {}
                _ => return false,
            }
        }
        if let Some(min) = self.min_rating {
            if item.rating < min {
                return false;
            }
        }
        if let Some(max) = self.max_rating {
            if item.rating > max {
                return false;
            }
        }
        !self.exclude.contains(&item.id)
    }
}

/// Read-only content catalog.
///
/// Implementations are expected to be remote; both methods are async and
/// fallible, and callers must degrade gracefully when they fail.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Find items matching the filter, best-rated first, capped at
    /// `filter.limit` (unlimited when 0)
    async fn discover(&self, filter: &DiscoverFilter) -> Result<Vec<CatalogItem>>;

    /// Full detail lookup including credits and production companies
    async fn details(&self, item_id: ItemId) -> Result<Option<CatalogItem>>;
}

/// Deterministic in-memory catalog for tests and demos
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    items: HashMap<ItemId, CatalogItem>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<CatalogItem>) -> Self {
        let mut catalog = Self::new();
        for item in items {
            catalog.insert(item);
        }
        catalog
    }

    pub fn insert(&mut self, item: CatalogItem) {
        self.items.insert(item.id, item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self.items.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn discover(&self, filter: &DiscoverFilter) -> Result<Vec<CatalogItem>> {
        let mut matches: Vec<CatalogItem> = self
            .items
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect();

        // Best-rated first, id as the tiebreaker for determinism
        matches.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        if filter.limit > 0 {
            matches.truncate(filter.limit);
        }
        Ok(matches)
    }

    async fn details(&self, item_id: ItemId) -> Result<Option<CatalogItem>> {
        Ok(self.items.get(&item_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Credits;

    fn item(id: ItemId, genres: Vec<GenreId>, year: u16, rating: f32) -> CatalogItem {
        CatalogItem {
            id,
            kind: ContentKind::Movie,
            title: format!("Item {id}"),
            genres,
            release_year: Some(year),
            rating,
            credits: Credits::default(),
            companies: vec![],
        }
    }

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::with_items(vec![
            item(1, vec![28], 2020, 8.2),
            item(2, vec![18], 1995, 7.1),
            item(3, vec![28, 18], 2005, 6.0),
            item(4, vec![35], 2023, 8.9),
        ])
    }

    #[tokio::test]
    async fn test_discover_filters_by_genre() {
        let filter = DiscoverFilter {
            genres: vec![28],
            ..Default::default()
        };
        let items = catalog().discover(&filter).await.unwrap();
        let ids: Vec<ItemId> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_discover_respects_exclusion_and_min_rating() {
        let filter = DiscoverFilter {
            min_rating: Some(7.0),
            exclude: [1].into_iter().collect(),
            ..Default::default()
        };
        let items = catalog().discover(&filter).await.unwrap();
        let ids: Vec<ItemId> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![4, 2]);
    }

    #[tokio::test]
    async fn test_discover_year_range_and_limit() {
        let filter = DiscoverFilter {
            year_range: Some((1990, 2009)),
            limit: 1,
            ..Default::default()
        };
        let items = catalog().discover(&filter).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 2);
    }

    #[tokio::test]
    async fn test_details_lookup() {
        let found = catalog().details(2).await.unwrap();
        assert_eq!(found.map(|i| i.id), Some(2));
        assert!(catalog().details(999).await.unwrap().is_none());
    }
}
