//! Core domain types for the personalization engine.
//!
//! This module defines the structures shared by every crate in the
//! workspace: catalog items, rating events and the metadata snapshot a
//! rating carries with it.

use serde::{Deserialize, Serialize};

// =============================================================================
// Type Aliases
// =============================================================================
// These make the domain clearer and prevent mixing up the various id spaces

/// Unique identifier for a catalog item (movie or series)
pub type ItemId = u32;

/// Unique identifier for a genre
pub type GenreId = u32;

/// Unique identifier for a person (actor, director, writer)
pub type PersonId = u32;

/// Unique identifier for a production company
pub type CompanyId = u32;

/// Unix timestamp in seconds
pub type Timestamp = i64;

/// Seconds in a day, used for all recency windows
pub const DAY_SECS: i64 = 24 * 60 * 60;

// =============================================================================
// Content Kind
// =============================================================================

/// Explicit tag for the two content kinds.
///
/// Internally everything branches on this enum; nothing discriminates
/// movies from series by the presence or absence of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    Movie,
    Series,
}

// =============================================================================
// Credits
// =============================================================================

/// A person referenced from an item's credits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: PersonId,
    pub name: String,
}

/// A production company referenced from an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRef {
    pub id: CompanyId,
    pub name: String,
}

/// Credit metadata for an item, split by the role that drives which
/// component of a detailed rating applies to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credits {
    /// Top-billed cast. Only the first [`Credits::CAST_CAP`] entries are
    /// profiled; anything past that is noise for affinity purposes.
    pub cast: Vec<PersonRef>,
    pub directors: Vec<PersonRef>,
    pub writers: Vec<PersonRef>,
}

impl Credits {
    /// How many cast members of an item feed creator affinities
    pub const CAST_CAP: usize = 5;

    pub fn is_empty(&self) -> bool {
        self.cast.is_empty() && self.directors.is_empty() && self.writers.is_empty()
    }

    /// Cast entries that actually count toward affinities
    pub fn billed_cast(&self) -> &[PersonRef] {
        let cap = self.cast.len().min(Self::CAST_CAP);
        &self.cast[..cap]
    }
}

// =============================================================================
// Catalog Item
// =============================================================================

/// An item as returned by the catalog collaborator.
///
/// `rating` is the catalog's own aggregate quality signal on a 0.0-10.0
/// scale. Credits and companies are present only when the item came from
/// a detail lookup; discovery results usually carry empty credits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub kind: ContentKind,
    pub title: String,
    pub genres: Vec<GenreId>,
    pub release_year: Option<u16>,
    /// Aggregate catalog rating, 0.0-10.0
    pub rating: f32,
    pub credits: Credits,
    pub companies: Vec<CompanyRef>,
}

impl CatalogItem {
    /// Decade label for the release year, e.g. "1990s"
    pub fn decade(&self) -> Option<String> {
        self.release_year.map(|y| format!("{}s", (y / 10) * 10))
    }

    /// Item age in whole years at `now_year`, 0 for future or unknown years
    pub fn age_years(&self, now_year: u16) -> u16 {
        self.release_year
            .map(|y| now_year.saturating_sub(y))
            .unwrap_or(0)
    }
}

// =============================================================================
// Ratings
// =============================================================================

/// The score attached to a rating event.
///
/// A detailed rating is the authoritative form; `simple_equivalent` and
/// `percent` give every consumer a uniform view regardless of which form
/// the user submitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RatingScore {
    /// Whole-star score, 1-10
    Simple(u8),
    /// Component scores, each 0-100
    Detailed {
        overall: u8,
        acting: u8,
        screenplay: u8,
        direction: u8,
    },
}

impl RatingScore {
    /// Uniform 1-10 view of the score
    pub fn simple_equivalent(&self) -> f32 {
        match *self {
            RatingScore::Simple(s) => s as f32,
            RatingScore::Detailed { overall, .. } => overall as f32 / 10.0,
        }
    }

    /// Uniform 0-100 view of the score
    pub fn percent(&self) -> f32 {
        match *self {
            RatingScore::Simple(s) => s as f32 * 10.0,
            RatingScore::Detailed { overall, .. } => overall as f32,
        }
    }

    pub fn is_detailed(&self) -> bool {
        matches!(self, RatingScore::Detailed { .. })
    }
}

/// A single rating event for one catalog item.
///
/// The event embeds the item metadata snapshot captured at rating time
/// (genres, year, credits, companies) so the profile builder stays a pure
/// function of the rating history with no catalog lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingEvent {
    pub item_id: ItemId,
    pub kind: ContentKind,
    pub score: RatingScore,
    pub timestamp: Timestamp,
    pub review: Option<String>,

    // Item snapshot captured when the rating was submitted
    pub genres: Vec<GenreId>,
    pub release_year: Option<u16>,
    pub credits: Credits,
    pub companies: Vec<CompanyRef>,
}

impl RatingEvent {
    /// A bare simple rating with just the genre snapshot, enough for most
    /// profile signals. Detailed events should fill in credits/companies.
    pub fn simple(
        item_id: ItemId,
        kind: ContentKind,
        score: u8,
        timestamp: Timestamp,
        genres: Vec<GenreId>,
    ) -> Self {
        Self {
            item_id,
            kind,
            score: RatingScore::Simple(score),
            timestamp,
            review: None,
            genres,
            release_year: None,
            credits: Credits::default(),
            companies: Vec::new(),
        }
    }
}
