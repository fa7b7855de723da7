//! # Store Crate
//!
//! Core domain types plus the two external collaborator seams of the
//! personalization engine:
//!
//! - [`RatingStore`]: the ordered, deduplicated-by-item rating history
//!   that is the source of truth for profile building. Malformed ratings
//!   are rejected here, at the boundary.
//! - [`Catalog`]: the remote, read-only content catalog used by the
//!   discovery strategies.
//!
//! Both seams ship with in-memory implementations so the engine can be
//! exercised end to end without any external service.

pub mod catalog;
pub mod error;
pub mod rating_store;
pub mod types;

// Re-export commonly used types
pub use catalog::{Catalog, DiscoverFilter, MemoryCatalog};
pub use error::{Result, StoreError};
pub use rating_store::{MemoryRatingStore, RatingStore};
pub use types::{
    CatalogItem, CompanyId, CompanyRef, ContentKind, Credits, GenreId, ItemId, PersonId,
    PersonRef, RatingEvent, RatingScore, Timestamp, DAY_SECS,
};
