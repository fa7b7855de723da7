//! Error types for the store crate.
//!
//! Malformed ratings are rejected here, at the boundary; the profile
//! builder assumes clean input and never validates again.

use thiserror::Error;

use crate::types::ItemId;

/// Errors raised when a rating event is rejected at the store boundary
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// Simple score outside 1-10
    #[error("simple score {score} for item {item_id} is outside 1-10")]
    SimpleScoreOutOfRange { item_id: ItemId, score: u8 },

    /// A detailed component outside 0-100
    #[error("detailed {component} score {score} for item {item_id} is outside 0-100")]
    DetailedScoreOutOfRange {
        item_id: ItemId,
        component: &'static str,
        score: u8,
    },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, StoreError>;
