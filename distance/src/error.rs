//! Configuration errors.
//!
//! Only setup can fail recoverably. Query-time precondition violations
//! (inconsistent indexing, self pairs through the condensed path) panic with
//! the offending tags and indices instead.

use crate::config::DistanceMethod;
use thiserror::Error;

/// Result type for distance configuration.
pub type Result<T> = std::result::Result<T, DistanceError>;

#[derive(Debug, Error)]
pub enum DistanceError {
    #[error("invalid distance method {0}, expected 0..=3")]
    InvalidMethod(u8),

    #[error("distance method already set to {current:?}, cannot switch to {requested:?} mid-session")]
    MethodLocked {
        current: DistanceMethod,
        requested: DistanceMethod,
    },

    #[error("invalid distance config: {0}")]
    Config(#[from] serde_json::Error),
}
