//! Error types for tessera-stats

use thiserror::Error;

/// Errors that can occur while accumulating statistics
#[derive(Debug, Error)]
pub enum StatsError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] tessera_core::Error),

    /// Band count of a region differs from the accumulator's
    #[error("band mismatch: expected {expected}, got {actual}")]
    BandMismatch { expected: usize, actual: usize },

    /// Unknown statistic property name
    #[error("unknown property: {0}")]
    UnknownProperty(String),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for statistics operations
pub type StatsResult<T> = Result<T, StatsError>;
