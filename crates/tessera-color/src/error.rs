//! Error types for tessera-color

use thiserror::Error;

/// Errors that can occur during color processing operations
#[derive(Debug, Error)]
pub enum ColorError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] tessera_core::Error),

    /// Statistics error raised while sampling training pixels
    #[error("stats error: {0}")]
    Stats(#[from] tessera_stats::StatsError),

    /// Unsupported source format for this operation
    #[error("unsupported source: expected {expected}, got {actual}")]
    UnsupportedType { expected: &'static str, actual: String },

    /// Band count differs from what the operation requires
    #[error("band mismatch: expected {expected}, got {actual}")]
    BandMismatch { expected: usize, actual: usize },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Empty image
    #[error("empty image: no pixels to process")]
    EmptyImage,
}

/// Result type for color operations
pub type ColorResult<T> = Result<T, ColorError>;
