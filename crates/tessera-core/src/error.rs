//! Error types for tessera-core
//!
//! Provides a unified error type for region construction, pixel access and
//! source requests. Numeric overflow on write-back is never reported here;
//! it is always resolved by saturation (see [`crate::sample`]).

use crate::rect::Rect;
use crate::sample::ElementType;
use thiserror::Error;

/// tessera-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid region dimensions
    #[error("invalid region dimensions: {width}x{height}")]
    InvalidDimension { width: i32, height: i32 },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Bands, element type or storage disagree with the declared layout
    #[error("layout mismatch: {0}")]
    LayoutMismatch(String),

    /// A requested rectangle is not covered by the available data
    #[error("region {requested:?} is outside {bounds:?}")]
    RegionOutOfBounds { requested: Rect, bounds: Rect },

    /// Band count mismatch
    #[error("band mismatch: expected {expected}, got {actual}")]
    BandMismatch { expected: usize, actual: usize },

    /// Element type not supported by an operation
    #[error("unsupported element type {element:?} for {operation}")]
    UnsupportedType {
        operation: &'static str,
        element: ElementType,
    },

    /// Index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Memory allocation failed
    #[error("memory allocation failed")]
    AllocationFailed,

    /// An upstream operator failed while producing source data
    #[error("operator error: {0}")]
    Operator(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type alias for tessera-core operations
pub type Result<T> = std::result::Result<T, Error>;
