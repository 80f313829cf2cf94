//! Error types for tessera-filter

use thiserror::Error;

/// Errors that can occur during filtering operations
#[derive(Debug, Error)]
pub enum FilterError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] tessera_core::Error),

    /// Invalid kernel
    #[error("invalid kernel: {0}")]
    InvalidKernel(String),

    /// Kernel larger than the source image
    #[error("kernel {kernel_width}x{kernel_height} exceeds image {image_width}x{image_height}")]
    KernelTooLarge {
        kernel_width: u32,
        kernel_height: u32,
        image_width: i32,
        image_height: i32,
    },

    /// Unsupported element type for this operation
    #[error("unsupported element type: expected {expected}, got {actual:?}")]
    UnsupportedType {
        /// Expected type description
        expected: &'static str,
        /// Actual element type
        actual: tessera_core::ElementType,
    },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;
