//! Error types for tessera-morph

use thiserror::Error;

/// Errors that can occur during morphological operations
#[derive(Debug, Error)]
pub enum MorphError {
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

    /// Source is not a 1-band binary image
    #[error("unsupported source: expected {expected}, got {actual}")]
    UnsupportedSource { expected: &'static str, actual: String },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for morphological operations
pub type MorphResult<T> = Result<T, MorphError>;
