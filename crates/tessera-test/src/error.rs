//! Error types for the test framework

use thiserror::Error;

/// Errors that can occur while building fixtures or checking golden files
#[derive(Debug, Error)]
pub enum TestError {
    /// Region construction failed
    #[error("core error: {0}")]
    Core(#[from] tessera_core::Error),

    /// An ASCII fixture could not be parsed
    #[error("invalid pattern at row {row}: {message}")]
    InvalidPattern { row: usize, message: String },

    /// Writing or reading a golden file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for test operations
pub type TestResult<T> = Result<T, TestError>;
