//! tessera-morph - Binary morphology on bit-packed regions
//!
//! This crate provides:
//!
//! - Boolean structuring kernels with an anchor element
//! - Binary erosion and dilation as tiled area operators, computed with a
//!   word-packed sliding window

pub mod binary;
mod error;
pub mod kernel;

pub use binary::{BinaryMorph, MorphMode};
pub use error::{MorphError, MorphResult};
pub use kernel::{BinaryKernel, PackedKernel};
