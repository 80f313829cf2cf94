//! tessera-filter - Neighborhood filters and frequency transforms
//!
//! This crate provides:
//!
//! - Float convolution kernels, including separable box and Gaussian kernels
//! - Convolution as a tiled area operator, with a separable fast path
//! - A fast orthonormal cosine transform of power-of-two length
//! - Whole-image forward and inverse DCT with power-of-two padding
//! - Min, max and median rank filters with square, plus, X and separable
//!   neighborhoods

pub mod convolve;
pub mod dct;
mod error;
pub mod fct;
pub mod kernel;
pub mod rank;

pub use convolve::Convolve;
pub use dct::{Dct, DctDirection, DctOptions, padded_bounds};
pub use error::{FilterError, FilterResult};
pub use fct::Fct;
pub use kernel::Kernel;
pub use rank::{FilterShape, Footprint, RankFilter, RankKind};
