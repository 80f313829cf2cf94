//! Tessera - Tiled raster operators for Rust
//!
//! # Overview
//!
//! Tessera computes images tile by tile. Operators pull source pixels
//! through [`RegionSource`], expose their destination through [`TileOp`] and
//! share one pixel accessor, so each operator is written once per element
//! type instead of once per storage layout. The library includes:
//!
//! - Binary erosion and dilation on packed 1-bit data
//! - Convolution, rank filters and the discrete cosine transform
//! - Streaming statistics (mean, histogram, extrema) over a sampling grid
//! - Palette quantization and band combination
//!
//! # Example
//!
//! ```
//! use tessera::filter::{Convolve, Kernel};
//! use tessera::{BorderExtender, ElementType, Extended, ImageLayout, Layout, PixelRegion, Rect, render};
//!
//! let src = PixelRegion::from_fn(Rect::sized(8, 8), 1, ElementType::Byte, Layout::Banded, |_, _, _| 90.0)
//!     .unwrap();
//! let layout = ImageLayout::like(&src, 4, 4).unwrap();
//! let blur = Convolve::new(Extended::new(src, BorderExtender::Copy), Kernel::box_filter(3).unwrap(), layout)
//!     .unwrap();
//! let out = render(&blur).unwrap();
//! assert_eq!(out.get(0, 0, 0), Some(90.0));
//! ```

// Re-export core types (primary data structures used everywhere)
pub use tessera_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use tessera_color as color;
pub use tessera_filter as filter;
pub use tessera_morph as morph;
pub use tessera_stats as stats;
