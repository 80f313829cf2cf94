//! tessera-color - Palette quantization and band combination
//!
//! - [`Palette`] - up to 256 RGB entries with nearest-color classification
//! - [`PaletteTrainer`] - palette derivation from sampled pixels, either
//!   fixed ([`FixedPalette`]) or by median cut ([`MedianCutTrainer`])
//! - [`NearestColorQuantizer`] - palette-index image with a lazily trained
//!   palette
//! - [`BandCombine`] - affine combination of source bands

pub mod band_combine;
mod error;
pub mod palette;
pub mod quantize;
pub mod trainer;

pub use band_combine::{BandCombine, BandCombineOptions};
pub use error::{ColorError, ColorResult};
pub use palette::{MAX_PALETTE_SIZE, Palette};
pub use quantize::NearestColorQuantizer;
pub use trainer::{FixedPalette, MedianCutOptions, MedianCutTrainer, PaletteTrainer, sample_pixels};
