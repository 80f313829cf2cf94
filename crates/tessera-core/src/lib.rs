//! tessera-core - Pixel regions and the shared raster-access core
//!
//! This crate provides the pieces every tiled operator is built on:
//!
//! - [`PixelRegion`] - a rectangular multi-band block of samples in one of
//!   several storage layouts (banded, interleaved, packed 1-bit, packed pixel)
//! - [`ElementType`] / [`Sample`] - the seven element types and their
//!   saturating clamp policy
//! - [`WorkingBuffer`] - the pixel accessor's strided, band-major view or
//!   copy of a region ([`materialize`], [`materialize_mut`], [`packed_bits`])
//! - [`AreaExtent`] - the neighborhood contract of area operators
//! - [`BorderExtender`] / [`Extended`] - border synthesis on the source side
//! - [`RegionSource`] / [`TileOp`] / [`ImageLayout`] - the collaborator
//!   contracts operators consume and expose

pub mod accessor;
pub mod area;
pub mod border;
pub mod error;
pub mod rect;
pub mod region;
pub mod sample;
pub mod source;

pub use accessor::{
    PackedBits, PackedBitsMut, WorkingBuffer, materialize, materialize_mut, packed_bits,
    packed_bits_mut,
};
pub use area::AreaExtent;
pub use border::{BorderExtender, Extended};
pub use error::{Error, Result};
pub use rect::Rect;
pub use region::{Bank, Layout, PixelRegion};
pub use sample::{ElementType, Sample, clamp_byte, convert};
pub use source::{ImageLayout, OpSource, RegionSource, TileOp, render};
