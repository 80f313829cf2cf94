//! Nearest-color quantization
//!
//! [`NearestColorQuantizer`] maps every pixel of an RGB byte image to the
//! index of its nearest palette entry. The palette is trained on first use
//! and shared by every tile.

use std::sync::{Mutex, OnceLock, PoisonError};

use log::debug;
use tessera_core::{
    ElementType, ImageLayout, Layout, PixelRegion, Rect, RegionSource, Sample, TileOp, materialize,
};
use tessera_stats::SamplingGrid;

use crate::palette::Palette;
use crate::trainer::{PaletteTrainer, check_rgb};
use crate::{ColorError, ColorResult};

/// Palette-index image of a 3-band byte source
pub struct NearestColorQuantizer<S, T> {
    source: S,
    trainer: T,
    grid: SamplingGrid,
    layout: ImageLayout,
    palette: OnceLock<Palette>,
    training: Mutex<()>,
}

impl<S: RegionSource, T: PaletteTrainer> NearestColorQuantizer<S, T> {
    /// Create a quantizer whose 1-band output is split into tiles of the given size
    ///
    /// # Errors
    ///
    /// Fails unless the source has 3 bands of byte samples.
    pub fn new(
        source: S,
        trainer: T,
        grid: SamplingGrid,
        tile_width: i32,
        tile_height: i32,
    ) -> ColorResult<Self> {
        check_rgb(&source)?;
        let layout = ImageLayout::tiled(source.bounds(), tile_width, tile_height, 1, ElementType::Byte)?;
        Ok(Self {
            source,
            trainer,
            grid,
            layout,
            palette: OnceLock::new(),
            training: Mutex::new(()),
        })
    }

    pub fn trainer(&self) -> &T {
        &self.trainer
    }

    pub fn grid(&self) -> &SamplingGrid {
        &self.grid
    }

    /// The trained palette, computed on first use
    pub fn palette(&self) -> ColorResult<&Palette> {
        if let Some(palette) = self.palette.get() {
            return Ok(palette);
        }
        // Concurrent first callers wait here for a single training pass
        let _guard = self.training.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(palette) = self.palette.get() {
            return Ok(palette);
        }
        let palette = self.trainer.train(&self.source, &self.grid)?;
        debug!("NearestColorQuantizer: trained {} colors", palette.len());
        Ok(self.palette.get_or_init(|| palette))
    }
}

impl<S: RegionSource, T: PaletteTrainer> TileOp for NearestColorQuantizer<S, T> {
    type Error = ColorError;

    fn layout(&self) -> &ImageLayout {
        &self.layout
    }

    fn compute_tile(&self, dest: Rect) -> ColorResult<PixelRegion> {
        let palette = self.palette()?;
        let src = self.source.get_data(dest)?;
        let rgb = materialize::<u8>(&src, dest, false)?;
        let mut indices = Vec::with_capacity(dest.area());
        for y in dest.y..dest.bottom() {
            for x in dest.x..dest.right() {
                indices.push(palette.nearest(rgb.get(x, y, 0), rgb.get(x, y, 1), rgb.get(x, y, 2)));
            }
        }
        Ok(PixelRegion::from_banks(
            dest,
            1,
            ElementType::Byte,
            Layout::Interleaved,
            vec![u8::into_bank(indices)],
        )?)
    }
}
