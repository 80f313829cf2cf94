//! Source and operator contracts
//!
//! - [`RegionSource`] - anything that can hand out pixel data for a rect
//! - [`ImageLayout`] - destination bounds, tile grid, bands and element type
//! - [`TileOp`] - the per-operator `compute_tile` entry point
//!
//! Operators pull data from their sources one tile at a time. Nothing here
//! schedules or caches tiles; [`render`] is a plain sequential walk used to
//! materialize a whole result.

use std::sync::Arc;

use log::trace;

use crate::error::{Error, Result};
use crate::rect::Rect;
use crate::region::{Layout, PixelRegion};
use crate::sample::ElementType;

/// Provider of pixel data
pub trait RegionSource {
    /// Rectangle of available pixels
    fn bounds(&self) -> Rect;

    /// Number of bands in every returned region
    fn bands(&self) -> usize;

    /// Element type of every returned region
    fn element_type(&self) -> ElementType;

    /// Produce the pixels of `rect`
    ///
    /// Plain sources fail when `rect` leaves [`Self::bounds`]; wrap them in
    /// [`crate::border::Extended`] to synthesize the border.
    fn get_data(&self, rect: Rect) -> Result<PixelRegion>;
}

impl RegionSource for PixelRegion {
    fn bounds(&self) -> Rect {
        self.rect()
    }

    fn bands(&self) -> usize {
        self.bands
    }

    fn element_type(&self) -> ElementType {
        self.element
    }

    fn get_data(&self, rect: Rect) -> Result<PixelRegion> {
        self.crop(rect)
    }
}

impl<S: RegionSource + ?Sized> RegionSource for &S {
    fn bounds(&self) -> Rect {
        (**self).bounds()
    }
    fn bands(&self) -> usize {
        (**self).bands()
    }
    fn element_type(&self) -> ElementType {
        (**self).element_type()
    }
    fn get_data(&self, rect: Rect) -> Result<PixelRegion> {
        (**self).get_data(rect)
    }
}

impl<S: RegionSource + ?Sized> RegionSource for Arc<S> {
    fn bounds(&self) -> Rect {
        (**self).bounds()
    }
    fn bands(&self) -> usize {
        (**self).bands()
    }
    fn element_type(&self) -> ElementType {
        (**self).element_type()
    }
    fn get_data(&self, rect: Rect) -> Result<PixelRegion> {
        (**self).get_data(rect)
    }
}

/// Destination layout supplied to an operator at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLayout {
    bounds: Rect,
    tile_width: i32,
    tile_height: i32,
    bands: usize,
    element: ElementType,
}

impl ImageLayout {
    /// Layout with a regular tile grid anchored at the bounds origin
    ///
    /// # Errors
    ///
    /// Returns an error for empty bounds, non-positive tile sizes or zero
    /// bands.
    pub fn tiled(
        bounds: Rect,
        tile_width: i32,
        tile_height: i32,
        bands: usize,
        element: ElementType,
    ) -> Result<Self> {
        if bounds.is_empty() {
            return Err(Error::InvalidDimension {
                width: bounds.width,
                height: bounds.height,
            });
        }
        if tile_width <= 0 || tile_height <= 0 {
            return Err(Error::InvalidParameter(format!(
                "tile size must be positive: {}x{}",
                tile_width, tile_height
            )));
        }
        if bands == 0 {
            return Err(Error::InvalidParameter("layout needs at least one band".into()));
        }
        Ok(Self {
            bounds,
            tile_width,
            tile_height,
            bands,
            element,
        })
    }

    /// Layout with a single tile covering the bounds
    pub fn untiled(bounds: Rect, bands: usize, element: ElementType) -> Result<Self> {
        Self::tiled(bounds, bounds.width, bounds.height, bands, element)
    }

    /// Layout matching a source's bounds, bands and element type
    pub fn like<S: RegionSource + ?Sized>(source: &S, tile_width: i32, tile_height: i32) -> Result<Self> {
        Self::tiled(
            source.bounds(),
            tile_width,
            tile_height,
            source.bands(),
            source.element_type(),
        )
    }

    /// Copy of this layout with other bands and element type
    pub fn with_format(&self, bands: usize, element: ElementType) -> Result<Self> {
        Self::tiled(self.bounds, self.tile_width, self.tile_height, bands, element)
    }

    /// Copy of this layout with other bounds and the same tile size
    pub fn with_bounds(&self, bounds: Rect) -> Result<Self> {
        Self::tiled(bounds, self.tile_width, self.tile_height, self.bands, self.element)
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    #[inline]
    pub fn tile_width(&self) -> i32 {
        self.tile_width
    }

    #[inline]
    pub fn tile_height(&self) -> i32 {
        self.tile_height
    }

    #[inline]
    pub fn bands(&self) -> usize {
        self.bands
    }

    #[inline]
    pub fn element_type(&self) -> ElementType {
        self.element
    }

    /// Number of tile columns and rows
    pub fn tile_grid(&self) -> (i32, i32) {
        (
            (self.bounds.width + self.tile_width - 1) / self.tile_width,
            (self.bounds.height + self.tile_height - 1) / self.tile_height,
        )
    }

    /// Rectangle of tile (tx, ty), clipped to the bounds
    pub fn tile_rect(&self, tx: i32, ty: i32) -> Option<Rect> {
        let (cols, rows) = self.tile_grid();
        if !(0..cols).contains(&tx) || !(0..rows).contains(&ty) {
            return None;
        }
        Rect::new_unchecked(
            self.bounds.x + tx * self.tile_width,
            self.bounds.y + ty * self.tile_height,
            self.tile_width,
            self.tile_height,
        )
        .intersect(&self.bounds)
    }

    /// All tile rectangles in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = Rect> + '_ {
        let (cols, rows) = self.tile_grid();
        (0..rows).flat_map(move |ty| (0..cols).filter_map(move |tx| self.tile_rect(tx, ty)))
    }

    /// Storage layout used for whole-image results
    pub fn storage(&self) -> Layout {
        if self.element == ElementType::Bit {
            Layout::packed(self.bounds.width)
        } else {
            Layout::Interleaved
        }
    }
}

/// An operator computing destination tiles on demand
pub trait TileOp {
    /// Operator-specific error
    type Error: std::error::Error + Send + Sync + 'static;

    /// Destination layout fixed at construction
    fn layout(&self) -> &ImageLayout;

    /// Compute the destination pixels of `dest`
    ///
    /// Either returns a fully valid region covering exactly `dest` or fails;
    /// partial results are never returned.
    fn compute_tile(&self, dest: Rect) -> std::result::Result<PixelRegion, Self::Error>;

    /// Borrow this operator as a source for another operator
    fn as_source(&self) -> OpSource<'_, Self>
    where
        Self: Sized,
    {
        OpSource(self)
    }
}

/// Compute every tile of an operator and mosaic them into one region
pub fn render<O>(op: &O) -> std::result::Result<PixelRegion, O::Error>
where
    O: TileOp + ?Sized,
    O::Error: From<Error>,
{
    let layout = op.layout();
    let mut out: Option<PixelRegion> = None;
    for tile in layout.tiles() {
        trace!("render tile {:?}", tile);
        let region = op.compute_tile(tile)?;
        if out.is_none() {
            let storage = match region.layout() {
                Layout::Packed { .. } => Layout::packed(layout.bounds().width),
                other => other.clone(),
            };
            out = Some(PixelRegion::new(
                layout.bounds(),
                region.bands(),
                region.element_type(),
                storage,
            )?);
        }
        if let Some(target) = out.as_mut() {
            target.copy_from(&region)?;
        }
    }
    match out {
        Some(region) => Ok(region),
        None => Err(Error::InvalidDimension {
            width: layout.bounds().width,
            height: layout.bounds().height,
        }
        .into()),
    }
}

/// Adapter exposing a [`TileOp`] as a [`RegionSource`]
pub struct OpSource<'a, O: TileOp>(pub &'a O);

impl<O: TileOp> RegionSource for OpSource<'_, O> {
    fn bounds(&self) -> Rect {
        self.0.layout().bounds()
    }

    fn bands(&self) -> usize {
        self.0.layout().bands()
    }

    fn element_type(&self) -> ElementType {
        self.0.layout().element_type()
    }

    fn get_data(&self, rect: Rect) -> Result<PixelRegion> {
        let bounds = self.bounds();
        if !bounds.contains_rect(&rect) {
            return Err(Error::RegionOutOfBounds {
                requested: rect,
                bounds,
            });
        }
        self.0
            .compute_tile(rect)
            .map_err(|e| Error::Operator(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Coordinates {
        layout: ImageLayout,
    }

    impl TileOp for Coordinates {
        type Error = Error;

        fn layout(&self) -> &ImageLayout {
            &self.layout
        }

        fn compute_tile(&self, dest: Rect) -> Result<PixelRegion> {
            PixelRegion::from_fn(dest, 1, ElementType::Int, Layout::Banded, |x, y, _| {
                (y * 100 + x) as f64
            })
        }
    }

    #[test]
    fn test_tile_grid_clipping() {
        let layout = ImageLayout::tiled(Rect::new_unchecked(2, 3, 10, 7), 4, 4, 1, ElementType::Byte).unwrap();
        assert_eq!(layout.tile_grid(), (3, 2));
        assert_eq!(layout.tile_rect(2, 1), Some(Rect::new_unchecked(10, 7, 2, 3)));
        assert_eq!(layout.tile_rect(3, 0), None);
        let tiles: Vec<Rect> = layout.tiles().collect();
        assert_eq!(tiles.len(), 6);
        let covered: usize = tiles.iter().map(|t| t.area()).sum();
        assert_eq!(covered, 70);
    }

    #[test]
    fn test_render_mosaics_tiles() {
        let op = Coordinates {
            layout: ImageLayout::tiled(Rect::sized(5, 5), 2, 3, 1, ElementType::Int).unwrap(),
        };
        let full = render(&op).unwrap();
        assert_eq!(full.rect(), Rect::sized(5, 5));
        assert_eq!(full.get(4, 4, 0), Some(404.0));
        assert_eq!(full.get(1, 3, 0), Some(301.0));
    }

    #[test]
    fn test_op_source_bounds() {
        let op = Coordinates {
            layout: ImageLayout::untiled(Rect::sized(3, 3), 1, ElementType::Int).unwrap(),
        };
        let src = op.as_source();
        assert_eq!(src.get_data(Rect::new_unchecked(1, 1, 2, 2)).unwrap().get(2, 2, 0), Some(202.0));
        assert!(src.get_data(Rect::new_unchecked(2, 2, 2, 2)).is_err());
    }

    #[test]
    fn test_pixel_region_source_rejects_outside() {
        let r = PixelRegion::new(Rect::sized(2, 2), 1, ElementType::Byte, Layout::Banded).unwrap();
        assert!(r.get_data(Rect::new_unchecked(-1, 0, 2, 2)).is_err());
        assert!(r.get_data(Rect::sized(2, 1)).is_ok());
    }
}
