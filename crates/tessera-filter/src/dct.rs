//! Whole-image discrete cosine transform
//!
//! The transform is global, so [`Dct`] computes the full image once, on the
//! first tile request, and serves every tile from that cached result.
//! Non-unit dimensions are zero-padded to the next power of two; rows are
//! transformed first, then columns, and an axis of length 1 is skipped.

use std::collections::TryReserveError;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use log::{debug, warn};
use tessera_core::{
    Bank, ElementType, Error, ImageLayout, Layout, PixelRegion, Rect, RegionSource, Sample,
    TileOp, materialize,
};

use crate::fct::Fct;
use crate::{FilterError, FilterResult};

/// Transform direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DctDirection {
    Forward,
    Inverse,
}

/// Options for [`Dct`]
#[derive(Clone, Default)]
pub struct DctOptions {
    /// Called to free cached memory before the single allocation retry
    pub release_memory: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl DctOptions {
    /// Options with a memory-release hook
    pub fn with_release_hook<F>(hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            release_memory: Some(Arc::new(hook)),
        }
    }
}

impl fmt::Debug for DctOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DctOptions")
            .field("release_memory", &self.release_memory.is_some())
            .finish()
    }
}

/// Forward or inverse DCT of a whole source image
///
/// The destination is Float, or Double for a Double source, and covers the
/// source bounds padded to power-of-two dimensions.
pub struct Dct<S> {
    source: S,
    direction: DctDirection,
    layout: ImageLayout,
    options: DctOptions,
    cache: OnceLock<PixelRegion>,
    computing: Mutex<()>,
}

impl<S: RegionSource> Dct<S> {
    /// Create a transform whose destination is split into tiles of the given size
    pub fn new(
        source: S,
        direction: DctDirection,
        tile_width: i32,
        tile_height: i32,
        options: DctOptions,
    ) -> FilterResult<Self> {
        let bounds = padded_bounds(source.bounds());
        let element = match source.element_type() {
            ElementType::Double => ElementType::Double,
            _ => ElementType::Float,
        };
        let layout = ImageLayout::tiled(bounds, tile_width, tile_height, source.bands(), element)?;
        Ok(Self {
            source,
            direction,
            layout,
            options,
            cache: OnceLock::new(),
            computing: Mutex::new(()),
        })
    }

    pub fn direction(&self) -> DctDirection {
        self.direction
    }

    /// The whole transformed image, computed on first use
    pub fn whole(&self) -> FilterResult<&PixelRegion> {
        if let Some(region) = self.cache.get() {
            return Ok(region);
        }
        // Concurrent first callers wait here for a single transform
        let _guard = self.computing.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(region) = self.cache.get() {
            return Ok(region);
        }
        let region = self.compute_whole()?;
        Ok(self.cache.get_or_init(|| region))
    }

    fn compute_whole(&self) -> FilterResult<PixelRegion> {
        let src_bounds = self.source.bounds();
        let bounds = self.layout.bounds();
        let (pw, ph) = (bounds.width as usize, bounds.height as usize);
        debug!(
            "Dct {:?} {}x{} padded to {}x{}",
            self.direction, src_bounds.width, src_bounds.height, pw, ph
        );

        let src = self.source.get_data(src_bounds)?;
        let row_fct = Fct::new(pw)?;
        let col_fct = Fct::new(ph)?;
        let mut column = self.allocate::<f64>(ph)?;
        column.resize(ph, 0.0);
        let mut scratch = self.allocate::<f64>(pw.max(ph))?;
        scratch.resize(pw.max(ph), 0.0);

        let mut banks = Vec::with_capacity(self.layout.bands());
        for band in 0..self.layout.bands() {
            let mut plane = self.allocate::<f64>(pw * ph)?;
            plane.resize(pw * ph, 0.0);
            match src.element_type() {
                ElementType::Bit => {
                    for y in 0..src_bounds.height {
                        let row = y as usize * pw;
                        for x in 0..src_bounds.width {
                            plane[row + x as usize] =
                                src.get(src_bounds.x + x, src_bounds.y + y, band).unwrap_or(0.0);
                        }
                    }
                }
                ElementType::Byte => load_plane::<u8>(&src, band, pw, &mut plane)?,
                ElementType::UShort => load_plane::<u16>(&src, band, pw, &mut plane)?,
                ElementType::Short => load_plane::<i16>(&src, band, pw, &mut plane)?,
                ElementType::Int => load_plane::<i32>(&src, band, pw, &mut plane)?,
                ElementType::Float => load_plane::<f32>(&src, band, pw, &mut plane)?,
                ElementType::Double => load_plane::<f64>(&src, band, pw, &mut plane)?,
            }

            if pw > 1 {
                for row in plane.chunks_exact_mut(pw) {
                    self.apply(&row_fct, row, &mut scratch[..pw])?;
                }
            }
            if ph > 1 {
                for x in 0..pw {
                    for (y, c) in column.iter_mut().enumerate() {
                        *c = plane[y * pw + x];
                    }
                    self.apply(&col_fct, &mut column, &mut scratch[..ph])?;
                    for (y, c) in column.iter().enumerate() {
                        plane[y * pw + x] = *c;
                    }
                }
            }

            banks.push(match self.layout.element_type() {
                ElementType::Double => Bank::Double(plane),
                _ => {
                    let mut narrow = self.allocate::<f32>(pw * ph)?;
                    narrow.extend(plane.iter().map(|&v| v as f32));
                    Bank::Float(narrow)
                }
            });
        }

        Ok(PixelRegion::from_banks(
            bounds,
            self.layout.bands(),
            self.layout.element_type(),
            Layout::Banded,
            banks,
        )?)
    }

    fn apply(&self, fct: &Fct, data: &mut [f64], scratch: &mut [f64]) -> FilterResult<()> {
        match self.direction {
            DctDirection::Forward => fct.forward_with(data, scratch),
            DctDirection::Inverse => fct.inverse_with(data, scratch),
        }
    }

    fn allocate<T>(&self, len: usize) -> FilterResult<Vec<T>> {
        allocate_with_retry(
            || {
                let mut v = Vec::new();
                v.try_reserve_exact(len).map(|_| v)
            },
            self.options.release_memory.as_deref(),
        )
    }
}

impl<S: RegionSource> TileOp for Dct<S> {
    type Error = FilterError;

    fn layout(&self) -> &ImageLayout {
        &self.layout
    }

    fn compute_tile(&self, dest: Rect) -> FilterResult<PixelRegion> {
        Ok(self.whole()?.crop(dest)?)
    }
}

/// Copy one band of `src` into the top-left of a `stride`-wide plane
///
/// Native banded and interleaved regions are read through a view, so no
/// whole-image buffer is allocated besides `plane`.
fn load_plane<T: Sample>(src: &PixelRegion, band: usize, stride: usize, plane: &mut [f64]) -> FilterResult<()> {
    let rect = src.rect();
    let input = materialize::<T>(src, rect, false)?;
    for y in 0..rect.height {
        let row = y as usize * stride;
        for x in 0..rect.width {
            plane[row + x as usize] = input.get(rect.x + x, rect.y + y, band).to_f64();
        }
    }
    Ok(())
}

/// Bounds with each non-unit dimension rounded up to a power of two
pub fn padded_bounds(bounds: Rect) -> Rect {
    let pad = |n: i32| {
        if n <= 1 {
            n
        } else {
            Fct::next_power_of_two(n as usize) as i32
        }
    };
    Rect::new_unchecked(bounds.x, bounds.y, pad(bounds.width), pad(bounds.height))
}

/// Run an allocation, releasing memory and retrying once on failure
fn allocate_with_retry<T, F>(mut attempt: F, release: Option<&(dyn Fn() + Send + Sync)>) -> FilterResult<T>
where
    F: FnMut() -> Result<T, TryReserveError>,
{
    match attempt() {
        Ok(v) => Ok(v),
        Err(e) => {
            warn!("DCT allocation failed ({}), releasing memory and retrying", e);
            if let Some(release) = release {
                release();
            }
            attempt().map_err(|_| FilterError::Core(Error::AllocationFailed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn overflow() -> TryReserveError {
        let mut v: Vec<u64> = Vec::new();
        match v.try_reserve(usize::MAX) {
            Err(e) => e,
            Ok(()) => unreachable!("reserving usize::MAX elements cannot succeed"),
        }
    }

    #[test]
    fn test_padded_bounds() {
        assert_eq!(padded_bounds(Rect::sized(5, 1)), Rect::sized(8, 1));
        assert_eq!(padded_bounds(Rect::sized(1, 3)), Rect::sized(1, 4));
        assert_eq!(padded_bounds(Rect::new_unchecked(2, 2, 16, 9)), Rect::new_unchecked(2, 2, 16, 16));
    }

    #[test]
    fn test_retry_once_then_fail() {
        let released = AtomicUsize::new(0);
        let hook = || {
            released.fetch_add(1, Ordering::SeqCst);
        };
        let mut calls = 0;
        let ok = allocate_with_retry(
            || {
                calls += 1;
                if calls == 1 { Err(overflow()) } else { Ok(7) }
            },
            Some(&hook),
        );
        assert_eq!(ok.unwrap(), 7);
        assert_eq!(released.load(Ordering::SeqCst), 1);

        let failed: FilterResult<u8> = allocate_with_retry(|| Err(overflow()), Some(&hook));
        assert!(matches!(failed, Err(FilterError::Core(Error::AllocationFailed))));
        assert_eq!(released.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_whole_is_cached() {
        let src = PixelRegion::from_fn(Rect::sized(3, 2), 1, ElementType::Byte, Layout::Banded, |x, y, _| {
            (x + 4 * y) as f64
        })
        .unwrap();
        let dct = Dct::new(src, DctDirection::Forward, 2, 2, DctOptions::default()).unwrap();
        assert_eq!(dct.layout().bounds(), Rect::sized(4, 2));
        assert_eq!(dct.layout().element_type(), ElementType::Float);
        let a = dct.whole().unwrap() as *const PixelRegion;
        let b = dct.whole().unwrap() as *const PixelRegion;
        assert_eq!(a, b);
    }

    #[test]
    fn test_whole_concurrent_callers_share_result() {
        let src = PixelRegion::from_fn(Rect::sized(9, 5), 1, ElementType::Short, Layout::Banded, |x, y, _| {
            (x * y) as f64
        })
        .unwrap();
        let dct = Dct::new(src, DctDirection::Forward, 4, 4, DctOptions::default()).unwrap();
        let addresses: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| dct.whole().unwrap() as *const PixelRegion as usize))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(addresses.iter().all(|&a| a == addresses[0]));
    }

    #[test]
    fn test_whole_loads_every_element_type_in_place() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&released);
        let options = DctOptions::with_release_hook(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let rect = Rect::sized(3, 2);
        for (ty, layout) in [
            (ElementType::Bit, Layout::packed(3)),
            (ElementType::Int, Layout::Banded),
            (ElementType::Double, Layout::Interleaved),
        ] {
            let src = PixelRegion::from_fn(rect, 1, ty, layout, |_, _, _| 1.0).unwrap();
            let dct = Dct::new(src, DctDirection::Forward, 4, 2, options.clone()).unwrap();
            let whole = dct.whole().unwrap();
            // six ones in a 4x2 orthonormal transform: DC = 6 / sqrt(8)
            let dc = whole.get(0, 0, 0).unwrap();
            assert!((dc - 6.0 / 8f64.sqrt()).abs() < 1e-5, "{ty:?}: dc {dc}");
            assert!(whole.get(3, 1, 0).is_some());
        }
        assert_eq!(released.load(Ordering::SeqCst), 0);
    }
}
