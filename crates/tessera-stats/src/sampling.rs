//! Region of interest and subsampling grid
//!
//! Sampled pixels are the points `(x_start + i * x_period, y_start + j *
//! y_period)` inside the ROI. The grid is anchored globally, so splitting an
//! image into tiles never changes which pixels are sampled.

use tessera_core::{ElementType, PixelRegion, Rect, Sample, materialize};

use crate::{StatsError, StatsResult};

/// Which pixels of an image contribute to a statistic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingGrid {
    roi: Option<Rect>,
    x_start: i32,
    y_start: i32,
    x_period: i32,
    y_period: i32,
}

impl Default for SamplingGrid {
    fn default() -> Self {
        Self {
            roi: None,
            x_start: 0,
            y_start: 0,
            x_period: 1,
            y_period: 1,
        }
    }
}

impl SamplingGrid {
    /// Create a grid
    ///
    /// # Errors
    ///
    /// Returns an error if either period is not positive.
    pub fn new(
        roi: Option<Rect>,
        x_start: i32,
        y_start: i32,
        x_period: i32,
        y_period: i32,
    ) -> StatsResult<Self> {
        if x_period <= 0 || y_period <= 0 {
            return Err(StatsError::InvalidParameters(format!(
                "sampling periods must be positive: {}x{}",
                x_period, y_period
            )));
        }
        Ok(Self {
            roi,
            x_start,
            y_start,
            x_period,
            y_period,
        })
    }

    /// Every pixel inside `roi`
    pub fn with_roi(roi: Rect) -> Self {
        Self {
            roi: Some(roi),
            ..Self::default()
        }
    }

    pub fn roi(&self) -> Option<Rect> {
        self.roi
    }

    pub fn x_start(&self) -> i32 {
        self.x_start
    }

    pub fn y_start(&self) -> i32 {
        self.y_start
    }

    pub fn x_period(&self) -> i32 {
        self.x_period
    }

    pub fn y_period(&self) -> i32 {
        self.y_period
    }

    /// Whether `tile` contains any pixel the ROI admits
    pub fn touches(&self, tile: Rect) -> bool {
        match self.roi {
            Some(roi) => roi.intersect(&tile).is_some(),
            None => !tile.is_empty(),
        }
    }

    /// Rectangle of `tile` to scan, starting on the first sampled pixel
    ///
    /// Returns `None` when the tile holds no sampled pixel.
    pub fn sampled_rect(&self, tile: Rect) -> Option<Rect> {
        let area = match self.roi {
            Some(roi) => roi.intersect(&tile)?,
            None => tile,
        };
        let x = start_position(area.x, self.x_start, self.x_period);
        let y = start_position(area.y, self.y_start, self.y_period);
        let (right, bottom) = (area.right(), area.bottom());
        if x >= right || y >= bottom {
            return None;
        }
        Some(Rect::new_unchecked(x, y, right - x, bottom - y))
    }

    /// Number of pixels sampled from a rectangle returned by [`Self::sampled_rect`]
    pub fn sample_count(&self, rect: Rect) -> u64 {
        let cols = (rect.width + self.x_period - 1) / self.x_period;
        let rows = (rect.height + self.y_period - 1) / self.y_period;
        cols.max(0) as u64 * rows.max(0) as u64
    }

    /// Visit every sampled pixel of `tile` in row-major order
    pub fn for_each(&self, tile: Rect, mut f: impl FnMut(i32, i32)) {
        let Some(rect) = self.sampled_rect(tile) else {
            return;
        };
        for y in (rect.y..rect.bottom()).step_by(self.y_period as usize) {
            for x in (rect.x..rect.right()).step_by(self.x_period as usize) {
                f(x, y);
            }
        }
    }
}

/// Visit the samples of every sampled pixel of `region`
///
/// `f` receives one value per band. Regions are read in their native type;
/// 1-bit samples arrive as 0 or 1. Returns the number of pixels visited.
pub(crate) fn scan<F>(region: &PixelRegion, grid: &SamplingGrid, f: F) -> StatsResult<u64>
where
    F: FnMut(&[f64]),
{
    match region.element_type() {
        ElementType::Bit | ElementType::Byte => scan_typed::<u8, F>(region, grid, f),
        ElementType::UShort => scan_typed::<u16, F>(region, grid, f),
        ElementType::Short => scan_typed::<i16, F>(region, grid, f),
        ElementType::Int => scan_typed::<i32, F>(region, grid, f),
        ElementType::Float => scan_typed::<f32, F>(region, grid, f),
        ElementType::Double => scan_typed::<f64, F>(region, grid, f),
    }
}

fn scan_typed<T: Sample, F>(region: &PixelRegion, grid: &SamplingGrid, mut f: F) -> StatsResult<u64>
where
    F: FnMut(&[f64]),
{
    let Some(rect) = grid.sampled_rect(region.rect()) else {
        return Ok(0);
    };
    let buf = materialize::<T>(region, rect, false)?;
    let mut pixel = vec![0.0; buf.bands()];
    let mut count = 0;
    grid.for_each(rect, |x, y| {
        for (b, v) in pixel.iter_mut().enumerate() {
            *v = buf.get(x, y, b).to_f64();
        }
        f(&pixel);
        count += 1;
    });
    Ok(count)
}

/// First sampled coordinate at or after `pos`
///
/// `pos + ((period - (pos - start) mod period) mod period)`, with the
/// modulo taken euclidean so positions before `start` align too.
#[inline]
pub fn start_position(pos: i32, start: i32, period: i32) -> i32 {
    pos + (period - (pos - start).rem_euclid(period)).rem_euclid(period)
}
