//! Running per-band minimum and maximum

use tessera_core::PixelRegion;

use crate::sampling::{SamplingGrid, scan};
use crate::{StatsError, StatsResult};

#[derive(Debug, Clone, PartialEq)]
pub struct Extrema {
    min: Vec<f64>,
    max: Vec<f64>,
    count: u64,
}

impl Extrema {
    pub fn new(bands: usize) -> Self {
        Self {
            min: vec![f64::INFINITY; bands],
            max: vec![f64::NEG_INFINITY; bands],
            count: 0,
        }
    }

    /// Fold the sampled pixels of `region` into the running extrema
    pub fn accumulate(&mut self, region: &PixelRegion, grid: &SamplingGrid) -> StatsResult<()> {
        if region.bands() != self.min.len() {
            return Err(StatsError::BandMismatch {
                expected: self.min.len(),
                actual: region.bands(),
            });
        }
        let (min, max) = (&mut self.min, &mut self.max);
        self.count += scan(region, grid, |pixel| {
            for (b, &v) in pixel.iter().enumerate() {
                min[b] = min[b].min(v);
                max[b] = max[b].max(v);
            }
        })?;
        Ok(())
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Per-band minimum, `None` before any pixel was sampled
    pub fn min(&self) -> Option<&[f64]> {
        (self.count > 0).then_some(self.min.as_slice())
    }

    /// Per-band maximum, `None` before any pixel was sampled
    pub fn max(&self) -> Option<&[f64]> {
        (self.count > 0).then_some(self.max.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{ElementType, Layout, Rect};

    #[test]
    fn test_extrema_with_grid() {
        let r = PixelRegion::from_fn(Rect::sized(6, 3), 1, ElementType::Int, Layout::Banded, |x, y, _| {
            (x * 10 - y) as f64
        })
        .unwrap();
        let mut e = Extrema::new(1);
        assert_eq!(e.min(), None);
        // columns 1, 3, 5 and rows 0, 2
        let grid = SamplingGrid::new(None, 1, 0, 2, 2).unwrap();
        e.accumulate(&r, &grid).unwrap();
        assert_eq!(e.count(), 6);
        assert_eq!(e.min(), Some(&[8.0][..]));
        assert_eq!(e.max(), Some(&[50.0][..]));
    }
}
