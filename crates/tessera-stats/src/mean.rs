//! Running per-band mean

use tessera_core::PixelRegion;

use crate::sampling::{SamplingGrid, scan};
use crate::{StatsError, StatsResult};

/// Per-band sums and a sample count, accumulated tile by tile
#[derive(Debug, Clone, PartialEq)]
pub struct MeanAccumulator {
    sums: Vec<f64>,
    count: u64,
}

impl MeanAccumulator {
    pub fn new(bands: usize) -> Self {
        Self {
            sums: vec![0.0; bands],
            count: 0,
        }
    }

    /// Add the sampled pixels of `region`
    ///
    /// A region the ROI misses leaves the state unchanged.
    pub fn accumulate(&mut self, region: &PixelRegion, grid: &SamplingGrid) -> StatsResult<()> {
        if region.bands() != self.sums.len() {
            return Err(StatsError::BandMismatch {
                expected: self.sums.len(),
                actual: region.bands(),
            });
        }
        let sums = &mut self.sums;
        self.count += scan(region, grid, |pixel| {
            for (s, v) in sums.iter_mut().zip(pixel) {
                *s += v;
            }
        })?;
        Ok(())
    }

    /// Number of pixels accumulated
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Per-band sums
    pub fn sums(&self) -> &[f64] {
        &self.sums
    }

    /// Per-band means, 0 when nothing was sampled
    pub fn means(&self) -> Vec<f64> {
        if self.count == 0 {
            return vec![0.0; self.sums.len()];
        }
        let n = self.count as f64;
        self.sums.iter().map(|s| s / n).collect()
    }
}
