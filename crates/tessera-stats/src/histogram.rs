//! Per-band histograms
//!
//! A band with `bins` bins over `[low, high)` has bin width
//! `(high - low) / bins`. Each sample lands in bin
//! `floor((v - low) / width)`, clamped to `[0, bins - 1]`, so values below
//! `low` count in the first bin and values at or above `high` in the last.
//!
//! Derived quantities use the low edge of each bin as its value.

use tessera_core::PixelRegion;

use crate::sampling::{SamplingGrid, scan};
use crate::{StatsError, StatsResult};

/// Bin layout of a histogram, one entry per band
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSpec {
    bins: Vec<usize>,
    low: Vec<f64>,
    high: Vec<f64>,
}

impl Default for HistogramSpec {
    /// One band of 256 unit bins, for byte data
    fn default() -> Self {
        Self {
            bins: vec![256],
            low: vec![0.0],
            high: vec![256.0],
        }
    }
}

impl HistogramSpec {
    /// Create a per-band bin layout
    ///
    /// # Errors
    ///
    /// Returns an error if the lists differ in length or are empty, a band
    /// has no bins, or `high <= low` for a band.
    pub fn new(bins: Vec<usize>, low: Vec<f64>, high: Vec<f64>) -> StatsResult<Self> {
        if bins.is_empty() || bins.len() != low.len() || bins.len() != high.len() {
            return Err(StatsError::InvalidParameters(format!(
                "histogram needs one bins/low/high entry per band, got {}/{}/{}",
                bins.len(),
                low.len(),
                high.len()
            )));
        }
        for band in 0..bins.len() {
            if bins[band] == 0 {
                return Err(StatsError::InvalidParameters(format!(
                    "band {} has no bins",
                    band
                )));
            }
            if !(high[band] > low[band]) {
                return Err(StatsError::InvalidParameters(format!(
                    "band {}: high {} must exceed low {}",
                    band, high[band], low[band]
                )));
            }
        }
        Ok(Self { bins, low, high })
    }

    /// The same layout for every band
    pub fn uniform(bands: usize, bins: usize, low: f64, high: f64) -> StatsResult<Self> {
        Self::new(vec![bins; bands], vec![low; bands], vec![high; bands])
    }

    pub fn bands(&self) -> usize {
        self.bins.len()
    }

    pub fn bins(&self, band: usize) -> usize {
        self.bins[band]
    }

    pub fn low(&self, band: usize) -> f64 {
        self.low[band]
    }

    pub fn high(&self, band: usize) -> f64 {
        self.high[band]
    }

    pub fn bin_width(&self, band: usize) -> f64 {
        (self.high[band] - self.low[band]) / self.bins[band] as f64
    }

    /// Bin index of `v` in `band`
    #[inline]
    pub fn bin_of(&self, band: usize, v: f64) -> usize {
        let last = self.bins[band] - 1;
        let i = ((v - self.low[band]) / self.bin_width(band)).floor();
        if i.is_nan() || i < 0.0 {
            0
        } else if i >= last as f64 {
            last
        } else {
            i as usize
        }
    }
}

/// Running bin counts
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    spec: HistogramSpec,
    counts: Vec<Vec<u64>>,
}

impl Histogram {
    pub fn new(spec: HistogramSpec) -> Self {
        let counts = (0..spec.bands()).map(|b| vec![0; spec.bins(b)]).collect();
        Self { spec, counts }
    }

    pub fn spec(&self) -> &HistogramSpec {
        &self.spec
    }

    /// Count the sampled pixels of `region`
    ///
    /// Counts are never reset; a region the ROI misses is a no-op.
    pub fn accumulate(&mut self, region: &PixelRegion, grid: &SamplingGrid) -> StatsResult<()> {
        if region.bands() != self.spec.bands() {
            return Err(StatsError::BandMismatch {
                expected: self.spec.bands(),
                actual: region.bands(),
            });
        }
        let (spec, counts) = (&self.spec, &mut self.counts);
        scan(region, grid, |pixel| {
            for (band, &v) in pixel.iter().enumerate() {
                counts[band][spec.bin_of(band, v)] += 1;
            }
        })?;
        Ok(())
    }

    /// Bin counts of `band`
    pub fn bins(&self, band: usize) -> &[u64] {
        &self.counts[band]
    }

    /// Low edge of bin `i` in `band`
    pub fn bin_low_value(&self, band: usize, i: usize) -> f64 {
        self.spec.low(band) + i as f64 * self.spec.bin_width(band)
    }

    /// Total count of every band
    pub fn totals(&self) -> Vec<u64> {
        (0..self.spec.bands()).map(|b| self.total(b)).collect()
    }

    pub fn total(&self, band: usize) -> u64 {
        self.counts[band].iter().sum()
    }

    /// Count of bins `lo..=hi` in `band`
    pub fn sub_total(&self, band: usize, lo: usize, hi: usize) -> StatsResult<u64> {
        let bins = &self.counts[band];
        if lo > hi || hi >= bins.len() {
            return Err(StatsError::InvalidParameters(format!(
                "bin range {}..={} outside 0..{}",
                lo,
                hi,
                bins.len()
            )));
        }
        Ok(bins[lo..=hi].iter().sum())
    }

    /// Probability and value of each bin of `band`
    fn distribution(&self, band: usize) -> impl Iterator<Item = (f64, f64)> + '_ {
        let total = self.total(band).max(1) as f64;
        self.counts[band]
            .iter()
            .enumerate()
            .map(move |(i, &c)| (c as f64 / total, self.bin_low_value(band, i)))
    }

    fn band_mean(&self, band: usize) -> f64 {
        self.distribution(band).map(|(p, v)| p * v).sum()
    }

    /// Mean of every band
    pub fn mean(&self) -> Vec<f64> {
        (0..self.spec.bands()).map(|b| self.band_mean(b)).collect()
    }

    /// `n`-th moment of `band`, about the mean when `central`
    pub fn moment(&self, band: usize, n: i32, central: bool) -> StatsResult<f64> {
        if n < 1 {
            return Err(StatsError::InvalidParameters(format!(
                "moment order must be at least 1, got {}",
                n
            )));
        }
        let center = if central { self.band_mean(band) } else { 0.0 };
        Ok(self
            .distribution(band)
            .map(|(p, v)| p * (v - center).powi(n))
            .sum())
    }

    /// Standard deviation of every band
    pub fn standard_deviation(&self) -> Vec<f64> {
        (0..self.spec.bands())
            .map(|b| self.moment(b, 2, true).unwrap_or(0.0).max(0.0).sqrt())
            .collect()
    }

    /// Base-2 entropy of every band
    pub fn entropy(&self) -> Vec<f64> {
        (0..self.spec.bands())
            .map(|b| {
                -self
                    .distribution(b)
                    .filter(|&(p, _)| p > 0.0)
                    .map(|(p, _)| p * p.log2())
                    .sum::<f64>()
            })
            .collect()
    }

    /// Value below which a fraction `p` of each band's samples fall
    ///
    /// The threshold is the low edge of the first bin at which the
    /// cumulative fraction reaches `p`.
    pub fn p_tile_threshold(&self, p: f64) -> StatsResult<Vec<f64>> {
        if !(p > 0.0 && p < 1.0) {
            return Err(StatsError::InvalidParameters(format!(
                "p-tile fraction must be in (0, 1), got {}",
                p
            )));
        }
        Ok((0..self.spec.bands())
            .map(|band| {
                let mut cumulative = 0.0;
                for (i, (q, _)) in self.distribution(band).enumerate() {
                    cumulative += q;
                    if cumulative >= p {
                        return self.bin_low_value(band, i);
                    }
                }
                self.bin_low_value(band, self.spec.bins(band) - 1)
            })
            .collect())
    }

    /// Otsu threshold of every band
    ///
    /// Picks the split maximizing the between-class variance
    /// `w0 * w1 * (mu0 - mu1)^2`. The threshold is the low edge of the first
    /// bin of the upper class; on a plateau of equal variances it is the
    /// middle of the plateau.
    pub fn max_variance_threshold(&self) -> Vec<f64> {
        (0..self.spec.bands())
            .map(|band| {
                let mean = self.band_mean(band);
                let (mut w0, mut sum0) = (0.0, 0.0);
                let mut best = f64::NEG_INFINITY;
                let (mut best_t, mut run) = (0usize, 0usize);
                let bins = self.spec.bins(band);
                for (t, (p, v)) in self.distribution(band).enumerate().take(bins - 1) {
                    w0 += p;
                    sum0 += p * v;
                    let w1 = 1.0 - w0;
                    if w0 <= 0.0 || w1 <= 0.0 {
                        continue;
                    }
                    let mu0 = sum0 / w0;
                    let mu1 = (mean - sum0) / w1;
                    let between = w0 * w1 * (mu0 - mu1) * (mu0 - mu1);
                    if between > best {
                        best = between;
                        best_t = t;
                        run = 0;
                    } else if between == best {
                        run += 1;
                    }
                }
                self.bin_low_value(band, best_t + 1 + run / 2)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_validation() {
        assert!(HistogramSpec::new(vec![4], vec![0.0], vec![0.0]).is_err());
        assert!(HistogramSpec::new(vec![0], vec![0.0], vec![1.0]).is_err());
        assert!(HistogramSpec::new(vec![4, 4], vec![0.0], vec![1.0]).is_err());
        let s = HistogramSpec::uniform(2, 4, -2.0, 2.0).unwrap();
        assert_eq!(s.bin_width(1), 1.0);
    }

    #[test]
    fn test_bin_clamping() {
        let s = HistogramSpec::uniform(1, 4, 0.0, 8.0).unwrap();
        assert_eq!(s.bin_of(0, -5.0), 0);
        assert_eq!(s.bin_of(0, 0.0), 0);
        assert_eq!(s.bin_of(0, 1.99), 0);
        assert_eq!(s.bin_of(0, 2.0), 1);
        assert_eq!(s.bin_of(0, 7.9), 3);
        assert_eq!(s.bin_of(0, 8.0), 3);
        assert_eq!(s.bin_of(0, 1e30), 3);
        assert_eq!(s.bin_of(0, f64::NAN), 0);
    }

    fn filled(counts: &[u64]) -> Histogram {
        let spec = HistogramSpec::uniform(1, counts.len(), 0.0, counts.len() as f64).unwrap();
        let mut h = Histogram::new(spec);
        h.counts[0].copy_from_slice(counts);
        h
    }

    #[test]
    fn test_moments_and_entropy() {
        let h = filled(&[1, 0, 1, 0]);
        assert_eq!(h.mean(), vec![1.0]);
        assert_eq!(h.moment(0, 2, true).unwrap(), 1.0);
        assert_eq!(h.moment(0, 2, false).unwrap(), 2.0);
        assert_eq!(h.standard_deviation(), vec![1.0]);
        assert_eq!(h.entropy(), vec![1.0]);
        assert!(h.moment(0, 0, false).is_err());
        assert_eq!(h.sub_total(0, 1, 3).unwrap(), 1);
        assert!(h.sub_total(0, 2, 4).is_err());
    }

    #[test]
    fn test_thresholds_on_bimodal() {
        let mut counts = [0u64; 10];
        counts[2] = 50;
        counts[7] = 50;
        let h = filled(&counts);
        assert_eq!(h.max_variance_threshold(), vec![5.0]);
        assert_eq!(h.p_tile_threshold(0.5).unwrap(), vec![2.0]);
        assert_eq!(h.p_tile_threshold(0.6).unwrap(), vec![7.0]);
        assert!(h.p_tile_threshold(1.0).is_err());
    }
}
