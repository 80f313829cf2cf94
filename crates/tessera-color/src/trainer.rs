//! Palette training
//!
//! A [`PaletteTrainer`] derives a palette from the pixels a [`SamplingGrid`]
//! selects. [`FixedPalette`] returns a preset palette; [`MedianCutTrainer`]
//! splits the sampled color cloud into boxes and averages each box.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::debug;
use tessera_core::{ElementType, RegionSource, materialize};
use tessera_stats::SamplingGrid;

use crate::palette::{MAX_PALETTE_SIZE, Palette};
use crate::{ColorError, ColorResult};

/// Strategy that produces a palette from a source image
pub trait PaletteTrainer {
    fn train(&self, source: &dyn RegionSource, grid: &SamplingGrid) -> ColorResult<Palette>;
}

/// A trainer that ignores the image and returns a preset palette
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedPalette(pub Palette);

impl PaletteTrainer for FixedPalette {
    fn train(&self, _source: &dyn RegionSource, _grid: &SamplingGrid) -> ColorResult<Palette> {
        Ok(self.0.clone())
    }
}

/// Options for median cut training
#[derive(Debug, Clone)]
pub struct MedianCutOptions {
    /// Maximum number of colors in the output palette
    pub max_colors: u32,
    /// Minimum number of pixels in a box before it can be split
    pub min_box_pixels: u32,
}

impl Default for MedianCutOptions {
    fn default() -> Self {
        Self {
            max_colors: 256,
            min_box_pixels: 1,
        }
    }
}

/// Median cut palette trainer
#[derive(Debug, Clone, Default)]
pub struct MedianCutTrainer {
    options: MedianCutOptions,
}

impl MedianCutTrainer {
    /// Create a trainer
    ///
    /// # Errors
    ///
    /// Returns an error unless `max_colors` is between 1 and 256.
    pub fn new(options: MedianCutOptions) -> ColorResult<Self> {
        if options.max_colors == 0 || options.max_colors as usize > MAX_PALETTE_SIZE {
            return Err(ColorError::InvalidParameters(format!(
                "max_colors must be between 1 and {}, got {}",
                MAX_PALETTE_SIZE, options.max_colors
            )));
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> &MedianCutOptions {
        &self.options
    }

    /// Build a palette from a list of colors
    pub fn palette_from_pixels(&self, pixels: &[[u8; 3]]) -> ColorResult<Palette> {
        if pixels.is_empty() {
            return Err(ColorError::EmptyImage);
        }
        let max_colors = self.options.max_colors as usize;
        let min_split = (self.options.min_box_pixels as usize).max(2);

        let mut heap = BinaryHeap::new();
        heap.push(ColorBox::from_pixels(pixels, (0..pixels.len()).collect()));
        let mut done = Vec::new();

        while heap.len() + done.len() < max_colors {
            let Some(color_box) = heap.pop() else {
                break;
            };
            if color_box.indices.len() < min_split {
                done.push(color_box);
                continue;
            }
            match color_box.split(pixels) {
                Ok((a, b)) => {
                    heap.push(a);
                    heap.push(b);
                }
                Err(unsplit) => done.push(unsplit),
            }
        }

        let mut boxes = heap.into_sorted_vec();
        boxes.reverse();
        boxes.extend(done);
        let entries: Vec<[u8; 3]> = boxes.iter().map(|b| b.average_color(pixels)).collect();
        debug!(
            "MedianCutTrainer: {} pixels, {} colors requested, {} produced",
            pixels.len(),
            max_colors,
            entries.len()
        );
        Palette::new(entries)
    }
}

impl PaletteTrainer for MedianCutTrainer {
    fn train(&self, source: &dyn RegionSource, grid: &SamplingGrid) -> ColorResult<Palette> {
        let pixels = sample_pixels(source, grid)?;
        self.palette_from_pixels(&pixels)
    }
}

/// Collect the RGB pixels of a 3-band byte source selected by `grid`
pub fn sample_pixels(source: &dyn RegionSource, grid: &SamplingGrid) -> ColorResult<Vec<[u8; 3]>> {
    check_rgb(source)?;
    let Some(rect) = grid.sampled_rect(source.bounds()) else {
        return Err(ColorError::EmptyImage);
    };
    let region = source.get_data(rect)?;
    let buffer = materialize::<u8>(&region, rect, false)?;
    let mut pixels = Vec::with_capacity(grid.sample_count(rect) as usize);
    grid.for_each(rect, |x, y| {
        pixels.push([buffer.get(x, y, 0), buffer.get(x, y, 1), buffer.get(x, y, 2)]);
    });
    Ok(pixels)
}

pub(crate) fn check_rgb<S: RegionSource + ?Sized>(source: &S) -> ColorResult<()> {
    if source.element_type() != ElementType::Byte {
        return Err(ColorError::UnsupportedType {
            expected: "8-bit samples",
            actual: format!("{:?}", source.element_type()),
        });
    }
    if source.bands() != 3 {
        return Err(ColorError::BandMismatch {
            expected: 3,
            actual: source.bands(),
        });
    }
    Ok(())
}

/// A box in RGB color space containing pixel indices
struct ColorBox {
    indices: Vec<usize>,
    min: [u8; 3],
    max: [u8; 3],
}

impl ColorBox {
    fn from_pixels(pixels: &[[u8; 3]], indices: Vec<usize>) -> Self {
        let mut min = [255u8; 3];
        let mut max = [0u8; 3];
        for &idx in &indices {
            for c in 0..3 {
                min[c] = min[c].min(pixels[idx][c]);
                max[c] = max[c].max(pixels[idx][c]);
            }
        }
        Self { indices, min, max }
    }

    fn range(&self, channel: usize) -> u8 {
        self.max[channel].saturating_sub(self.min[channel])
    }

    fn volume(&self) -> u64 {
        (0..3).map(|c| self.range(c) as u64 + 1).product()
    }

    fn priority(&self) -> u64 {
        self.indices.len() as u64 * self.volume()
    }

    /// Split at the median of the widest channel
    fn split(mut self, pixels: &[[u8; 3]]) -> Result<(ColorBox, ColorBox), ColorBox> {
        let channel = if self.range(0) >= self.range(1) && self.range(0) >= self.range(2) {
            0
        } else if self.range(1) >= self.range(2) {
            1
        } else {
            2
        };
        // a single color cannot be divided
        if self.indices.len() < 2 || self.range(channel) == 0 {
            return Err(self);
        }

        self.indices.sort_by_key(|&idx| pixels[idx][channel]);
        // Cut between distinct values so equal colors stay in one box
        let median = pixels[self.indices[self.indices.len() / 2]][channel];
        let mut cut = self.indices.partition_point(|&idx| pixels[idx][channel] < median);
        if cut == 0 {
            cut = self.indices.partition_point(|&idx| pixels[idx][channel] <= median);
        }
        let upper = self.indices.split_off(cut);
        Ok((
            ColorBox::from_pixels(pixels, self.indices),
            ColorBox::from_pixels(pixels, upper),
        ))
    }

    fn average_color(&self, pixels: &[[u8; 3]]) -> [u8; 3] {
        if self.indices.is_empty() {
            return [0, 0, 0];
        }
        let mut sum = [0u64; 3];
        for &idx in &self.indices {
            for c in 0..3 {
                sum[c] += pixels[idx][c] as u64;
            }
        }
        let count = self.indices.len() as u64;
        sum.map(|s| (s / count) as u8)
    }
}

impl Eq for ColorBox {}

impl PartialEq for ColorBox {
    fn eq(&self, other: &Self) -> bool {
        self.priority() == other.priority()
    }
}

impl Ord for ColorBox {
    fn cmp(&self, other: &Self) -> Ordering {
        // Larger, more populated boxes are split first
        self.priority().cmp(&other.priority())
    }
}

impl PartialOrd for ColorBox {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_validated() {
        assert!(MedianCutTrainer::new(MedianCutOptions { max_colors: 0, min_box_pixels: 1 }).is_err());
        assert!(MedianCutTrainer::new(MedianCutOptions { max_colors: 257, min_box_pixels: 1 }).is_err());
        assert!(MedianCutTrainer::new(MedianCutOptions::default()).is_ok());
    }

    #[test]
    fn test_two_clusters() {
        let mut pixels = vec![[10, 10, 10]; 20];
        pixels.extend(vec![[200, 50, 30]; 20]);
        let trainer = MedianCutTrainer::new(MedianCutOptions {
            max_colors: 2,
            min_box_pixels: 1,
        })
        .unwrap();
        let palette = trainer.palette_from_pixels(&pixels).unwrap();
        assert_eq!(palette.len(), 2);
        assert!(palette.entries().contains(&[10, 10, 10]));
        assert!(palette.entries().contains(&[200, 50, 30]));
    }

    #[test]
    fn test_fewer_colors_than_requested() {
        let pixels = vec![[1, 2, 3], [1, 2, 3], [9, 9, 9]];
        let palette = MedianCutTrainer::default().palette_from_pixels(&pixels).unwrap();
        assert_eq!(palette.len(), 2);
    }

    #[test]
    fn test_single_box_is_average() {
        let pixels = vec![[0, 0, 0], [100, 50, 20]];
        let trainer = MedianCutTrainer::new(MedianCutOptions {
            max_colors: 1,
            min_box_pixels: 1,
        })
        .unwrap();
        let palette = trainer.palette_from_pixels(&pixels).unwrap();
        assert_eq!(palette.entries(), &[[50, 25, 10]]);
        assert!(matches!(trainer.palette_from_pixels(&[]), Err(ColorError::EmptyImage)));
    }
}
