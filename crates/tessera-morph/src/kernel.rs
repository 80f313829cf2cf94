//! Boolean kernels for binary morphology
//!
//! A kernel is a `width` x `height` grid of taps with an anchor (key)
//! element. For the packed engine the taps are repacked into 32-bit words,
//! `ceil(width / 32)` per kernel row, right-aligned so that the last column
//! lands on bit 0 of the row's last word.

use tessera_core::AreaExtent;

use crate::{MorphError, MorphResult};

/// Boolean structuring kernel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryKernel {
    width: u32,
    height: u32,
    key_x: u32,
    key_y: u32,
    taps: Vec<bool>,
}

impl BinaryKernel {
    /// Create a kernel from row-major taps
    ///
    /// # Errors
    ///
    /// Returns an error if the size is zero, the tap count is wrong or the
    /// anchor lies outside the kernel.
    pub fn new(width: u32, height: u32, key_x: u32, key_y: u32, taps: Vec<bool>) -> MorphResult<Self> {
        if width == 0 || height == 0 {
            return Err(MorphError::InvalidKernel(format!(
                "kernel dimensions must be positive: {}x{}",
                width, height
            )));
        }
        if taps.len() != (width * height) as usize {
            return Err(MorphError::InvalidKernel(format!(
                "{}x{} kernel needs {} taps, got {}",
                width,
                height,
                width * height,
                taps.len()
            )));
        }
        if key_x >= width || key_y >= height {
            return Err(MorphError::InvalidKernel(format!(
                "anchor ({}, {}) outside {}x{} kernel",
                key_x, key_y, width, height
            )));
        }
        Ok(Self {
            width,
            height,
            key_x,
            key_y,
            taps,
        })
    }

    /// Create a kernel from ASCII rows
    ///
    /// `x`, `X` and `1` are hits; `.`, `o` and `0` are not.
    pub fn from_rows(rows: &[&str], key_x: u32, key_y: u32) -> MorphResult<Self> {
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut taps = Vec::with_capacity(width * rows.len());
        for row in rows {
            if row.chars().count() != width {
                return Err(MorphError::InvalidKernel(format!(
                    "ragged kernel row {:?}",
                    row
                )));
            }
            for c in row.chars() {
                taps.push(match c {
                    'x' | 'X' | '1' => true,
                    '.' | 'o' | '0' => false,
                    other => {
                        return Err(MorphError::InvalidKernel(format!(
                            "unexpected character {:?}",
                            other
                        )));
                    }
                });
            }
        }
        Self::new(width as u32, rows.len() as u32, key_x, key_y, taps)
    }

    /// Solid rectangle anchored at its center
    pub fn brick(width: u32, height: u32) -> MorphResult<Self> {
        Self::new(
            width,
            height,
            width / 2,
            height / 2,
            vec![true; (width * height) as usize],
        )
    }

    /// Plus-shaped kernel of odd `size`, anchored at its center
    pub fn cross(size: u32) -> MorphResult<Self> {
        if size % 2 == 0 {
            return Err(MorphError::InvalidKernel(format!(
                "cross size must be odd, got {}",
                size
            )));
        }
        let c = size / 2;
        let taps = (0..size * size)
            .map(|i| i % size == c || i / size == c)
            .collect();
        Self::new(size, size, c, c, taps)
    }

    /// The 1x1 identity kernel
    pub fn single() -> Self {
        Self {
            width: 1,
            height: 1,
            key_x: 0,
            key_y: 0,
            taps: vec![true],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn key_x(&self) -> u32 {
        self.key_x
    }

    #[inline]
    pub fn key_y(&self) -> u32 {
        self.key_y
    }

    /// Get the tap at (x, y)
    pub fn get(&self, x: u32, y: u32) -> Option<bool> {
        if x < self.width && y < self.height {
            Some(self.taps[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Number of hit taps
    pub fn hit_count(&self) -> usize {
        self.taps.iter().filter(|&&t| t).count()
    }

    /// Kernel rotated by 180 degrees, anchor included
    pub fn rotated_180(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            key_x: self.width - 1 - self.key_x,
            key_y: self.height - 1 - self.key_y,
            taps: self.taps.iter().rev().copied().collect(),
        }
    }

    /// Neighborhood paddings implied by size and anchor
    pub fn extent(&self) -> MorphResult<AreaExtent> {
        Ok(AreaExtent::from_kernel(
            self.width as i32,
            self.height as i32,
            self.key_x as i32,
            self.key_y as i32,
        )?)
    }

    /// Repack the taps into 32-bit words for the sliding-window engine
    pub fn pack(&self) -> PackedKernel {
        let width = self.width as usize;
        let height = self.height as usize;
        let words_per_row = width.div_ceil(32);
        let mut words = vec![0u32; words_per_row * height];
        for y in 0..height {
            let row = &mut words[y * words_per_row..(y + 1) * words_per_row];
            for x in 0..width {
                if self.taps[y * width + x] {
                    let bit = width - 1 - x;
                    row[words_per_row - 1 - bit / 32] |= 1 << (bit % 32);
                }
            }
        }
        PackedKernel {
            width,
            height,
            words_per_row,
            words,
        }
    }
}

/// Kernel taps packed right-aligned into 32-bit words per row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedKernel {
    width: usize,
    height: usize,
    words_per_row: usize,
    words: Vec<u32>,
}

impl PackedKernel {
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Words per kernel row, `ceil(width / 32)`
    #[inline]
    pub fn words_per_row(&self) -> usize {
        self.words_per_row
    }

    /// All packed words, row after row
    #[inline]
    pub fn words(&self) -> &[u32] {
        &self.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_and_anchor_checks() {
        let k = BinaryKernel::from_rows(&["x.x", ".x."], 1, 1).unwrap();
        assert_eq!(k.width(), 3);
        assert_eq!(k.height(), 2);
        assert_eq!(k.get(2, 0), Some(true));
        assert_eq!(k.get(0, 1), Some(false));
        assert_eq!(k.hit_count(), 3);
        assert!(BinaryKernel::from_rows(&["xx"], 2, 0).is_err());
        assert!(BinaryKernel::from_rows(&["xx", "x"], 0, 0).is_err());
        assert!(BinaryKernel::new(2, 2, 0, 0, vec![true; 3]).is_err());
    }

    #[test]
    fn test_rotation() {
        let k = BinaryKernel::from_rows(&["xx.", "..."], 0, 0).unwrap();
        let r = k.rotated_180();
        assert_eq!(r.key_x(), 2);
        assert_eq!(r.key_y(), 1);
        assert_eq!(r.get(2, 1), Some(true));
        assert_eq!(r.get(1, 1), Some(true));
        assert_eq!(r.get(0, 1), Some(false));
        assert_eq!(r.rotated_180(), k);
    }

    #[test]
    fn test_cross_shape() {
        let k = BinaryKernel::cross(3).unwrap();
        assert_eq!(k.hit_count(), 5);
        assert_eq!(k.get(0, 0), Some(false));
        assert_eq!(k.get(1, 0), Some(true));
        assert!(BinaryKernel::cross(4).is_err());
    }

    #[test]
    fn test_pack_right_aligned() {
        let k = BinaryKernel::from_rows(&["x..x"], 0, 0).unwrap();
        let p = k.pack();
        assert_eq!(p.words_per_row(), 1);
        assert_eq!(p.words(), &[0b1001]);

        // 33 columns spill into a second word; col 0 is bit 0 of word 0
        let mut taps = vec![false; 33];
        taps[0] = true;
        taps[32] = true;
        let wide = BinaryKernel::new(33, 1, 16, 0, taps).unwrap().pack();
        assert_eq!(wide.words_per_row(), 2);
        assert_eq!(wide.words(), &[1, 1]);
    }

    #[test]
    fn test_extent() {
        let e = BinaryKernel::brick(5, 3).unwrap().extent().unwrap();
        assert_eq!((e.left, e.right, e.top, e.bottom), (2, 2, 1, 1));
    }
}
