//! Color palettes and nearest-color classification

use crate::{ColorError, ColorResult};

/// Maximum number of palette entries addressable by a byte index
pub const MAX_PALETTE_SIZE: usize = 256;

/// An ordered list of RGB colors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<[u8; 3]>,
}

impl Palette {
    /// Create a palette
    ///
    /// # Errors
    ///
    /// Returns an error unless there are between 1 and 256 entries.
    pub fn new(entries: Vec<[u8; 3]>) -> ColorResult<Self> {
        if entries.is_empty() || entries.len() > MAX_PALETTE_SIZE {
            return Err(ColorError::InvalidParameters(format!(
                "palette needs 1 to {} entries, got {}",
                MAX_PALETTE_SIZE,
                entries.len()
            )));
        }
        Ok(Self { entries })
    }

    /// Number of entries, between 1 and [`MAX_PALETTE_SIZE`]
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, index: usize) -> Option<[u8; 3]> {
        self.entries.get(index).copied()
    }

    pub fn entries(&self) -> &[[u8; 3]] {
        &self.entries
    }

    /// Index of the entry closest to `(r, g, b)` in squared RGB distance
    ///
    /// Ties go to the lowest index.
    pub fn nearest(&self, r: u8, g: u8, b: u8) -> u8 {
        let mut best = i32::MAX;
        let mut index = 0usize;
        for (i, &[pr, pg, pb]) in self.entries.iter().enumerate() {
            let dr = r as i32 - pr as i32;
            let mut d = dr * dr;
            // red alone already rules this entry out
            if best <= d {
                continue;
            }
            let dg = g as i32 - pg as i32;
            let db = b as i32 - pb as i32;
            d += dg * dg + db * db;
            if d < best {
                best = d;
                index = i;
                if d == 0 {
                    break;
                }
            }
        }
        index as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_size_limits() {
        assert!(Palette::new(vec![]).is_err());
        assert!(Palette::new(vec![[0, 0, 0]; 257]).is_err());
        assert_eq!(Palette::new(vec![[9, 9, 9]]).unwrap().len(), 1);
        let p = Palette::new(vec![[1, 2, 3]; 256]).unwrap();
        assert_eq!(p.len(), 256);
        assert_eq!(p.get(255), Some([1, 2, 3]));
        assert_eq!(p.get(256), None);
    }

    #[test]
    fn test_nearest() {
        let p = Palette::new(vec![[0, 0, 0], [255, 255, 255], [255, 0, 0]]).unwrap();
        assert_eq!(p.nearest(10, 5, 5), 0);
        assert_eq!(p.nearest(200, 190, 210), 1);
        assert_eq!(p.nearest(230, 20, 40), 2);
    }

    #[test]
    fn test_nearest_ties_pick_first() {
        let p = Palette::new(vec![[100, 0, 0], [120, 0, 0], [110, 0, 0]]).unwrap();
        // 110 is exact
        assert_eq!(p.nearest(110, 0, 0), 2);
        // 105 and 115 tie between neighbors
        let q = Palette::new(vec![[100, 0, 0], [110, 0, 0]]).unwrap();
        assert_eq!(q.nearest(105, 0, 0), 0);
        let dup = Palette::new(vec![[7, 7, 7], [7, 7, 7]]).unwrap();
        assert_eq!(dup.nearest(7, 7, 7), 0);
    }
}
