//! Area-operator neighborhood contract
//!
//! An area operator's destination pixel depends on a kernel footprint of
//! source pixels. [`AreaExtent`] holds the four paddings of that footprint
//! and maps between destination and source rectangles. It only computes
//! extents; border pixels are synthesized by the source (see
//! [`crate::border`]).

use crate::error::{Error, Result};
use crate::rect::Rect;

/// Left/right/top/bottom padding of a kernel footprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AreaExtent {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl AreaExtent {
    /// Create an extent from explicit paddings
    ///
    /// # Errors
    ///
    /// Returns an error if any padding is negative.
    pub fn new(left: i32, right: i32, top: i32, bottom: i32) -> Result<Self> {
        if left < 0 || right < 0 || top < 0 || bottom < 0 {
            return Err(Error::InvalidParameter(format!(
                "paddings must be non-negative: ({}, {}, {}, {})",
                left, right, top, bottom
            )));
        }
        Ok(Self {
            left,
            right,
            top,
            bottom,
        })
    }

    /// Symmetric extent for an odd square mask
    pub fn symmetric(half: i32) -> Result<Self> {
        Self::new(half, half, half, half)
    }

    /// Extent of a `width` x `height` kernel anchored at (key_x, key_y)
    ///
    /// The padding is `(key_x, width-1-key_x, key_y, height-1-key_y)`.
    ///
    /// # Errors
    ///
    /// Returns an error unless the anchor lies inside the kernel.
    pub fn from_kernel(width: i32, height: i32, key_x: i32, key_y: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        if !(0..width).contains(&key_x) || !(0..height).contains(&key_y) {
            return Err(Error::InvalidParameter(format!(
                "anchor ({}, {}) outside {}x{} kernel",
                key_x, key_y, width, height
            )));
        }
        Self::new(key_x, width - 1 - key_x, key_y, height - 1 - key_y)
    }

    /// Total horizontal padding
    #[inline]
    pub fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    /// Total vertical padding
    #[inline]
    pub fn vertical(&self) -> i32 {
        self.top + self.bottom
    }

    /// Source rectangle needed to compute `dest`
    pub fn required_source_region(&self, dest: Rect) -> Rect {
        dest.pad(self.left, self.right, self.top, self.bottom)
    }

    /// Destination rectangle computable from `source`
    ///
    /// Returns `None` when the source is no larger than the footprint's
    /// padding in either axis.
    pub fn affected_dest_region(&self, source: Rect) -> Option<Rect> {
        let dest = source.pad(-self.left, -self.right, -self.top, -self.bottom);
        if dest.is_empty() { None } else { Some(dest) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_kernel_paddings() {
        let e = AreaExtent::from_kernel(5, 3, 1, 2).unwrap();
        assert_eq!(e, AreaExtent::new(1, 3, 2, 0).unwrap());
        assert!(AreaExtent::from_kernel(3, 3, 3, 0).is_err());
        assert!(AreaExtent::from_kernel(3, 3, 0, -1).is_err());
        assert!(AreaExtent::from_kernel(0, 3, 0, 0).is_err());
    }

    #[test]
    fn test_required_source_region_sizes() {
        let e = AreaExtent::from_kernel(7, 4, 2, 1).unwrap();
        for dest in [Rect::new_unchecked(0, 0, 1, 1), Rect::new_unchecked(-3, 8, 17, 5)] {
            let src = e.required_source_region(dest);
            assert_eq!(src.width, dest.width + e.left + e.right);
            assert_eq!(src.height, dest.height + e.top + e.bottom);
            assert_eq!(src.x, dest.x - e.left);
            assert_eq!(src.y, dest.y - e.top);
            assert_eq!(e.affected_dest_region(src), Some(dest));
        }
    }

    #[test]
    fn test_affected_dest_region_too_small() {
        let e = AreaExtent::symmetric(2).unwrap();
        assert_eq!(e.affected_dest_region(Rect::sized(4, 10)), None);
        assert_eq!(
            e.affected_dest_region(Rect::sized(5, 10)),
            Some(Rect::new_unchecked(2, 2, 1, 6))
        );
    }
}
