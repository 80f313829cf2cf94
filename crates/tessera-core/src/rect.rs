//! Rect - Rectangular regions in image coordinates

use crate::error::{Error, Result};

/// A rectangle in absolute image coordinates
///
/// Small and frequently copied, so this is a plain `Copy` type. The right
/// and bottom edges are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left x coordinate
    pub x: i32,
    /// Top y coordinate
    pub y: i32,
    /// Width
    pub width: i32,
    /// Height
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is negative.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Result<Self> {
        if width < 0 || height < 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Create a rectangle without validation
    pub const fn new_unchecked(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle anchored at the origin
    pub const fn sized(width: i32, height: i32) -> Self {
        Self::new_unchecked(0, 0, width, height)
    }

    /// Get the right x coordinate (exclusive)
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Get the bottom y coordinate (exclusive)
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Number of pixels covered
    #[inline]
    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.width as usize * self.height as usize
        }
    }

    /// Check if the rectangle covers no pixels
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Check if a point is inside the rectangle
    #[inline]
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Check if this rectangle fully contains another
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Compute the intersection of two rectangles
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new_unchecked(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Compute the bounding rectangle of two rectangles
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new_unchecked(x, y, right - x, bottom - y)
    }

    /// Translate the rectangle by (dx, dy)
    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new_unchecked(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Grow the rectangle by independent margins on each side
    ///
    /// Negative margins shrink it.
    pub fn pad(&self, left: i32, right: i32, top: i32, bottom: i32) -> Rect {
        Rect::new_unchecked(
            self.x - left,
            self.y - top,
            self.width + left + right,
            self.height + top + bottom,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_negative() {
        assert!(Rect::new(0, 0, -1, 4).is_err());
        assert!(Rect::new(0, 0, 0, 0).is_ok());
    }

    #[test]
    fn test_intersect() {
        let a = Rect::new_unchecked(0, 0, 10, 10);
        let b = Rect::new_unchecked(5, 5, 10, 10);
        assert_eq!(a.intersect(&b), Some(Rect::new_unchecked(5, 5, 5, 5)));

        let c = Rect::new_unchecked(10, 0, 3, 3);
        assert_eq!(a.intersect(&c), None);
    }

    #[test]
    fn test_pad_and_contains() {
        let r = Rect::new_unchecked(2, 3, 4, 5);
        let p = r.pad(1, 2, 3, 4);
        assert_eq!(p, Rect::new_unchecked(1, 0, 7, 12));
        assert!(p.contains_rect(&r));
        assert!(!r.contains_rect(&p));
        assert_eq!(p.pad(-1, -2, -3, -4), r);
    }

    #[test]
    fn test_union_and_area() {
        let a = Rect::new_unchecked(0, 0, 2, 2);
        let b = Rect::new_unchecked(3, 1, 2, 2);
        assert_eq!(a.union(&b), Rect::new_unchecked(0, 0, 5, 3));
        assert_eq!(a.area(), 4);
        assert_eq!(Rect::new_unchecked(0, 0, 0, 9).area(), 0);
    }
}
