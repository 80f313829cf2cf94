//! Border extension policies
//!
//! Area operators request source rectangles that reach past the image
//! bounds. The missing pixels are synthesized here, on the source side,
//! so every operator shares the extent math while the caller picks the
//! fill policy.

use crate::error::Result;
use crate::rect::Rect;
use crate::region::{Layout, PixelRegion};
use crate::sample::ElementType;
use crate::source::RegionSource;

/// Policy for pixels outside the source bounds
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BorderExtender {
    /// Fill with zero
    #[default]
    Zero,
    /// Fill with one constant per band (the last value repeats)
    Constant(Vec<f64>),
    /// Replicate the nearest edge pixel
    Copy,
    /// Mirror about the edge, repeating the edge pixel (`2 1 0 | 0 1 2`)
    Reflect,
    /// Tile the image periodically
    Wrap,
}

impl BorderExtender {
    /// Produce `rect` from `source`, synthesizing out-of-bounds pixels
    pub fn extend<S: RegionSource + ?Sized>(&self, source: &S, rect: Rect) -> Result<PixelRegion> {
        let bounds = source.bounds();
        if bounds.contains_rect(&rect) {
            return source.get_data(rect);
        }
        let bands = source.bands();
        let element = source.element_type();
        let layout = if element == ElementType::Bit {
            Layout::packed(rect.width)
        } else {
            Layout::Banded
        };
        let mut out = PixelRegion::new(rect, bands, element, layout)?;

        match self {
            BorderExtender::Zero | BorderExtender::Constant(_) => {
                if let BorderExtender::Constant(values) = self {
                    fill_constant(&mut out, values);
                }
                if let Some(inner) = rect.intersect(&bounds) {
                    let data = source.get_data(inner)?;
                    out.copy_from(&data)?;
                }
            }
            BorderExtender::Copy | BorderExtender::Reflect | BorderExtender::Wrap => {
                let xs: Vec<i32> = (rect.x..rect.right())
                    .map(|x| self.map(x, bounds.x, bounds.width))
                    .collect();
                let ys: Vec<i32> = (rect.y..rect.bottom())
                    .map(|y| self.map(y, bounds.y, bounds.height))
                    .collect();
                let (Some(&x0), Some(&x1)) = (xs.iter().min(), xs.iter().max()) else {
                    return Ok(out);
                };
                let (Some(&y0), Some(&y1)) = (ys.iter().min(), ys.iter().max()) else {
                    return Ok(out);
                };
                let data = source.get_data(Rect::new_unchecked(x0, y0, x1 - x0 + 1, y1 - y0 + 1))?;
                for (row, &sy) in ys.iter().enumerate() {
                    for (col, &sx) in xs.iter().enumerate() {
                        for b in 0..bands {
                            let v = data.fetch(sx, sy, b);
                            out.put(rect.x + col as i32, rect.y + row as i32, b, v);
                        }
                    }
                }
            }
        }
        Ok(out)
    }

    /// Map a coordinate onto `[origin, origin + len)` per the policy
    fn map(&self, p: i32, origin: i32, len: i32) -> i32 {
        let t = p - origin;
        let mapped = match self {
            BorderExtender::Copy => t.clamp(0, len - 1),
            BorderExtender::Reflect => {
                let m = t.rem_euclid(2 * len);
                if m >= len { 2 * len - 1 - m } else { m }
            }
            BorderExtender::Wrap => t.rem_euclid(len),
            BorderExtender::Zero | BorderExtender::Constant(_) => t,
        };
        origin + mapped
    }
}

fn fill_constant(out: &mut PixelRegion, values: &[f64]) {
    let Some(&last) = values.last() else {
        return;
    };
    let rect = out.rect();
    for b in 0..out.bands() {
        let v = values.get(b).copied().unwrap_or(last);
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                out.put(x, y, b, v);
            }
        }
    }
}

/// A source whose requests may reach past its bounds
///
/// In-bounds requests are forwarded unchanged; the rest are filled by the
/// extender. [`RegionSource::bounds`] still reports the wrapped source's
/// bounds so operators can validate kernel sizes against the real image.
#[derive(Debug, Clone)]
pub struct Extended<S> {
    source: S,
    extender: BorderExtender,
}

impl<S: RegionSource> Extended<S> {
    pub fn new(source: S, extender: BorderExtender) -> Self {
        Self { source, extender }
    }

    /// The active policy
    pub fn extender(&self) -> &BorderExtender {
        &self.extender
    }

    /// The wrapped source
    pub fn inner(&self) -> &S {
        &self.source
    }
}

impl<S: RegionSource> RegionSource for Extended<S> {
    fn bounds(&self) -> Rect {
        self.source.bounds()
    }

    fn bands(&self) -> usize {
        self.source.bands()
    }

    fn element_type(&self) -> ElementType {
        self.source.element_type()
    }

    fn get_data(&self, rect: Rect) -> Result<PixelRegion> {
        self.extender.extend(&self.source, rect)
    }
}
