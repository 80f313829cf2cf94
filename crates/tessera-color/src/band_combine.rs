//! Linear band combination
//!
//! Each destination band is an affine combination of the source bands:
//!
//! ```text
//! dest[b] = m[b][0] * src[0] + ... + m[b][n-1] * src[n-1] + m[b][n]
//! ```
//!
//! Results round and saturate into the source element type. UShort data
//! uses 16.16 fixed-point coefficients. Rows can be spread over the rayon
//! thread pool; the output is the same either way.

use log::debug;
use rayon::prelude::*;
use tessera_core::{
    ElementType, ImageLayout, Layout, PixelRegion, Rect, RegionSource, Sample, TileOp, materialize,
};

use crate::{ColorError, ColorResult};

/// One in 16.16 fixed point
const FIXED_ONE: f64 = 65536.0;
const FIXED_HALF: i64 = 1 << 15;

/// Options for [`BandCombine`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BandCombineOptions {
    /// Compute tile rows in parallel
    pub parallel: bool,
}

/// Matrix combination of source bands
pub struct BandCombine<S> {
    source: S,
    matrix: Vec<Vec<f64>>,
    options: BandCombineOptions,
    layout: ImageLayout,
}

impl<S: RegionSource> BandCombine<S> {
    /// Create a band combination with one matrix row per destination band
    ///
    /// # Errors
    ///
    /// Fails for 1-bit sources, an empty matrix, or a row whose length is not
    /// the source band count plus one.
    pub fn new(
        source: S,
        matrix: Vec<Vec<f64>>,
        options: BandCombineOptions,
        tile_width: i32,
        tile_height: i32,
    ) -> ColorResult<Self> {
        let element = source.element_type();
        if element == ElementType::Bit {
            return Err(ColorError::UnsupportedType {
                expected: "non-binary samples",
                actual: format!("{:?}", element),
            });
        }
        if matrix.is_empty() {
            return Err(ColorError::InvalidParameters(
                "band combine matrix has no rows".into(),
            ));
        }
        let width = source.bands() + 1;
        if let Some((b, row)) = matrix.iter().enumerate().find(|(_, row)| row.len() != width) {
            return Err(ColorError::InvalidParameters(format!(
                "matrix row {} has {} columns, expected {} for {} source band(s)",
                b,
                row.len(),
                width,
                source.bands()
            )));
        }
        let layout = ImageLayout::tiled(source.bounds(), tile_width, tile_height, matrix.len(), element)?;
        debug!(
            "BandCombine::new {} -> {} bands of {:?}, {} arithmetic, parallel {}",
            source.bands(),
            matrix.len(),
            element,
            if element == ElementType::UShort { "fixed-point" } else { "float" },
            options.parallel
        );
        Ok(Self {
            source,
            matrix,
            options,
            layout,
        })
    }

    pub fn matrix(&self) -> &[Vec<f64>] {
        &self.matrix
    }

    pub fn options(&self) -> BandCombineOptions {
        self.options
    }

    fn run<T: Sample>(&self, src: &PixelRegion, dest: Rect) -> ColorResult<PixelRegion> {
        let input = materialize::<T>(src, dest, false)?;
        let n = input.bands();
        let matrix = &self.matrix;
        self.fill(dest, |x, y, out: &mut [T]| {
            for (value, row) in out.iter_mut().zip(matrix) {
                let mut sum = row[n];
                for (k, &m) in row[..n].iter().enumerate() {
                    sum += m * input.get(x, y, k).to_f64();
                }
                *value = T::from_f64(sum);
            }
        })
    }

    fn run_fixed(&self, src: &PixelRegion, dest: Rect) -> ColorResult<PixelRegion> {
        let input = materialize::<u16>(src, dest, false)?;
        let n = input.bands();
        let coefficients: Vec<Vec<i64>> = self
            .matrix
            .iter()
            .map(|row| row.iter().map(|&m| to_fixed(m)).collect())
            .collect();
        self.fill(dest, |x, y, out: &mut [u16]| {
            for (value, row) in out.iter_mut().zip(&coefficients) {
                let mut acc = row[n];
                for (k, &c) in row[..n].iter().enumerate() {
                    acc += c * input.get(x, y, k) as i64;
                }
                *value = u16::from_i64((acc + FIXED_HALF) >> 16);
            }
        })
    }

    /// Build the interleaved destination, calling `pixel` once per pixel
    fn fill<T, F>(&self, dest: Rect, pixel: F) -> ColorResult<PixelRegion>
    where
        T: Sample,
        F: Fn(i32, i32, &mut [T]) + Sync,
    {
        let bands = self.matrix.len();
        let row_len = dest.width as usize * bands;
        let mut data = vec![T::default(); dest.area() * bands];
        let fill_row = |(r, row): (usize, &mut [T])| {
            let y = dest.y + r as i32;
            for (i, out) in row.chunks_mut(bands).enumerate() {
                pixel(dest.x + i as i32, y, out);
            }
        };
        if row_len > 0 {
            if self.options.parallel {
                data.par_chunks_mut(row_len).enumerate().for_each(fill_row);
            } else {
                data.chunks_mut(row_len).enumerate().for_each(fill_row);
            }
        }
        Ok(PixelRegion::from_banks(
            dest,
            bands,
            T::ELEMENT,
            Layout::Interleaved,
            vec![T::into_bank(data)],
        )?)
    }
}

impl<S: RegionSource> TileOp for BandCombine<S> {
    type Error = ColorError;

    fn layout(&self) -> &ImageLayout {
        &self.layout
    }

    fn compute_tile(&self, dest: Rect) -> ColorResult<PixelRegion> {
        let src = self.source.get_data(dest)?;
        match src.element_type() {
            ElementType::Byte => self.run::<u8>(&src, dest),
            ElementType::UShort => self.run_fixed(&src, dest),
            ElementType::Short => self.run::<i16>(&src, dest),
            ElementType::Int => self.run::<i32>(&src, dest),
            ElementType::Float => self.run::<f32>(&src, dest),
            ElementType::Double => self.run::<f64>(&src, dest),
            ElementType::Bit => Err(ColorError::UnsupportedType {
                expected: "non-binary samples",
                actual: "Bit".into(),
            }),
        }
    }
}

/// 16.16 fixed-point coefficient, rounded to nearest
#[inline]
fn to_fixed(m: f64) -> i64 {
    (m * FIXED_ONE + 0.5).floor() as i64
}
