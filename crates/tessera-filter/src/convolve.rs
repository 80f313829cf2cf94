//! Kernel convolution
//!
//! Each destination sample is the kernel-weighted sum of the source
//! neighborhood around it, aligned on the key element:
//!
//! ```text
//! dest(x, y) = sum k(i, j) * src(x + i - key_x, y + j - key_y)
//! ```
//!
//! Kernels with horizontal and vertical factors run as a horizontal pass
//! into a ring buffer of kernel-height rows followed by a vertical pass.
//! Other kernels run as a direct 2D pass. Sums accumulate in `f32`, or in
//! `f64` for Double sources, and saturate into the source type.

use std::ops::{AddAssign, Mul};

use log::debug;
use tessera_core::{
    AreaExtent, ElementType, ImageLayout, PixelRegion, Rect, RegionSource, Sample, TileOp,
    WorkingBuffer, clamp_byte, materialize, materialize_mut,
};

use crate::kernel::Kernel;
use crate::{FilterError, FilterResult};

/// Convolution of a source by a [`Kernel`]
///
/// Tiles at the image edge request source pixels outside the bounds, so the
/// source is normally wrapped in a [`tessera_core::Extended`].
pub struct Convolve<S> {
    source: S,
    kernel: Kernel,
    extent: AreaExtent,
    layout: ImageLayout,
}

impl<S: RegionSource> Convolve<S> {
    /// Create a convolution operator
    ///
    /// # Errors
    ///
    /// Fails for 1-bit sources, or when the layout's bands or element type
    /// differ from the source's.
    pub fn new(source: S, kernel: Kernel, layout: ImageLayout) -> FilterResult<Self> {
        let element = source.element_type();
        if element == ElementType::Bit {
            return Err(FilterError::UnsupportedType {
                expected: "non-binary samples",
                actual: element,
            });
        }
        check_layout(&source, &layout)?;
        let extent = kernel.extent()?;
        debug!(
            "Convolve::new kernel {}x{} key ({}, {}) separable {} on {:?}",
            kernel.width(),
            kernel.height(),
            kernel.key_x(),
            kernel.key_y(),
            kernel.is_separable(),
            element
        );
        Ok(Self {
            source,
            kernel,
            extent,
            layout,
        })
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// Neighborhood contract of the kernel
    pub fn extent(&self) -> AreaExtent {
        self.extent
    }

    /// Source rectangle needed to compute `dest`
    pub fn required_source_region(&self, dest: Rect) -> Rect {
        self.extent.required_source_region(dest)
    }

    fn run<T: Sample, A: Accum>(&self, src: &PixelRegion, out: &mut PixelRegion) -> FilterResult<()> {
        let input = materialize::<T>(src, src.rect(), false)?;
        let mut output = materialize_mut::<T>(out, out.rect(), false)?;
        for band in 0..input.bands() {
            match self.kernel.factors() {
                Some((h, v)) => separable_pass::<T, A>(&input, &mut output, band, h, v)?,
                None => direct_pass::<T, A>(&input, &mut output, band, &self.kernel)?,
            }
        }
        output.flush()?;
        Ok(())
    }
}

impl<S: RegionSource> TileOp for Convolve<S> {
    type Error = FilterError;

    fn layout(&self) -> &ImageLayout {
        &self.layout
    }

    fn compute_tile(&self, dest: Rect) -> FilterResult<PixelRegion> {
        let src = self
            .source
            .get_data(self.extent.required_source_region(dest))?;
        let mut out = PixelRegion::new(dest, src.bands(), src.element_type(), self.layout.storage())?;
        match src.element_type() {
            ElementType::Byte => self.run::<u8, f32>(&src, &mut out)?,
            ElementType::UShort => self.run::<u16, f32>(&src, &mut out)?,
            ElementType::Short => self.run::<i16, f32>(&src, &mut out)?,
            ElementType::Int => self.run::<i32, f32>(&src, &mut out)?,
            ElementType::Float => self.run::<f32, f32>(&src, &mut out)?,
            ElementType::Double => self.run::<f64, f64>(&src, &mut out)?,
            ElementType::Bit => {
                return Err(FilterError::UnsupportedType {
                    expected: "non-binary samples",
                    actual: ElementType::Bit,
                });
            }
        }
        Ok(out)
    }
}

pub(crate) fn check_layout<S: RegionSource + ?Sized>(source: &S, layout: &ImageLayout) -> FilterResult<()> {
    if layout.bands() != source.bands() || layout.element_type() != source.element_type() {
        return Err(FilterError::InvalidParameters(format!(
            "layout {} band(s) of {:?} does not match source {} band(s) of {:?}",
            layout.bands(),
            layout.element_type(),
            source.bands(),
            source.element_type()
        )));
    }
    Ok(())
}

/// Accumulator used by the convolution loops
pub(crate) trait Accum: Copy + Default + AddAssign + Mul<Output = Self> {
    fn of<T: Sample>(v: T) -> Self;
    fn weight(w: f32) -> Self;
    fn value(self) -> f64;
}

impl Accum for f32 {
    #[inline]
    fn of<T: Sample>(v: T) -> Self {
        v.to_f64() as f32
    }
    #[inline]
    fn weight(w: f32) -> Self {
        w
    }
    #[inline]
    fn value(self) -> f64 {
        self as f64
    }
}

impl Accum for f64 {
    #[inline]
    fn of<T: Sample>(v: T) -> Self {
        v.to_f64()
    }
    #[inline]
    fn weight(w: f32) -> Self {
        w as f64
    }
    #[inline]
    fn value(self) -> f64 {
        self
    }
}

/// Narrow an accumulated value into the destination type
#[inline]
pub(crate) fn store<T: Sample>(v: f64) -> T {
    if T::ELEMENT == ElementType::Byte {
        T::from_i64(clamp_byte(v.round() as i32) as i64)
    } else {
        T::from_f64(v)
    }
}

fn direct_pass<T: Sample, A: Accum>(
    input: &WorkingBuffer<'_, T>,
    output: &mut WorkingBuffer<'_, T>,
    band: usize,
    kernel: &Kernel,
) -> FilterResult<()> {
    let src = input.rect();
    let dest = output.rect();
    let (kw, kh) = (kernel.width() as usize, kernel.height() as usize);
    let weights: Vec<A> = kernel.data().iter().map(|&w| A::weight(w)).collect();
    let (sp, sl) = (input.pixel_stride(), input.line_stride());
    let data = input.data(band);

    for dy in 0..dest.height {
        for dx in 0..dest.width {
            let origin = input.index(src.x + dx, src.y + dy, band);
            let mut acc = A::default();
            for j in 0..kh {
                let row = origin + j * sl;
                for i in 0..kw {
                    acc += weights[j * kw + i] * A::of(data[row + i * sp]);
                }
            }
            output.set(dest.x + dx, dest.y + dy, band, store(acc.value()))?;
        }
    }
    Ok(())
}

fn separable_pass<T: Sample, A: Accum>(
    input: &WorkingBuffer<'_, T>,
    output: &mut WorkingBuffer<'_, T>,
    band: usize,
    h: &[f32],
    v: &[f32],
) -> FilterResult<()> {
    let src = input.rect();
    let dest = output.rect();
    let dw = dest.width as usize;
    let kh = v.len();
    let hw: Vec<A> = h.iter().map(|&w| A::weight(w)).collect();
    let vw: Vec<A> = v.iter().map(|&w| A::weight(w)).collect();
    let sp = input.pixel_stride();
    let data = input.data(band);

    // ring[r % kh] holds the horizontal pass of source row r
    let mut ring = vec![A::default(); kh * dw];
    for r in 0..src.height as usize {
        let slot = &mut ring[(r % kh) * dw..(r % kh + 1) * dw];
        let row = input.index(src.x, src.y + r as i32, band);
        for (dx, out) in slot.iter_mut().enumerate() {
            let start = row + dx * sp;
            let mut acc = A::default();
            for (i, &w) in hw.iter().enumerate() {
                acc += w * A::of(data[start + i * sp]);
            }
            *out = acc;
        }
        if r + 1 < kh {
            continue;
        }
        let dy = r + 1 - kh;
        for dx in 0..dw {
            let mut acc = A::default();
            for (j, &w) in vw.iter().enumerate() {
                acc += w * ring[((dy + j) % kh) * dw + dx];
            }
            output.set(dest.x + dx as i32, dest.y + dy as i32, band, store(acc.value()))?;
        }
    }
    Ok(())
}
