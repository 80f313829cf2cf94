//! Bit-packed binary erosion and dilation
//!
//! For every destination row the engine keeps a sliding window holding,
//! for each kernel row, the source bits currently under the kernel. The
//! window is packed like the kernel (see [`BinaryKernel::pack`]), so moving
//! one pixel to the right is a one-bit left shift carried across the row's
//! words plus an OR of the newly exposed source column. Each destination
//! bit then costs `height * ceil(width / 32)` word ANDs.
//!
//! - dilate: the bit is set if any window word shares a bit with the kernel
//! - erode: the bit is set only if every window word covers its kernel word

use log::debug;
use tessera_core::{
    AreaExtent, ElementType, ImageLayout, Layout, PackedBits, PackedBitsMut, PixelRegion, Rect,
    RegionSource, TileOp, packed_bits, packed_bits_mut,
};

use crate::kernel::{BinaryKernel, PackedKernel};
use crate::{MorphError, MorphResult};

/// Which binary operation to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphMode {
    Erode,
    Dilate,
}

/// Binary erode or dilate over a 1-bit source
///
/// The kernel held by the operator is already rotated by 180 degrees. The
/// [`BinaryMorph::erode`] and [`BinaryMorph::dilate`] constructors perform
/// that rotation once; [`BinaryMorph::with_rotated_kernel`] trusts the
/// caller to have done it.
pub struct BinaryMorph<S> {
    source: S,
    mode: MorphMode,
    kernel: PackedKernel,
    extent: AreaExtent,
    layout: ImageLayout,
}

impl<S: RegionSource> BinaryMorph<S> {
    /// Erode `source` by `kernel`
    pub fn erode(source: S, kernel: &BinaryKernel, layout: ImageLayout) -> MorphResult<Self> {
        Self::with_rotated_kernel(source, &kernel.rotated_180(), MorphMode::Erode, layout)
    }

    /// Dilate `source` by `kernel`
    pub fn dilate(source: S, kernel: &BinaryKernel, layout: ImageLayout) -> MorphResult<Self> {
        Self::with_rotated_kernel(source, &kernel.rotated_180(), MorphMode::Dilate, layout)
    }

    /// Build the operator from a kernel that is already rotated
    ///
    /// # Errors
    ///
    /// Fails if the source or layout is not 1-band binary, or if the kernel
    /// is larger than the source image in either axis.
    pub fn with_rotated_kernel(
        source: S,
        kernel: &BinaryKernel,
        mode: MorphMode,
        layout: ImageLayout,
    ) -> MorphResult<Self> {
        check_binary("source", source.bands(), source.element_type())?;
        check_binary("layout", layout.bands(), layout.element_type())?;

        let bounds = source.bounds();
        if kernel.width() as i32 > bounds.width || kernel.height() as i32 > bounds.height {
            return Err(MorphError::KernelTooLarge {
                kernel_width: kernel.width(),
                kernel_height: kernel.height(),
                image_width: bounds.width,
                image_height: bounds.height,
            });
        }

        let extent = kernel.extent()?;
        debug!(
            "BinaryMorph::new {:?} kernel {}x{} key ({}, {}) extent {:?}",
            mode,
            kernel.width(),
            kernel.height(),
            kernel.key_x(),
            kernel.key_y(),
            extent
        );
        Ok(Self {
            source,
            mode,
            kernel: kernel.pack(),
            extent,
            layout,
        })
    }

    /// Operation applied by this operator
    pub fn mode(&self) -> MorphMode {
        self.mode
    }

    /// Neighborhood contract of the kernel
    pub fn extent(&self) -> AreaExtent {
        self.extent
    }

    /// Source rectangle needed to compute `dest`
    pub fn required_source_region(&self, dest: Rect) -> Rect {
        self.extent.required_source_region(dest)
    }

    /// Destination rectangle affected by a change in `source`
    pub fn affected_dest_region(&self, source: Rect) -> Option<Rect> {
        self.extent.affected_dest_region(source)
    }

    /// Fill a caller-allocated packed region
    ///
    /// Only the `width` bits of each destination row are written; row
    /// padding keeps its previous contents.
    pub fn compute_into(&self, dest: &mut PixelRegion) -> MorphResult<()> {
        let dest_rect = dest.rect();
        check_binary("destination", dest.bands(), dest.element_type())?;

        let src_rect = self.extent.required_source_region(dest_rect);
        let src = self.source.get_data(src_rect)?;
        let src_bits = packed_bits(&src, src_rect)?;
        let mut dst_bits = packed_bits_mut(dest, dest_rect)?;

        match self.mode {
            MorphMode::Dilate => sweep(&self.kernel, &src_bits, &mut dst_bits, dilate_hit),
            MorphMode::Erode => sweep(&self.kernel, &src_bits, &mut dst_bits, erode_hit),
        }
        Ok(())
    }
}

impl<S: RegionSource> TileOp for BinaryMorph<S> {
    type Error = MorphError;

    fn layout(&self) -> &ImageLayout {
        &self.layout
    }

    fn compute_tile(&self, dest: Rect) -> MorphResult<PixelRegion> {
        let mut region = PixelRegion::new(dest, 1, ElementType::Bit, Layout::packed(dest.width))?;
        self.compute_into(&mut region)?;
        Ok(region)
    }
}

fn check_binary(what: &'static str, bands: usize, element: ElementType) -> MorphResult<()> {
    if bands != 1 || element != ElementType::Bit {
        return Err(MorphError::UnsupportedSource {
            expected: "1-band Bit",
            actual: format!("{} {} band(s) of {:?}", what, bands, element),
        });
    }
    Ok(())
}

#[inline]
fn dilate_hit(window: &[u32], kernel: &[u32]) -> bool {
    window.iter().zip(kernel).any(|(w, k)| w & k != 0)
}

#[inline]
fn erode_hit(window: &[u32], kernel: &[u32]) -> bool {
    window.iter().zip(kernel).all(|(w, k)| w & k == *k)
}

/// Shift one packed window row left by a bit and insert `bit` at bit 0
#[inline]
fn shift_in(row: &mut [u32], bit: bool) {
    let last = row.len() - 1;
    for w in 0..last {
        row[w] = (row[w] << 1) | (row[w + 1] >> 31);
    }
    row[last] = (row[last] << 1) | bit as u32;
}

fn sweep<F>(kernel: &PackedKernel, src: &PackedBits<'_>, dst: &mut PackedBitsMut<'_>, hit: F)
where
    F: Fn(&[u32], &[u32]) -> bool,
{
    let kw = kernel.width();
    let kh = kernel.height();
    let wpr = kernel.words_per_row();
    debug_assert_eq!(kernel.words().len(), kh * wpr);
    let dest = dst.rect();
    let (dw, dh) = (dest.width as usize, dest.height as usize);
    let mut window = vec![0u32; kh * wpr];

    for dy in 0..dh {
        window.fill(0);
        for col in 0..kw - 1 {
            for m in 0..kh {
                shift_in(&mut window[m * wpr..(m + 1) * wpr], src.bit(col, dy + m));
            }
        }
        for dx in 0..dw {
            let col = dx + kw - 1;
            for m in 0..kh {
                shift_in(&mut window[m * wpr..(m + 1) * wpr], src.bit(col, dy + m));
            }
            // window and kernel share the same row-by-row word layout
            dst.set(dx, dy, hit(&window, kernel.words()));
        }
    }
}
