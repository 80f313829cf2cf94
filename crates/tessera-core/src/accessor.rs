//! Pixel accessor
//!
//! Normalizes a [`PixelRegion`] into band-major strided arrays of one
//! working type, and writes results back with the clamp policy.
//!
//! A [`WorkingBuffer`] is a view when the working type matches the native
//! type and the layout exposes bands as strided arrays. Otherwise it is a
//! copy. A copy made by [`materialize_mut`] must be [`WorkingBuffer::flush`]ed
//! before the region's contents are meaningful.
//!
//! Packed 1-bit regions are reachable two ways: [`packed_bits`] and
//! [`packed_bits_mut`] expose the raw bytes with a bit offset, while
//! `materialize::<u8>` expands them to one 0/1 sample per element.

use crate::error::{Error, Result};
use crate::rect::Rect;
use crate::region::{Bank, Layout, PixelRegion};
use crate::sample::{ElementType, Sample, convert};

enum Planes<'a, T> {
    View(Vec<&'a [T]>),
    ViewMut(Vec<&'a mut [T]>),
    Copy {
        data: Vec<Vec<T>>,
        target: Option<&'a mut PixelRegion>,
    },
}

/// Strided, band-major samples of a single working type
pub struct WorkingBuffer<'a, T: Sample> {
    rect: Rect,
    bands: usize,
    line_stride: usize,
    pixel_stride: usize,
    band_offsets: Vec<usize>,
    band_planes: Vec<usize>,
    planes: Planes<'a, T>,
}

/// Materialize a read-only working buffer over `rect`
///
/// # Errors
///
/// Returns an error if `rect` is not inside the region, or if the region's
/// bands and element type do not agree with its layout.
pub fn materialize<T: Sample>(
    region: &PixelRegion,
    rect: Rect,
    force_copy: bool,
) -> Result<WorkingBuffer<'_, T>> {
    check_consistent(region, rect)?;
    if !force_copy && can_view::<T>(region) {
        let geometry = view_geometry(region, rect);
        let planes = region
            .banks
            .iter()
            .map(|bank| T::bank(bank).ok_or_else(|| bank_type_error::<T>(bank)))
            .collect::<Result<Vec<_>>>()?;
        return Ok(geometry.into_buffer(Planes::View(planes)));
    }
    let data = copy_out::<T>(region, rect);
    Ok(WorkingBuffer::contiguous(
        rect,
        region.bands,
        Planes::Copy { data, target: None },
    ))
}

/// Materialize a writable working buffer over `rect`
///
/// When the result is a copy, its contents start out as the region's
/// current samples and [`WorkingBuffer::needs_write_back`] is true.
pub fn materialize_mut<T: Sample>(
    region: &mut PixelRegion,
    rect: Rect,
    force_copy: bool,
) -> Result<WorkingBuffer<'_, T>> {
    check_consistent(region, rect)?;
    if !force_copy && can_view::<T>(region) {
        let geometry = view_geometry(region, rect);
        let mut planes = Vec::with_capacity(region.banks.len());
        for bank in region.banks.iter_mut() {
            let element = bank.element();
            match T::bank_mut(bank) {
                Some(slice) => planes.push(slice),
                None => {
                    return Err(Error::LayoutMismatch(format!(
                        "bank holds {:?}, expected {:?}",
                        element,
                        T::ELEMENT
                    )));
                }
            }
        }
        return Ok(geometry.into_buffer(Planes::ViewMut(planes)));
    }
    let data = copy_out::<T>(region, rect);
    let bands = region.bands;
    Ok(WorkingBuffer::contiguous(
        rect,
        bands,
        Planes::Copy {
            data,
            target: Some(region),
        },
    ))
}

impl<'a, T: Sample> WorkingBuffer<'a, T> {
    fn contiguous(rect: Rect, bands: usize, planes: Planes<'a, T>) -> Self {
        Self {
            rect,
            bands,
            line_stride: rect.width as usize,
            pixel_stride: 1,
            band_offsets: vec![0; bands],
            band_planes: (0..bands).collect(),
            planes,
        }
    }

    /// Rectangle covered, in image coordinates
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Number of bands
    pub fn bands(&self) -> usize {
        self.bands
    }

    /// Elements between vertically adjacent samples
    pub fn line_stride(&self) -> usize {
        self.line_stride
    }

    /// Elements between horizontally adjacent samples
    pub fn pixel_stride(&self) -> usize {
        self.pixel_stride
    }

    /// Index of the rect's top-left sample of `band` in [`Self::data`]
    pub fn band_offset(&self, band: usize) -> usize {
        self.band_offsets[band]
    }

    /// Whether this buffer is a copy that must be flushed to the region
    pub fn needs_write_back(&self) -> bool {
        matches!(
            self.planes,
            Planes::Copy {
                target: Some(_),
                ..
            }
        )
    }

    /// Whether this buffer is a copy rather than a view
    pub fn is_copy(&self) -> bool {
        matches!(self.planes, Planes::Copy { .. })
    }

    /// Index of sample (x, y) of `band` in [`Self::data`]
    ///
    /// Coordinates are absolute image coordinates inside [`Self::rect`].
    #[inline]
    pub fn index(&self, x: i32, y: i32, band: usize) -> usize {
        self.band_offsets[band]
            + (y - self.rect.y) as usize * self.line_stride
            + (x - self.rect.x) as usize * self.pixel_stride
    }

    /// The array holding `band`
    pub fn data(&self, band: usize) -> &[T] {
        let plane = self.band_planes[band];
        match &self.planes {
            Planes::View(p) => p[plane],
            Planes::ViewMut(p) => &p[plane][..],
            Planes::Copy { data, .. } => &data[plane],
        }
    }

    /// The mutable array holding `band`
    ///
    /// # Errors
    ///
    /// Returns an error for a read-only view.
    pub fn data_mut(&mut self, band: usize) -> Result<&mut [T]> {
        let plane = self.band_planes[band];
        match &mut self.planes {
            Planes::View(_) => Err(Error::LayoutMismatch(
                "read-only view cannot be written".into(),
            )),
            Planes::ViewMut(p) => Ok(&mut p[plane][..]),
            Planes::Copy { data, .. } => Ok(&mut data[plane][..]),
        }
    }

    /// Get a sample at absolute coordinates
    #[inline]
    pub fn get(&self, x: i32, y: i32, band: usize) -> T {
        self.data(band)[self.index(x, y, band)]
    }

    /// Set a sample at absolute coordinates
    pub fn set(&mut self, x: i32, y: i32, band: usize, value: T) -> Result<()> {
        let i = self.index(x, y, band);
        self.data_mut(band)?[i] = value;
        Ok(())
    }

    /// Saturate every sample into the range of `target`, in place
    ///
    /// Kernels call this before write-back when the working type is wider
    /// than the destination type.
    pub fn clamp(&mut self, target: ElementType) -> Result<()> {
        if target == T::ELEMENT {
            return Ok(());
        }
        let rect = self.rect;
        for band in 0..self.bands {
            let start = self.band_offsets[band];
            let (line_stride, pixel_stride) = (self.line_stride, self.pixel_stride);
            let data = self.data_mut(band)?;
            for row in 0..rect.height as usize {
                let row_start = start + row * line_stride;
                for col in 0..rect.width as usize {
                    let i = row_start + col * pixel_stride;
                    data[i] = T::from_f64(target.saturate(data[i].to_f64()));
                }
            }
        }
        Ok(())
    }

    /// Write a copied buffer back into its region
    ///
    /// Views and read-only copies need no write-back and return at once.
    /// Values saturate into the region's native type. For packed regions
    /// exactly `width` bits per row are written.
    pub fn flush(self) -> Result<()> {
        let Planes::Copy {
            data,
            target: Some(region),
        } = self.planes
        else {
            return Ok(());
        };
        let rect = self.rect;
        let width = rect.width as usize;
        if region.layout.is_strided() {
            let geometry = view_geometry(region, rect);
            let bands = region.bands;
            for band in 0..bands {
                let plane = geometry.band_planes[band];
                let start = geometry.band_offsets[band];
                let src = &data[band];
                let bank = &mut region.banks[plane];
                store_band(
                    src,
                    bank,
                    start,
                    geometry.line_stride,
                    geometry.pixel_stride,
                    width,
                )?;
            }
        } else {
            for band in 0..region.bands {
                let src = &data[band];
                for y in rect.y..rect.bottom() {
                    let row = (y - rect.y) as usize * width;
                    for x in rect.x..rect.right() {
                        region.put(x, y, band, src[row + (x - rect.x) as usize].to_f64());
                    }
                }
            }
        }
        Ok(())
    }
}

struct Geometry {
    rect: Rect,
    bands: usize,
    line_stride: usize,
    pixel_stride: usize,
    band_offsets: Vec<usize>,
    band_planes: Vec<usize>,
}

impl Geometry {
    fn into_buffer<'a, T: Sample>(self, planes: Planes<'a, T>) -> WorkingBuffer<'a, T> {
        WorkingBuffer {
            rect: self.rect,
            bands: self.bands,
            line_stride: self.line_stride,
            pixel_stride: self.pixel_stride,
            band_offsets: self.band_offsets,
            band_planes: self.band_planes,
            planes,
        }
    }
}

fn view_geometry(region: &PixelRegion, rect: Rect) -> Geometry {
    let origin = region.pixel_index(rect.x, rect.y);
    let line = region.rect.width as usize;
    match region.layout {
        Layout::Interleaved => Geometry {
            rect,
            bands: region.bands,
            line_stride: line * region.bands,
            pixel_stride: region.bands,
            band_offsets: (0..region.bands).map(|b| origin * region.bands + b).collect(),
            band_planes: vec![0; region.bands],
        },
        _ => Geometry {
            rect,
            bands: region.bands,
            line_stride: line,
            pixel_stride: 1,
            band_offsets: vec![origin; region.bands],
            band_planes: (0..region.bands).collect(),
        },
    }
}

fn can_view<T: Sample>(region: &PixelRegion) -> bool {
    region.element == T::ELEMENT && region.layout.is_strided()
}

fn check_consistent(region: &PixelRegion, rect: Rect) -> Result<()> {
    if !region.rect.contains_rect(&rect) || rect.is_empty() {
        return Err(Error::RegionOutOfBounds {
            requested: rect,
            bounds: region.rect,
        });
    }
    let (banks, bank_element) = match region.layout {
        Layout::Banded => (region.bands, region.element),
        Layout::Interleaved => (1, region.element),
        Layout::Packed { .. } => (1, ElementType::Byte),
        Layout::PixelPacked { .. } => (1, ElementType::Int),
    };
    if region.banks.len() != banks {
        return Err(Error::LayoutMismatch(format!(
            "{} bands in {} banks for {:?}",
            region.bands,
            region.banks.len(),
            region.layout
        )));
    }
    let packed_ok = |layout: &Layout| match layout {
        Layout::Packed { .. } => region.element == ElementType::Bit && region.bands == 1,
        _ => region.element != ElementType::Bit,
    };
    if region.banks.iter().any(|b| b.element() != bank_element) || !packed_ok(&region.layout) {
        return Err(Error::LayoutMismatch(format!(
            "{:?} samples inconsistent with {:?}",
            region.element, region.layout
        )));
    }
    Ok(())
}

fn bank_type_error<T: Sample>(bank: &Bank) -> Error {
    Error::LayoutMismatch(format!(
        "bank holds {:?}, expected {:?}",
        bank.element(),
        T::ELEMENT
    ))
}

fn copy_out<T: Sample>(region: &PixelRegion, rect: Rect) -> Vec<Vec<T>> {
    let width = rect.width as usize;
    let area = rect.area();
    if region.layout.is_strided() {
        let geometry = view_geometry(region, rect);
        return (0..region.bands)
            .map(|band| {
                let bank = &region.banks[geometry.band_planes[band]];
                let start = geometry.band_offsets[band];
                let (ls, ps) = (geometry.line_stride, geometry.pixel_stride);
                match bank {
                    Bank::Byte(d) => gather::<u8, T>(d, start, ls, ps, rect),
                    Bank::UShort(d) => gather::<u16, T>(d, start, ls, ps, rect),
                    Bank::Short(d) => gather::<i16, T>(d, start, ls, ps, rect),
                    Bank::Int(d) => gather::<i32, T>(d, start, ls, ps, rect),
                    Bank::Float(d) => gather::<f32, T>(d, start, ls, ps, rect),
                    Bank::Double(d) => gather::<f64, T>(d, start, ls, ps, rect),
                }
            })
            .collect();
    }
    (0..region.bands)
        .map(|band| {
            let mut out = Vec::with_capacity(area);
            for y in rect.y..rect.bottom() {
                for x in rect.x..rect.right() {
                    out.push(T::from_f64(region.fetch(x, y, band)));
                }
            }
            debug_assert_eq!(out.len(), width * rect.height as usize);
            out
        })
        .collect()
}

fn gather<S: Sample, T: Sample>(
    src: &[S],
    start: usize,
    line_stride: usize,
    pixel_stride: usize,
    rect: Rect,
) -> Vec<T> {
    let mut out = Vec::with_capacity(rect.area());
    for row in 0..rect.height as usize {
        let row_start = start + row * line_stride;
        for col in 0..rect.width as usize {
            out.push(convert::<S, T>(src[row_start + col * pixel_stride]));
        }
    }
    out
}

fn store_band<T: Sample>(
    src: &[T],
    bank: &mut Bank,
    start: usize,
    line_stride: usize,
    pixel_stride: usize,
    width: usize,
) -> Result<()> {
    match bank {
        Bank::Byte(d) => scatter::<T, u8>(src, d, start, line_stride, pixel_stride, width),
        Bank::UShort(d) => scatter::<T, u16>(src, d, start, line_stride, pixel_stride, width),
        Bank::Short(d) => scatter::<T, i16>(src, d, start, line_stride, pixel_stride, width),
        Bank::Int(d) => scatter::<T, i32>(src, d, start, line_stride, pixel_stride, width),
        Bank::Float(d) => scatter::<T, f32>(src, d, start, line_stride, pixel_stride, width),
        Bank::Double(d) => scatter::<T, f64>(src, d, start, line_stride, pixel_stride, width),
    }
    Ok(())
}

fn scatter<T: Sample, D: Sample>(
    src: &[T],
    dst: &mut [D],
    start: usize,
    line_stride: usize,
    pixel_stride: usize,
    width: usize,
) {
    for (row, chunk) in src.chunks(width).enumerate() {
        let row_start = start + row * line_stride;
        for (col, &v) in chunk.iter().enumerate() {
            dst[row_start + col * pixel_stride] = convert::<T, D>(v);
        }
    }
}

/// Read-only packed bits of a 1-bit region
///
/// Column `x` of row `y` (both relative to [`Self::rect`]) lives at bit
/// `bit_offset + x` of the row starting at `row_offset + y * line_stride`,
/// counting from the most significant bit of each byte.
pub struct PackedBits<'a> {
    data: &'a [u8],
    rect: Rect,
    line_stride: usize,
    row_offset: usize,
    bit_offset: usize,
}

/// Writable packed bits of a 1-bit region
pub struct PackedBitsMut<'a> {
    data: &'a mut [u8],
    rect: Rect,
    line_stride: usize,
    row_offset: usize,
    bit_offset: usize,
}

fn packed_geometry(region: &PixelRegion, rect: Rect) -> Result<(usize, usize, usize)> {
    check_consistent(region, rect)?;
    match region.layout {
        Layout::Packed {
            line_stride,
            bit_offset,
        } => {
            let bit = bit_offset + (rect.x - region.rect.x) as usize;
            let row_offset = (rect.y - region.rect.y) as usize * line_stride;
            Ok((line_stride, row_offset, bit))
        }
        _ => Err(Error::LayoutMismatch(format!(
            "packed access on {:?} layout",
            region.layout
        ))),
    }
}

/// Expose the packed bytes of a 1-bit region over `rect`
pub fn packed_bits(region: &PixelRegion, rect: Rect) -> Result<PackedBits<'_>> {
    let (line_stride, row_offset, bit_offset) = packed_geometry(region, rect)?;
    let data = match &region.banks[0] {
        Bank::Byte(d) => d.as_slice(),
        bank => return Err(bank_type_error::<u8>(bank)),
    };
    Ok(PackedBits {
        data,
        rect,
        line_stride,
        row_offset,
        bit_offset,
    })
}

/// Expose the packed bytes of a 1-bit region over `rect` for writing
pub fn packed_bits_mut(region: &mut PixelRegion, rect: Rect) -> Result<PackedBitsMut<'_>> {
    let (line_stride, row_offset, bit_offset) = packed_geometry(region, rect)?;
    let data = match &mut region.banks[0] {
        Bank::Byte(d) => d.as_mut_slice(),
        bank => return Err(bank_type_error::<u8>(bank)),
    };
    Ok(PackedBitsMut {
        data,
        rect,
        line_stride,
        row_offset,
        bit_offset,
    })
}

#[inline]
fn locate(row_offset: usize, line_stride: usize, bit_offset: usize, x: usize, y: usize) -> (usize, u32) {
    let bit = bit_offset + x;
    (row_offset + y * line_stride + (bit >> 3), 7 - (bit & 7) as u32)
}

impl PackedBits<'_> {
    /// Rectangle covered, in image coordinates
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Raw bytes of the whole region
    pub fn data(&self) -> &[u8] {
        self.data
    }

    /// Bytes per row
    pub fn line_stride(&self) -> usize {
        self.line_stride
    }

    /// Bit position of column 0 within each row
    pub fn bit_offset(&self) -> usize {
        self.bit_offset
    }

    /// Byte index of row 0
    pub fn row_offset(&self) -> usize {
        self.row_offset
    }

    /// Read the bit at column `x`, row `y`, relative to the rect
    #[inline]
    pub fn bit(&self, x: usize, y: usize) -> bool {
        let (byte, shift) = locate(self.row_offset, self.line_stride, self.bit_offset, x, y);
        (self.data[byte] >> shift) & 1 != 0
    }
}

impl PackedBitsMut<'_> {
    /// Rectangle covered, in image coordinates
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Bit position of column 0 within each row
    pub fn bit_offset(&self) -> usize {
        self.bit_offset
    }

    /// Read the bit at column `x`, row `y`, relative to the rect
    #[inline]
    pub fn bit(&self, x: usize, y: usize) -> bool {
        let (byte, shift) = locate(self.row_offset, self.line_stride, self.bit_offset, x, y);
        (self.data[byte] >> shift) & 1 != 0
    }

    /// Set or clear the bit at column `x`, row `y`, relative to the rect
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        let (byte, shift) = locate(self.row_offset, self.line_stride, self.bit_offset, x, y);
        if on {
            self.data[byte] |= 1 << shift;
        } else {
            self.data[byte] &= !(1 << shift);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(layout: Layout, element: ElementType) -> PixelRegion {
        PixelRegion::from_fn(Rect::sized(4, 3), 2, element, layout, |x, y, b| {
            (y * 4 + x) as f64 + 100.0 * b as f64
        })
        .unwrap()
    }

    #[test]
    fn test_view_when_types_match() {
        let r = ramp(Layout::Banded, ElementType::Short);
        let buf = materialize::<i16>(&r, Rect::new_unchecked(1, 1, 2, 2), false).unwrap();
        assert!(!buf.is_copy());
        assert!(!buf.needs_write_back());
        assert_eq!(buf.get(2, 2, 1), 110);
        assert_eq!(buf.line_stride(), 4);
        assert_eq!(buf.pixel_stride(), 1);
    }

    #[test]
    fn test_interleaved_view_offsets() {
        let r = ramp(Layout::Interleaved, ElementType::Byte);
        let buf = materialize::<u8>(&r, Rect::new_unchecked(1, 0, 3, 3), false).unwrap();
        assert_eq!(buf.pixel_stride(), 2);
        assert_eq!(buf.line_stride(), 8);
        assert_eq!(buf.band_offset(0), 2);
        assert_eq!(buf.band_offset(1), 3);
        assert_eq!(buf.get(3, 2, 0), 11);
        assert_eq!(buf.get(3, 2, 1), 111);
    }

    #[test]
    fn test_copy_on_type_change_and_force() {
        let r = ramp(Layout::Banded, ElementType::Byte);
        let promoted = materialize::<f32>(&r, r.rect(), false).unwrap();
        assert!(promoted.is_copy());
        assert_eq!(promoted.get(3, 2, 1), 111.0);

        let forced = materialize::<u8>(&r, r.rect(), true).unwrap();
        assert!(forced.is_copy());
        assert!(!forced.needs_write_back());
    }

    #[test]
    fn test_read_only_view_rejects_writes() {
        let r = ramp(Layout::Banded, ElementType::Byte);
        let mut buf = materialize::<u8>(&r, r.rect(), false).unwrap();
        assert!(buf.set(0, 0, 0, 1).is_err());
    }

    #[test]
    fn test_write_back_with_clamping() {
        let mut r = PixelRegion::new(Rect::sized(2, 2), 1, ElementType::Byte, Layout::Banded).unwrap();
        let mut buf = materialize_mut::<f32>(&mut r, Rect::sized(2, 2), false).unwrap();
        assert!(buf.needs_write_back());
        buf.set(0, 0, 0, -5.0).unwrap();
        buf.set(1, 0, 0, 99.5).unwrap();
        buf.set(0, 1, 0, 1000.0).unwrap();
        buf.clamp(ElementType::Byte).unwrap();
        assert_eq!(buf.get(0, 1, 0), 255.0);
        buf.flush().unwrap();
        assert_eq!(r.get(0, 0, 0), Some(0.0));
        assert_eq!(r.get(1, 0, 0), Some(100.0));
        assert_eq!(r.get(0, 1, 0), Some(255.0));
    }

    #[test]
    fn test_view_mut_writes_through() {
        let mut r = ramp(Layout::Interleaved, ElementType::Int);
        {
            let mut buf = materialize_mut::<i32>(&mut r, Rect::new_unchecked(2, 1, 1, 1), false).unwrap();
            assert!(!buf.needs_write_back());
            buf.set(2, 1, 1, -7).unwrap();
            buf.flush().unwrap();
        }
        assert_eq!(r.get(2, 1, 1), Some(-7.0));
        assert_eq!(r.get(2, 1, 0), Some(6.0));
    }

    #[test]
    fn test_pixel_packed_is_copied() {
        let r = PixelRegion::from_fn(Rect::sized(2, 1), 4, ElementType::Byte, Layout::rgba_word(), |x, _, b| {
            (x * 10 + b as i32) as f64
        })
        .unwrap();
        let buf = materialize::<u8>(&r, r.rect(), false).unwrap();
        assert!(buf.is_copy());
        assert_eq!(buf.get(1, 0, 3), 13);
    }

    #[test]
    fn test_packed_expanded_round_trip() {
        let rect = Rect::sized(11, 2);
        let mut r = PixelRegion::new_binary(rect).unwrap();
        {
            let mut buf = materialize_mut::<u8>(&mut r, rect, false).unwrap();
            assert!(buf.needs_write_back());
            buf.set(10, 1, 0, 1).unwrap();
            buf.set(3, 0, 0, 5).unwrap();
            buf.flush().unwrap();
        }
        assert_eq!(r.get_bit(10, 1), Some(true));
        assert_eq!(r.get_bit(3, 0), Some(true));
        assert_eq!(r.get_bit(4, 0), Some(false));
    }

    #[test]
    fn test_packed_bits_offsets() {
        let mut r = PixelRegion::new(
            Rect::new_unchecked(4, 0, 6, 2),
            1,
            ElementType::Bit,
            Layout::Packed {
                line_stride: 2,
                bit_offset: 5,
            },
        )
        .unwrap();
        r.set_bit(6, 1, true).unwrap();
        let bits = packed_bits(&r, Rect::new_unchecked(5, 1, 3, 1)).unwrap();
        assert_eq!(bits.bit_offset(), 6);
        assert_eq!(bits.row_offset(), 2);
        assert!(bits.bit(1, 0));
        assert!(!bits.bit(0, 0));
    }

    #[test]
    fn test_packed_mut_respects_padding() {
        let rect = Rect::sized(5, 1);
        let mut r = PixelRegion::from_banks(
            rect,
            1,
            ElementType::Bit,
            Layout::packed(5),
            vec![Bank::Byte(vec![0b0000_0111])],
        )
        .unwrap();
        {
            let mut bits = packed_bits_mut(&mut r, rect).unwrap();
            for x in 0..5 {
                bits.set(x, 0, true);
            }
        }
        assert_eq!(r.banks()[0], Bank::Byte(vec![0xff]));
        {
            let mut bits = packed_bits_mut(&mut r, rect).unwrap();
            for x in 0..5 {
                bits.set(x, 0, false);
            }
        }
        assert_eq!(r.banks()[0], Bank::Byte(vec![0b0000_0111]));
    }

    #[test]
    fn test_rejects_out_of_bounds_and_non_packed() {
        let r = ramp(Layout::Banded, ElementType::Byte);
        assert!(materialize::<u8>(&r, Rect::sized(5, 1), false).is_err());
        assert!(packed_bits(&r, Rect::sized(1, 1)).is_err());
    }
}
