//! PixelRegion - A rectangular multi-band block of pixel samples
//!
//! A region owns its samples in one or more storage banks and records how
//! they are laid out. Coordinates passed to accessors are absolute image
//! coordinates, so a region covering `(10, 20, 4, 4)` is addressed with x in
//! `10..14` and y in `20..24`.
//!
//! Four layouts are supported:
//!
//! - [`Layout::Banded`] - one contiguous bank per band
//! - [`Layout::Interleaved`] - one bank, bands interleaved per pixel
//! - [`Layout::Packed`] - 1-bit samples, 8 per byte, MSB first, each row
//!   padded to a byte boundary
//! - [`Layout::PixelPacked`] - every band of a pixel packed into one 32-bit
//!   word (for example `0xRRGGBBAA`)

use crate::error::{Error, Result};
use crate::rect::Rect;
use crate::sample::{ElementType, Sample};

/// Typed sample storage
#[derive(Debug, Clone, PartialEq)]
pub enum Bank {
    Byte(Vec<u8>),
    UShort(Vec<u16>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl Bank {
    /// Allocate a zero-filled bank for an element type
    ///
    /// Bit samples are stored in a byte bank.
    pub fn zeroed(element: ElementType, len: usize) -> Self {
        match element {
            ElementType::Bit | ElementType::Byte => Bank::Byte(vec![0; len]),
            ElementType::UShort => Bank::UShort(vec![0; len]),
            ElementType::Short => Bank::Short(vec![0; len]),
            ElementType::Int => Bank::Int(vec![0; len]),
            ElementType::Float => Bank::Float(vec![0.0; len]),
            ElementType::Double => Bank::Double(vec![0.0; len]),
        }
    }

    /// Number of stored elements
    pub fn len(&self) -> usize {
        match self {
            Bank::Byte(d) => d.len(),
            Bank::UShort(d) => d.len(),
            Bank::Short(d) => d.len(),
            Bank::Int(d) => d.len(),
            Bank::Float(d) => d.len(),
            Bank::Double(d) => d.len(),
        }
    }

    /// Check if the bank holds no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type of the stored values
    pub fn element(&self) -> ElementType {
        match self {
            Bank::Byte(_) => ElementType::Byte,
            Bank::UShort(_) => ElementType::UShort,
            Bank::Short(_) => ElementType::Short,
            Bank::Int(_) => ElementType::Int,
            Bank::Float(_) => ElementType::Float,
            Bank::Double(_) => ElementType::Double,
        }
    }

    #[inline]
    pub(crate) fn get_f64(&self, i: usize) -> f64 {
        match self {
            Bank::Byte(d) => d[i] as f64,
            Bank::UShort(d) => d[i] as f64,
            Bank::Short(d) => d[i] as f64,
            Bank::Int(d) => d[i] as f64,
            Bank::Float(d) => d[i] as f64,
            Bank::Double(d) => d[i],
        }
    }

    #[inline]
    pub(crate) fn set_f64(&mut self, i: usize, v: f64) {
        match self {
            Bank::Byte(d) => d[i] = u8::from_f64(v),
            Bank::UShort(d) => d[i] = u16::from_f64(v),
            Bank::Short(d) => d[i] = i16::from_f64(v),
            Bank::Int(d) => d[i] = i32::from_f64(v),
            Bank::Float(d) => d[i] = f32::from_f64(v),
            Bank::Double(d) => d[i] = v,
        }
    }
}

/// Storage layout of a pixel region
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// One bank per band, row-major, no padding
    Banded,
    /// A single bank with all bands of a pixel adjacent
    Interleaved,
    /// Packed 1-bit samples
    Packed {
        /// Bytes per row
        line_stride: usize,
        /// Bit position of the first column within each row
        bit_offset: usize,
    },
    /// All bands of a pixel packed into a single 32-bit word
    PixelPacked {
        /// Right shift of each band's field
        shifts: Vec<u32>,
        /// Width in bits of each band's field
        widths: Vec<u32>,
    },
}

impl Layout {
    /// Packed layout with no leading bit offset for a given width
    pub fn packed(width: i32) -> Self {
        Layout::Packed {
            line_stride: (width.max(0) as usize).div_ceil(8),
            bit_offset: 0,
        }
    }

    /// Pixel-packed layout for 8-bit fields stored as `0xRRGGBBAA`
    pub fn rgba_word() -> Self {
        Layout::PixelPacked {
            shifts: vec![24, 16, 8, 0],
            widths: vec![8; 4],
        }
    }

    /// Whether bands can be exposed as independent strided arrays
    pub fn is_strided(&self) -> bool {
        matches!(self, Layout::Banded | Layout::Interleaved)
    }
}

/// A rectangular block of pixel data
///
/// Regions are allocated by the caller and filled by operators. No operator
/// keeps a region beyond the call that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelRegion {
    pub(crate) rect: Rect,
    pub(crate) bands: usize,
    pub(crate) element: ElementType,
    pub(crate) layout: Layout,
    pub(crate) banks: Vec<Bank>,
}

impl PixelRegion {
    /// Create a zero-filled region
    ///
    /// # Errors
    ///
    /// Returns an error if the rectangle is empty or the band count,
    /// element type and layout are inconsistent.
    pub fn new(rect: Rect, bands: usize, element: ElementType, layout: Layout) -> Result<Self> {
        validate_shape(rect, bands, element, &layout)?;
        let banks = match &layout {
            Layout::Banded => (0..bands)
                .map(|_| Bank::zeroed(element, rect.area()))
                .collect(),
            Layout::Interleaved => vec![Bank::zeroed(element, rect.area() * bands)],
            Layout::Packed { line_stride, .. } => {
                vec![Bank::zeroed(ElementType::Byte, line_stride * rect.height as usize)]
            }
            Layout::PixelPacked { .. } => vec![Bank::zeroed(ElementType::Int, rect.area())],
        };
        Ok(Self {
            rect,
            bands,
            element,
            layout,
            banks,
        })
    }

    /// Create a zero-filled 1-bit packed region
    pub fn new_binary(rect: Rect) -> Result<Self> {
        Self::new(rect, 1, ElementType::Bit, Layout::packed(rect.width))
    }

    /// Create a region from existing storage banks
    ///
    /// # Errors
    ///
    /// Returns [`Error::LayoutMismatch`] if the banks do not hold exactly the
    /// samples the layout requires.
    pub fn from_banks(
        rect: Rect,
        bands: usize,
        element: ElementType,
        layout: Layout,
        banks: Vec<Bank>,
    ) -> Result<Self> {
        validate_shape(rect, bands, element, &layout)?;
        let area = rect.area();
        let (expected_banks, expected_len, bank_element) = match &layout {
            Layout::Banded => (bands, area, element),
            Layout::Interleaved => (1, area * bands, element),
            Layout::Packed { line_stride, .. } => {
                (1, line_stride * rect.height as usize, ElementType::Byte)
            }
            Layout::PixelPacked { .. } => (1, area, ElementType::Int),
        };
        if banks.len() != expected_banks {
            return Err(Error::LayoutMismatch(format!(
                "{:?} layout needs {} banks, got {}",
                layout,
                expected_banks,
                banks.len()
            )));
        }
        for bank in &banks {
            if bank.element() != bank_element || bank.len() != expected_len {
                return Err(Error::LayoutMismatch(format!(
                    "bank of {} {:?} samples, expected {} {:?}",
                    bank.len(),
                    bank.element(),
                    expected_len,
                    bank_element
                )));
            }
        }
        Ok(Self {
            rect,
            bands,
            element,
            layout,
            banks,
        })
    }

    /// Create a region whose samples are computed by `f(x, y, band)`
    pub fn from_fn<F>(
        rect: Rect,
        bands: usize,
        element: ElementType,
        layout: Layout,
        mut f: F,
    ) -> Result<Self>
    where
        F: FnMut(i32, i32, usize) -> f64,
    {
        let mut region = Self::new(rect, bands, element, layout)?;
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                for b in 0..bands {
                    region.put(x, y, b, f(x, y, b));
                }
            }
        }
        Ok(region)
    }

    /// Get the covered rectangle
    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Get the width
    #[inline]
    pub fn width(&self) -> i32 {
        self.rect.width
    }

    /// Get the height
    #[inline]
    pub fn height(&self) -> i32 {
        self.rect.height
    }

    /// Get the number of bands
    #[inline]
    pub fn bands(&self) -> usize {
        self.bands
    }

    /// Get the native element type
    #[inline]
    pub fn element_type(&self) -> ElementType {
        self.element
    }

    /// Get the storage layout
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Get the storage banks
    pub fn banks(&self) -> &[Bank] {
        &self.banks
    }

    /// Get a sample value, or `None` outside the region
    pub fn get(&self, x: i32, y: i32, band: usize) -> Option<f64> {
        if !self.rect.contains_point(x, y) || band >= self.bands {
            return None;
        }
        Some(self.fetch(x, y, band))
    }

    /// Set a sample value, saturating into the element type
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinates or band are outside the region.
    pub fn set(&mut self, x: i32, y: i32, band: usize, value: f64) -> Result<()> {
        if !self.rect.contains_point(x, y) {
            return Err(Error::RegionOutOfBounds {
                requested: Rect::new_unchecked(x, y, 1, 1),
                bounds: self.rect,
            });
        }
        if band >= self.bands {
            return Err(Error::IndexOutOfBounds {
                index: band,
                len: self.bands,
            });
        }
        self.put(x, y, band, value);
        Ok(())
    }

    /// Get a 1-bit sample from a packed region
    pub fn get_bit(&self, x: i32, y: i32) -> Option<bool> {
        match self.layout {
            Layout::Packed { .. } if self.rect.contains_point(x, y) => {
                Some(self.fetch(x, y, 0) != 0.0)
            }
            _ => None,
        }
    }

    /// Set a 1-bit sample in a packed region
    pub fn set_bit(&mut self, x: i32, y: i32, on: bool) -> Result<()> {
        if !matches!(self.layout, Layout::Packed { .. }) {
            return Err(Error::LayoutMismatch("set_bit on a non-packed region".into()));
        }
        self.set(x, y, 0, if on { 1.0 } else { 0.0 })
    }

    /// Copy out a sub-rectangle into a new region with the same layout kind
    ///
    /// # Errors
    ///
    /// Returns an error if `rect` is not inside this region.
    pub fn crop(&self, rect: Rect) -> Result<PixelRegion> {
        if !self.rect.contains_rect(&rect) {
            return Err(Error::RegionOutOfBounds {
                requested: rect,
                bounds: self.rect,
            });
        }
        let layout = match &self.layout {
            Layout::Packed { .. } => Layout::packed(rect.width),
            other => other.clone(),
        };
        let mut out = PixelRegion::new(rect, self.bands, self.element, layout)?;
        out.copy_from(self)?;
        Ok(out)
    }

    /// Copy the overlapping area of another region into this one
    ///
    /// Values are saturated into this region's element type. Returns the
    /// rectangle that was copied, if any.
    pub fn copy_from(&mut self, other: &PixelRegion) -> Result<Option<Rect>> {
        if other.bands != self.bands {
            return Err(Error::BandMismatch {
                expected: self.bands,
                actual: other.bands,
            });
        }
        let Some(overlap) = self.rect.intersect(&other.rect) else {
            return Ok(None);
        };
        for y in overlap.y..overlap.bottom() {
            for x in overlap.x..overlap.right() {
                for b in 0..self.bands {
                    let v = other.fetch(x, y, b);
                    self.put(x, y, b, v);
                }
            }
        }
        Ok(Some(overlap))
    }

    /// Offset of pixel (x, y) in row-major pixel order
    #[inline]
    pub(crate) fn pixel_index(&self, x: i32, y: i32) -> usize {
        (y - self.rect.y) as usize * self.rect.width as usize + (x - self.rect.x) as usize
    }

    /// Byte index and shift of a packed sample
    #[inline]
    pub(crate) fn bit_position(&self, x: i32, y: i32) -> (usize, u32) {
        let (line_stride, bit_offset) = match self.layout {
            Layout::Packed {
                line_stride,
                bit_offset,
            } => (line_stride, bit_offset),
            _ => (0, 0),
        };
        let bit = bit_offset + (x - self.rect.x) as usize;
        let byte = (y - self.rect.y) as usize * line_stride + (bit >> 3);
        (byte, 7 - (bit & 7) as u32)
    }

    /// Read a sample without bounds checks on the coordinates
    pub(crate) fn fetch(&self, x: i32, y: i32, band: usize) -> f64 {
        match &self.layout {
            Layout::Banded => self.banks[band].get_f64(self.pixel_index(x, y)),
            Layout::Interleaved => self.banks[0].get_f64(self.pixel_index(x, y) * self.bands + band),
            Layout::Packed { .. } => {
                let (byte, shift) = self.bit_position(x, y);
                match &self.banks[0] {
                    Bank::Byte(d) => ((d[byte] >> shift) & 1) as f64,
                    _ => 0.0,
                }
            }
            Layout::PixelPacked { shifts, widths } => {
                let i = self.pixel_index(x, y);
                match &self.banks[0] {
                    Bank::Int(d) => {
                        let word = d[i] as u32;
                        ((word >> shifts[band]) & field_mask(widths[band])) as f64
                    }
                    _ => 0.0,
                }
            }
        }
    }

    /// Write a sample without bounds checks on the coordinates
    pub(crate) fn put(&mut self, x: i32, y: i32, band: usize, value: f64) {
        let v = self.element.saturate(value);
        let i = self.pixel_index(x, y);
        match &self.layout {
            Layout::Banded => self.banks[band].set_f64(i, v),
            Layout::Interleaved => {
                let bands = self.bands;
                self.banks[0].set_f64(i * bands + band, v)
            }
            Layout::Packed { .. } => {
                let (byte, shift) = self.bit_position(x, y);
                if let Bank::Byte(d) = &mut self.banks[0] {
                    if v != 0.0 {
                        d[byte] |= 1 << shift;
                    } else {
                        d[byte] &= !(1 << shift);
                    }
                }
            }
            Layout::PixelPacked { shifts, widths } => {
                let mask = field_mask(widths[band]);
                let field = (v as u32).min(mask);
                let shift = shifts[band];
                if let Bank::Int(d) = &mut self.banks[0] {
                    let word = (d[i] as u32 & !(mask << shift)) | (field << shift);
                    d[i] = word as i32;
                }
            }
        }
    }
}

#[inline]
pub(crate) fn field_mask(width: u32) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        (1u32 << width) - 1
    }
}

fn validate_shape(rect: Rect, bands: usize, element: ElementType, layout: &Layout) -> Result<()> {
    if rect.width <= 0 || rect.height <= 0 {
        return Err(Error::InvalidDimension {
            width: rect.width,
            height: rect.height,
        });
    }
    if bands == 0 {
        return Err(Error::LayoutMismatch("region needs at least one band".into()));
    }
    match layout {
        Layout::Packed {
            line_stride,
            bit_offset,
        } => {
            if element != ElementType::Bit || bands != 1 {
                return Err(Error::LayoutMismatch(format!(
                    "packed layout holds one Bit band, got {} {:?} bands",
                    bands, element
                )));
            }
            let needed = (bit_offset + rect.width as usize).div_ceil(8);
            if *line_stride < needed {
                return Err(Error::LayoutMismatch(format!(
                    "line stride {} too small for {} bits",
                    line_stride,
                    bit_offset + rect.width as usize
                )));
            }
        }
        Layout::PixelPacked { shifts, widths } => {
            if element != ElementType::Byte {
                return Err(Error::LayoutMismatch(format!(
                    "pixel-packed layout holds Byte samples, got {:?}",
                    element
                )));
            }
            if shifts.len() != bands || widths.len() != bands {
                return Err(Error::BandMismatch {
                    expected: bands,
                    actual: shifts.len().min(widths.len()),
                });
            }
            for (&s, &w) in shifts.iter().zip(widths) {
                if w == 0 || w > 8 || s + w > 32 {
                    return Err(Error::LayoutMismatch(format!(
                        "invalid packed field: shift {} width {}",
                        s, w
                    )));
                }
            }
        }
        Layout::Banded | Layout::Interleaved => {
            if element == ElementType::Bit {
                return Err(Error::LayoutMismatch(
                    "Bit samples must use the packed layout".into(),
                ));
            }
        }
    }
    Ok(())
}
