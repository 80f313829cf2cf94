//! Element types and the saturating clamp policy
//!
//! Every numeric kernel is written once, generic over [`Sample`]. Each
//! implementation supplies its own saturating casts, so there are no
//! per-type compute loops.
//!
//! Promotion and narrowing rules:
//!
//! - unsigned 8/16-bit values are zero-extended when promoted
//! - floating point to integral rounds, then clamps to the target range
//! - integral to narrower integral clamps (int -> short gives [-32768, 32767])
//! - double to float clamps to `±f32::MAX`
//! - NaN narrows to zero for integral targets

use crate::region::Bank;
use std::fmt::Debug;
use std::sync::LazyLock;

/// Native element type of a pixel region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// 1-bit samples, only stored packed
    Bit,
    /// Unsigned 8-bit
    Byte,
    /// Unsigned 16-bit
    UShort,
    /// Signed 16-bit
    Short,
    /// Signed 32-bit
    Int,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
}

impl ElementType {
    /// Size of one sample in bits
    pub fn bits(self) -> u32 {
        match self {
            ElementType::Bit => 1,
            ElementType::Byte => 8,
            ElementType::UShort | ElementType::Short => 16,
            ElementType::Int | ElementType::Float => 32,
            ElementType::Double => 64,
        }
    }

    /// Whether the type holds integers
    pub fn is_integral(self) -> bool {
        !matches!(self, ElementType::Float | ElementType::Double)
    }

    /// Smallest representable value
    pub fn min_value(self) -> f64 {
        match self {
            ElementType::Bit | ElementType::Byte | ElementType::UShort => 0.0,
            ElementType::Short => i16::MIN as f64,
            ElementType::Int => i32::MIN as f64,
            ElementType::Float => -(f32::MAX as f64),
            ElementType::Double => f64::MIN,
        }
    }

    /// Largest representable value
    pub fn max_value(self) -> f64 {
        match self {
            ElementType::Bit => 1.0,
            ElementType::Byte => u8::MAX as f64,
            ElementType::UShort => u16::MAX as f64,
            ElementType::Short => i16::MAX as f64,
            ElementType::Int => i32::MAX as f64,
            ElementType::Float => f32::MAX as f64,
            ElementType::Double => f64::MAX,
        }
    }

    /// Saturate a value into this type's range, keeping it as `f64`
    ///
    /// Integral types round first. The result is exactly representable in
    /// the type, so saturating twice gives the same value as once.
    pub fn saturate(self, v: f64) -> f64 {
        match self {
            ElementType::Double => v,
            ElementType::Float => f32::from_f64(v) as f64,
            _ if v.is_nan() => 0.0,
            _ => v.round().clamp(self.min_value(), self.max_value()),
        }
    }
}

/// A numeric sample type with saturating conversions
pub trait Sample: Copy + Default + PartialEq + PartialOrd + Debug + Send + Sync + 'static {
    /// The element type this sample stores
    const ELEMENT: ElementType;

    /// Widen to `f64` (exact for every supported type)
    fn to_f64(self) -> f64;

    /// Widen to `i64`; floating point values are rounded and saturated
    fn to_i64(self) -> i64;

    /// Narrow from `f64`, rounding then clamping for integral types
    fn from_f64(v: f64) -> Self;

    /// Narrow from `i64`, clamping to the representable range
    fn from_i64(v: i64) -> Self;

    /// Borrow a storage bank as a slice of this type
    fn bank(bank: &Bank) -> Option<&[Self]>;

    /// Mutably borrow a storage bank as a slice of this type
    fn bank_mut(bank: &mut Bank) -> Option<&mut [Self]>;

    /// Wrap owned samples as a storage bank
    fn into_bank(data: Vec<Self>) -> Bank;
}

/// Convert between sample types with the clamp policy
///
/// Integral-to-integral conversions go through `i64` so that 32-bit values
/// keep full precision.
#[inline]
pub fn convert<S: Sample, T: Sample>(v: S) -> T {
    if S::ELEMENT.is_integral() && T::ELEMENT.is_integral() {
        T::from_i64(v.to_i64())
    } else {
        T::from_f64(v.to_f64())
    }
}

impl Sample for u8 {
    const ELEMENT: ElementType = ElementType::Byte;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
    #[inline]
    fn to_i64(self) -> i64 {
        self as i64
    }
    #[inline]
    fn from_f64(v: f64) -> Self {
        // float-to-int `as` saturates and maps NaN to zero
        v.round() as u8
    }
    #[inline]
    fn from_i64(v: i64) -> Self {
        v.clamp(0, u8::MAX as i64) as u8
    }
    fn bank(bank: &Bank) -> Option<&[Self]> {
        match bank {
            Bank::Byte(d) => Some(d),
            _ => None,
        }
    }
    fn bank_mut(bank: &mut Bank) -> Option<&mut [Self]> {
        match bank {
            Bank::Byte(d) => Some(d),
            _ => None,
        }
    }
    fn into_bank(data: Vec<Self>) -> Bank {
        Bank::Byte(data)
    }
}

impl Sample for u16 {
    const ELEMENT: ElementType = ElementType::UShort;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
    #[inline]
    fn to_i64(self) -> i64 {
        self as i64
    }
    #[inline]
    fn from_f64(v: f64) -> Self {
        v.round() as u16
    }
    #[inline]
    fn from_i64(v: i64) -> Self {
        v.clamp(0, u16::MAX as i64) as u16
    }
    fn bank(bank: &Bank) -> Option<&[Self]> {
        match bank {
            Bank::UShort(d) => Some(d),
            _ => None,
        }
    }
    fn bank_mut(bank: &mut Bank) -> Option<&mut [Self]> {
        match bank {
            Bank::UShort(d) => Some(d),
            _ => None,
        }
    }
    fn into_bank(data: Vec<Self>) -> Bank {
        Bank::UShort(data)
    }
}

impl Sample for i16 {
    const ELEMENT: ElementType = ElementType::Short;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
    #[inline]
    fn to_i64(self) -> i64 {
        self as i64
    }
    #[inline]
    fn from_f64(v: f64) -> Self {
        v.round() as i16
    }
    #[inline]
    fn from_i64(v: i64) -> Self {
        v.clamp(i16::MIN as i64, i16::MAX as i64) as i16
    }
    fn bank(bank: &Bank) -> Option<&[Self]> {
        match bank {
            Bank::Short(d) => Some(d),
            _ => None,
        }
    }
    fn bank_mut(bank: &mut Bank) -> Option<&mut [Self]> {
        match bank {
            Bank::Short(d) => Some(d),
            _ => None,
        }
    }
    fn into_bank(data: Vec<Self>) -> Bank {
        Bank::Short(data)
    }
}

impl Sample for i32 {
    const ELEMENT: ElementType = ElementType::Int;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
    #[inline]
    fn to_i64(self) -> i64 {
        self as i64
    }
    #[inline]
    fn from_f64(v: f64) -> Self {
        v.round() as i32
    }
    #[inline]
    fn from_i64(v: i64) -> Self {
        v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }
    fn bank(bank: &Bank) -> Option<&[Self]> {
        match bank {
            Bank::Int(d) => Some(d),
            _ => None,
        }
    }
    fn bank_mut(bank: &mut Bank) -> Option<&mut [Self]> {
        match bank {
            Bank::Int(d) => Some(d),
            _ => None,
        }
    }
    fn into_bank(data: Vec<Self>) -> Bank {
        Bank::Int(data)
    }
}

impl Sample for f32 {
    const ELEMENT: ElementType = ElementType::Float;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
    #[inline]
    fn to_i64(self) -> i64 {
        self.round() as i64
    }
    #[inline]
    fn from_f64(v: f64) -> Self {
        v.clamp(-(f32::MAX as f64), f32::MAX as f64) as f32
    }
    #[inline]
    fn from_i64(v: i64) -> Self {
        v as f32
    }
    fn bank(bank: &Bank) -> Option<&[Self]> {
        match bank {
            Bank::Float(d) => Some(d),
            _ => None,
        }
    }
    fn bank_mut(bank: &mut Bank) -> Option<&mut [Self]> {
        match bank {
            Bank::Float(d) => Some(d),
            _ => None,
        }
    }
    fn into_bank(data: Vec<Self>) -> Bank {
        Bank::Float(data)
    }
}

impl Sample for f64 {
    const ELEMENT: ElementType = ElementType::Double;

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
    #[inline]
    fn to_i64(self) -> i64 {
        self.round() as i64
    }
    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }
    #[inline]
    fn from_i64(v: i64) -> Self {
        v as f64
    }
    fn bank(bank: &Bank) -> Option<&[Self]> {
        match bank {
            Bank::Double(d) => Some(d),
            _ => None,
        }
    }
    fn bank_mut(bank: &mut Bank) -> Option<&mut [Self]> {
        match bank {
            Bank::Double(d) => Some(d),
            _ => None,
        }
    }
    fn into_bank(data: Vec<Self>) -> Bank {
        Bank::Double(data)
    }
}

const CLAMP_OFFSET: i32 = 256;
const CLAMP_LEN: i32 = 1024;

/// Byte clamp table covering [-256, 767], built once per process
static BYTE_CLAMP: LazyLock<[u8; CLAMP_LEN as usize]> = LazyLock::new(|| {
    let mut table = [0u8; CLAMP_LEN as usize];
    for (i, entry) in table.iter_mut().enumerate() {
        *entry = (i as i32 - CLAMP_OFFSET).clamp(0, 255) as u8;
    }
    table
});

/// Clamp an integer to [0, 255]
///
/// Values near the byte range are served from a shared lookup table.
#[inline]
pub fn clamp_byte(v: i32) -> u8 {
    let idx = v.wrapping_add(CLAMP_OFFSET);
    if (0..CLAMP_LEN).contains(&idx) {
        BYTE_CLAMP[idx as usize]
    } else if v < 0 {
        0
    } else {
        255
    }
}
