//! Pixel accessor regression test
//!
//! Tests the normalization of region layouts into working buffers:
//!   (1) promotion and narrowing across every element type
//!   (2) view versus copy selection and write-back
//!   (3) expanded and packed access to 1-bit regions

use tessera_core::{
    ElementType, Layout, PixelRegion, Rect, Sample, materialize, materialize_mut, packed_bits,
};
use tessera_test::{RegParams, gradient_region};

fn narrow_twice<T: Sample>(v: f64) -> (T, T) {
    let once = T::from_f64(v);
    (once, T::from_f64(once.to_f64()))
}

#[test]
fn accessor_reg_clamp_idempotence() {
    let mut rp = RegParams::new("accessor_clamp");

    for v in [-1e9, -40000.0, -128.7, -0.5, 0.0, 0.49, 254.5, 255.5, 70000.0, 5e9] {
        let (a, b) = narrow_twice::<u8>(v);
        rp.compare_values(a as f64, b as f64, 0.0);
        let (a, b) = narrow_twice::<i16>(v);
        rp.compare_values(a as f64, b as f64, 0.0);
        let (a, b) = narrow_twice::<u16>(v);
        rp.compare_values(a as f64, b as f64, 0.0);
        let (a, b) = narrow_twice::<i32>(v);
        rp.compare_values(a as f64, b as f64, 0.0);
        let (a, b) = narrow_twice::<f32>(v);
        rp.compare_values(a as f64, b as f64, 0.0);
    }

    assert!(rp.cleanup(), "accessor_clamp regression test failed");
}

#[test]
fn accessor_reg_promote_and_flush() {
    let mut rp = RegParams::new("accessor_flush");

    // Short source promoted to float, scaled, then written into a byte region
    let src = PixelRegion::from_fn(Rect::sized(4, 4), 1, ElementType::Short, Layout::Banded, |x, y, _| {
        (x * 100 - y * 100) as f64
    })
    .unwrap();
    let promoted = materialize::<f32>(&src, src.rect(), false).unwrap();
    rp.compare_values(1.0, promoted.is_copy() as u8 as f64, 0.0);

    let mut dst = PixelRegion::new(src.rect(), 1, ElementType::Byte, Layout::Interleaved).unwrap();
    {
        let mut out = materialize_mut::<f32>(&mut dst, src.rect(), false).unwrap();
        rp.compare_values(1.0, out.needs_write_back() as u8 as f64, 0.0);
        for y in 0..4 {
            for x in 0..4 {
                out.set(x, y, 0, promoted.get(x, y, 0) * 0.5).unwrap();
            }
        }
        out.clamp(ElementType::Byte).unwrap();
        out.flush().unwrap();
    }
    // 300 * 0.5 = 150, -300 * 0.5 clamps to 0, 150 * 0.5 stays
    rp.compare_values(150.0, dst.get(3, 0, 0).unwrap(), 0.0);
    rp.compare_values(0.0, dst.get(0, 3, 0).unwrap(), 0.0);
    rp.compare_values(50.0, dst.get(2, 1, 0).unwrap(), 0.0);

    assert!(rp.cleanup(), "accessor_flush regression test failed");
}

#[test]
fn accessor_reg_layout_views() {
    let mut rp = RegParams::new("accessor_views");

    let banded = gradient_region(8, 8, ElementType::UShort, 1400.0).unwrap();
    let sub = Rect::new_unchecked(2, 3, 4, 2);
    let view = materialize::<u16>(&banded, sub, false).unwrap();
    rp.compare_values(0.0, view.is_copy() as u8 as f64, 0.0);
    rp.compare_values(8.0, view.line_stride() as f64, 0.0);
    rp.compare_values((3 * 8 + 2) as f64, view.band_offset(0) as f64, 0.0);
    rp.compare_values(banded.get(5, 4, 0).unwrap(), view.get(5, 4, 0) as f64, 0.0);

    // Forcing a copy yields the same samples in a contiguous layout
    let copy = materialize::<u16>(&banded, sub, true).unwrap();
    rp.compare_values(1.0, copy.is_copy() as u8 as f64, 0.0);
    rp.compare_values(4.0, copy.line_stride() as f64, 0.0);
    rp.compare_values(view.get(5, 4, 0) as f64, copy.get(5, 4, 0) as f64, 0.0);

    // Inconsistent requests are reported, not ignored
    rp.compare_values(1.0, materialize::<u16>(&banded, Rect::sized(9, 1), false).is_err() as u8 as f64, 0.0);

    assert!(rp.cleanup(), "accessor_views regression test failed");
}

#[test]
fn accessor_reg_packed_modes() {
    let mut rp = RegParams::new("accessor_packed");

    let rect = Rect::new_unchecked(3, 1, 13, 3);
    let mut region = PixelRegion::new_binary(rect).unwrap();
    for (x, y) in [(3, 1), (15, 1), (9, 2), (10, 3)] {
        region.set_bit(x, y, true).unwrap();
    }

    let expanded = materialize::<u8>(&region, rect, false).unwrap();
    let mut set = 0;
    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            set += expanded.get(x, y, 0) as i32;
        }
    }
    rp.compare_values(4.0, set as f64, 0.0);

    let bits = packed_bits(&region, Rect::new_unchecked(9, 2, 4, 2)).unwrap();
    rp.compare_values(6.0, bits.bit_offset() as f64, 0.0);
    rp.compare_values(1.0, bits.bit(0, 0) as u8 as f64, 0.0);
    rp.compare_values(1.0, bits.bit(1, 1) as u8 as f64, 0.0);
    rp.compare_values(0.0, bits.bit(1, 0) as u8 as f64, 0.0);

    assert!(rp.cleanup(), "accessor_packed regression test failed");
}
