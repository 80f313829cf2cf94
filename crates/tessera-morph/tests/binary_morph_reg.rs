//! Binary morphology regression test
//!
//! Tests the packed erode and dilate engine:
//!   (1) the 1x1 kernel is the identity
//!   (2) dilation and erosion by bricks on small fixtures
//!   (3) the anchor of an asymmetric kernel
//!   (4) tiled computation matches a single untiled pass
//!   (5) erosion is the complement of dilating the complement
//!   (6) kernels larger than the image are rejected
//!   (7) multi-word kernels match a per-pixel reference

use tessera_core::{
    BorderExtender, ElementType, Extended, ImageLayout, Layout, PixelRegion, Rect, render,
};
use tessera_morph::{BinaryKernel, BinaryMorph, MorphError};
use tessera_test::{RegParams, binary_filled, binary_from_rows, render_ascii};

fn zero_border(src: PixelRegion) -> Extended<PixelRegion> {
    Extended::new(src, BorderExtender::Zero)
}

fn dilate(src: &PixelRegion, k: &BinaryKernel, tile: i32) -> PixelRegion {
    let layout = ImageLayout::like(src, tile, tile).unwrap();
    render(&BinaryMorph::dilate(zero_border(src.clone()), k, layout).unwrap()).unwrap()
}

fn erode(src: &PixelRegion, k: &BinaryKernel, tile: i32) -> PixelRegion {
    let layout = ImageLayout::like(src, tile, tile).unwrap();
    render(&BinaryMorph::erode(zero_border(src.clone()), k, layout).unwrap()).unwrap()
}

fn count_set(r: &PixelRegion) -> usize {
    let rect = r.rect();
    (rect.y..rect.bottom())
        .flat_map(|y| (rect.x..rect.right()).map(move |x| (x, y)))
        .filter(|&(x, y)| r.get_bit(x, y) == Some(true))
        .count()
}

/// Deterministic scatter of set bits
fn speckle(width: i32, height: i32) -> PixelRegion {
    PixelRegion::from_fn(
        Rect::sized(width, height),
        1,
        ElementType::Bit,
        Layout::packed(width),
        |x, y, _| {
            let h = (x as u32).wrapping_mul(2_654_435_761) ^ (y as u32).wrapping_mul(40_503);
            if h % 7 < 2 { 1.0 } else { 0.0 }
        },
    )
    .unwrap()
}

/// Mostly set, with rare holes
fn dense(width: i32, height: i32) -> PixelRegion {
    PixelRegion::from_fn(
        Rect::sized(width, height),
        1,
        ElementType::Bit,
        Layout::packed(width),
        |x, y, _| {
            let h = (x as u32).wrapping_mul(2_246_822_519) ^ (y as u32).wrapping_mul(3_266_489_917);
            if (h >> 7) % 97 == 0 { 0.0 } else { 1.0 }
        },
    )
    .unwrap()
}

/// Per-pixel morphology with a zero border
///
/// Each tap at `(i, j)` reads the source at `(x - (i - key_x), y - (j - key_y))`;
/// dilation ORs the taps and erosion ANDs them.
fn reference(src: &PixelRegion, k: &BinaryKernel, dilation: bool) -> PixelRegion {
    let rect = src.rect();
    let taps: Vec<(i32, i32)> = (0..k.height())
        .flat_map(|j| (0..k.width()).map(move |i| (i, j)))
        .filter(|&(i, j)| k.get(i, j) == Some(true))
        .map(|(i, j)| (i as i32 - k.key_x() as i32, j as i32 - k.key_y() as i32))
        .collect();
    PixelRegion::from_fn(rect, 1, ElementType::Bit, Layout::packed(rect.width), |x, y, _| {
        let mut hits = taps.iter().map(|&(dx, dy)| src.get_bit(x - dx, y - dy) == Some(true));
        let on = if dilation { hits.any(|h| h) } else { hits.all(|h| h) };
        if on { 1.0 } else { 0.0 }
    })
    .unwrap()
}

/// Wide kernel with a gap every fifth column
fn gapped(width: u32, height: u32, key_x: u32, key_y: u32) -> BinaryKernel {
    let taps = (0..width * height).map(|t| t % width % 5 != 3).collect();
    BinaryKernel::new(width, height, key_x, key_y, taps).unwrap()
}

#[test]
fn binary_morph_reg_identity() {
    let mut rp = RegParams::new("binmorph_identity");

    let src = speckle(45, 17);
    let single = BinaryKernel::single();
    rp.compare_regions(&src, &dilate(&src, &single, 16));
    rp.compare_regions(&src, &erode(&src, &single, 16));

    assert!(rp.cleanup(), "binmorph_identity regression test failed");
}

#[test]
fn binary_morph_reg_bricks() {
    let mut rp = RegParams::new("binmorph_bricks");

    // A single bit grows into the 3x3 brick around it
    let dot = binary_from_rows(&[
        ".......",
        ".......",
        "...x...",
        ".......",
        ".......",
    ])
    .unwrap();
    let grown = dilate(&dot, &BinaryKernel::brick(3, 3).unwrap(), 7);
    let expected = binary_from_rows(&[
        ".......",
        "..xxx..",
        "..xxx..",
        "..xxx..",
        ".......",
    ])
    .unwrap();
    if rp.display() {
        eprintln!("{}", render_ascii(&grown));
    }
    rp.compare_regions(&expected, &grown);

    // A 5x5 brick eroded by 3x3 leaves its 3x3 interior
    let block = binary_from_rows(&[
        ".......",
        ".xxxxx.",
        ".xxxxx.",
        ".xxxxx.",
        ".xxxxx.",
        ".xxxxx.",
        ".......",
    ])
    .unwrap();
    let shrunk = erode(&block, &BinaryKernel::brick(3, 3).unwrap(), 7);
    rp.compare_values(9.0, count_set(&shrunk) as f64, 0.0);
    rp.compare_values(1.0, shrunk.get_bit(2, 2).unwrap_or(false) as u8 as f64, 0.0);
    rp.compare_values(1.0, shrunk.get_bit(4, 4).unwrap_or(false) as u8 as f64, 0.0);
    rp.compare_values(0.0, shrunk.get_bit(1, 1).unwrap_or(true) as u8 as f64, 0.0);

    // An all-set image erodes to nothing at the zero border, but keeps its interior
    let full = binary_filled(9, 9, true).unwrap();
    let eroded = erode(&full, &BinaryKernel::brick(3, 3).unwrap(), 4);
    rp.compare_values(49.0, count_set(&eroded) as f64, 0.0);

    assert!(rp.cleanup(), "binmorph_bricks regression test failed");
}

#[test]
fn binary_morph_reg_anchor() {
    let mut rp = RegParams::new("binmorph_anchor");

    // Kernel "xx" with the anchor on its left tap
    let k = BinaryKernel::from_rows(&["xx"], 0, 0).unwrap();
    let dot = binary_from_rows(&["..x...."]).unwrap();
    let expected = binary_from_rows(&["..xx..."]).unwrap();
    rp.compare_regions(&expected, &dilate(&dot, &k, 7));

    let run = binary_from_rows(&["xxx...."]).unwrap();
    let expected = binary_from_rows(&[".xx...."]).unwrap();
    rp.compare_regions(&expected, &erode(&run, &k, 7));

    // Same kernel anchored on its right tap shifts the result the other way
    let k = BinaryKernel::from_rows(&["xx"], 1, 0).unwrap();
    let expected = binary_from_rows(&[".xx...."]).unwrap();
    rp.compare_regions(&expected, &dilate(&dot, &k, 7));

    assert!(rp.cleanup(), "binmorph_anchor regression test failed");
}

#[test]
fn binary_morph_reg_tiling() {
    let mut rp = RegParams::new("binmorph_tiling");

    let src = speckle(70, 41);
    let kernels = [
        BinaryKernel::brick(5, 3).unwrap(),
        BinaryKernel::cross(5).unwrap(),
        BinaryKernel::from_rows(&["x...x", ".x...", "...xx"], 3, 2).unwrap(),
        // Wider than one packed word
        BinaryKernel::brick(35, 1).unwrap(),
    ];
    for k in &kernels {
        let whole = dilate(&src, k, 128);
        for tile in [7, 16, 33] {
            rp.compare_regions(&whole, &dilate(&src, k, tile));
        }
        let whole = erode(&src, k, 128);
        for tile in [7, 16, 33] {
            rp.compare_regions(&whole, &erode(&src, k, tile));
        }
    }

    assert!(rp.cleanup(), "binmorph_tiling regression test failed");
}

#[test]
fn binary_morph_reg_duality() {
    let mut rp = RegParams::new("binmorph_duality");

    let src = speckle(40, 20);
    let inverted = PixelRegion::from_fn(src.rect(), 1, ElementType::Bit, Layout::packed(40), |x, y, _| {
        if src.get_bit(x, y) == Some(true) { 0.0 } else { 1.0 }
    })
    .unwrap();
    let k = BinaryKernel::from_rows(&["xx.", ".xx", "..x"], 1, 1).unwrap();

    let eroded = erode(&src, &k, 16);
    let layout = ImageLayout::like(&inverted, 16, 16).unwrap();
    let dual = BinaryMorph::dilate(
        Extended::new(inverted, BorderExtender::Constant(vec![1.0])),
        &k,
        layout,
    )
    .unwrap();
    let dual = render(&dual).unwrap();

    let rect = src.rect();
    let mut mismatches = 0;
    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            if eroded.get_bit(x, y) == dual.get_bit(x, y) {
                mismatches += 1;
            }
        }
    }
    rp.compare_values(0.0, mismatches as f64, 0.0);

    assert!(rp.cleanup(), "binmorph_duality regression test failed");
}

#[test]
fn binary_morph_reg_errors() {
    let mut rp = RegParams::new("binmorph_errors");

    let src = binary_filled(4, 3, true).unwrap();
    let layout = ImageLayout::like(&src, 4, 3).unwrap();
    let too_tall = BinaryKernel::brick(1, 4).unwrap();
    let result = BinaryMorph::dilate(src.clone(), &too_tall, layout.clone());
    rp.compare_values(
        1.0,
        matches!(result, Err(MorphError::KernelTooLarge { .. })) as u8 as f64,
        0.0,
    );

    // Exactly the image size is allowed
    let fits = BinaryKernel::brick(4, 3).unwrap();
    rp.compare_values(1.0, BinaryMorph::erode(src, &fits, layout).is_ok() as u8 as f64, 0.0);

    assert!(rp.cleanup(), "binmorph_errors regression test failed");
}

#[test]
fn binary_morph_reg_wide_kernels() {
    let mut rp = RegParams::new("binmorph_wide");

    let sparse = speckle(150, 13);
    let full = dense(150, 13);
    let kernels = [
        BinaryKernel::new(35, 3, 29, 0, vec![true; 105]).unwrap(),
        BinaryKernel::new(70, 2, 11, 1, vec![true; 140]).unwrap(),
        BinaryKernel::new(64, 1, 63, 0, vec![true; 64]).unwrap(),
        gapped(41, 2, 6, 1),
    ];
    let area = (150 * 13) as f64;
    for k in &kernels {
        let expected = reference(&sparse, k, true);
        for tile in [9, 100] {
            rp.compare_regions(&expected, &dilate(&sparse, k, tile));
        }

        let expected = reference(&full, k, false);
        // The dense image leaves some pixels on and some off
        let on = count_set(&expected) as f64;
        rp.compare_values(1.0, (on > 0.0 && on < area) as u8 as f64, 0.0);
        for tile in [9, 100] {
            rp.compare_regions(&expected, &erode(&full, k, tile));
        }
    }

    assert!(rp.cleanup(), "binmorph_wide regression test failed");
}
