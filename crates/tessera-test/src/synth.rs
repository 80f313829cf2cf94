//! Synthetic test regions
//!
//! Fixtures are built in memory so the tests need no image files.

use tessera_core::{ElementType, Layout, PixelRegion, Rect};

use crate::error::{TestError, TestResult};

/// Build a 1-bit region at the origin from ASCII rows
///
/// `x`, `X`, `#` and `1` are set; `.` and `0` are clear. All rows must have
/// the same length.
pub fn binary_from_rows(rows: &[&str]) -> TestResult<PixelRegion> {
    let width = rows.first().map_or(0, |r| r.chars().count());
    let mut region = PixelRegion::new_binary(Rect::sized(width as i32, rows.len() as i32))?;
    for (y, row) in rows.iter().enumerate() {
        if row.chars().count() != width {
            return Err(TestError::InvalidPattern {
                row: y,
                message: format!("expected {} columns", width),
            });
        }
        for (x, c) in row.chars().enumerate() {
            let on = match c {
                'x' | 'X' | '#' | '1' => true,
                '.' | '0' => false,
                other => {
                    return Err(TestError::InvalidPattern {
                        row: y,
                        message: format!("unexpected character {:?}", other),
                    });
                }
            };
            region.set_bit(x as i32, y as i32, on)?;
        }
    }
    Ok(region)
}

/// Build a 1-bit region with every sample set to `on`
pub fn binary_filled(width: i32, height: i32, on: bool) -> TestResult<PixelRegion> {
    let rect = Rect::sized(width, height);
    Ok(PixelRegion::from_fn(
        rect,
        1,
        ElementType::Bit,
        Layout::packed(width),
        |_, _, _| if on { 1.0 } else { 0.0 },
    )?)
}

/// Build a single-band diagonal ramp from 0 at the top left to `max`
pub fn gradient_region(width: i32, height: i32, element: ElementType, max: f64) -> TestResult<PixelRegion> {
    let span = (width + height - 2).max(1) as f64;
    Ok(PixelRegion::from_fn(
        Rect::sized(width, height),
        1,
        element,
        Layout::Banded,
        |x, y, _| (x + y) as f64 * max / span,
    )?)
}

/// Build a banded region with every sample set to `value`
pub fn constant_region(rect: Rect, bands: usize, element: ElementType, value: f64) -> TestResult<PixelRegion> {
    Ok(PixelRegion::from_fn(
        rect,
        bands,
        element,
        Layout::Banded,
        |_, _, _| value,
    )?)
}

/// Build an interleaved 3-band byte region from a color function
pub fn rgb_region<F>(width: i32, height: i32, f: F) -> TestResult<PixelRegion>
where
    F: Fn(i32, i32) -> [u8; 3],
{
    Ok(PixelRegion::from_fn(
        Rect::sized(width, height),
        3,
        ElementType::Byte,
        Layout::Interleaved,
        |x, y, b| f(x, y)[b] as f64,
    )?)
}

/// Render band 0 of a region as ASCII art
///
/// 1-bit regions print `x` and `.`; other types print values.
pub fn render_ascii(region: &PixelRegion) -> String {
    let rect = region.rect();
    let mut out = String::new();
    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            let v = region.get(x, y, 0).unwrap_or(0.0);
            if region.element_type() == ElementType::Bit {
                out.push(if v != 0.0 { 'x' } else { '.' });
            } else {
                out.push_str(&format!("{:>6.1}", v));
            }
        }
        out.push('\n');
    }
    out
}

/// Serialize every sample of a region as text
///
/// The first line holds the rectangle, band count and element type; each
/// following line is one row, bands of a pixel joined by `,`.
pub fn region_text(region: &PixelRegion) -> String {
    let rect = region.rect();
    let mut out = format!(
        "{} {} {} {} {} {:?}\n",
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        region.bands(),
        region.element_type()
    );
    for y in rect.y..rect.bottom() {
        let row: Vec<String> = (rect.x..rect.right())
            .map(|x| {
                (0..region.bands())
                    .map(|b| format!("{}", region.get(x, y, b).unwrap_or(0.0)))
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect();
        out.push_str(&row.join(" "));
        out.push('\n');
    }
    out
}
