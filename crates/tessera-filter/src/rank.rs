//! Rank filtering operations
//!
//! Min, max and median filters over a square, plus-shaped or X-shaped
//! neighborhood, or as a separable row pass followed by a column pass. The
//! shape is resolved into a [`Footprint`] once, when the filter is built.

use std::cmp::Ordering;

use log::debug;
use tessera_core::{
    AreaExtent, ElementType, ImageLayout, PixelRegion, Rect, RegionSource, Sample, TileOp,
    WorkingBuffer, materialize, materialize_mut,
};

use crate::convolve::check_layout;
use crate::{FilterError, FilterResult};

/// Order statistic selected from the neighborhood
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankKind {
    Min,
    Max,
    Median,
}

/// Neighborhood shape within the `size` x `size` mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterShape {
    /// Every pixel of the mask
    Square,
    /// The center row and column
    Plus,
    /// Both diagonals
    X,
    /// A row pass, then a column pass over the row results
    Separable,
}

/// Resolved sampling strategy of a rank filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Footprint {
    /// Offsets from the center pixel
    Offsets(Vec<(i32, i32)>),
    /// Row pass then column pass, each of half-width `half`
    Separable { half: i32 },
}

impl Footprint {
    /// Resolve `shape` for an odd mask `size`
    pub fn resolve(shape: FilterShape, size: u32) -> Self {
        let half = (size / 2) as i32;
        let keep = |dx: i32, dy: i32| match shape {
            FilterShape::Square => true,
            FilterShape::Plus => dx == 0 || dy == 0,
            FilterShape::X => dx.abs() == dy.abs(),
            FilterShape::Separable => false,
        };
        match shape {
            FilterShape::Separable => Footprint::Separable { half },
            _ => Footprint::Offsets(
                (-half..=half)
                    .flat_map(|dy| (-half..=half).map(move |dx| (dx, dy)))
                    .filter(|&(dx, dy)| keep(dx, dy))
                    .collect(),
            ),
        }
    }
}

/// Min, max or median filter
pub struct RankFilter<S> {
    source: S,
    kind: RankKind,
    footprint: Footprint,
    extent: AreaExtent,
    layout: ImageLayout,
}

impl<S: RegionSource> RankFilter<S> {
    /// Create a rank filter with an odd mask `size`
    ///
    /// # Errors
    ///
    /// Fails for an even or zero size, or when the layout's bands or element
    /// type differ from the source's.
    pub fn new(
        source: S,
        kind: RankKind,
        shape: FilterShape,
        size: u32,
        layout: ImageLayout,
    ) -> FilterResult<Self> {
        if size == 0 || size % 2 == 0 {
            return Err(FilterError::InvalidParameters(format!(
                "rank mask size must be odd, got {}",
                size
            )));
        }
        check_layout(&source, &layout)?;
        let footprint = Footprint::resolve(shape, size);
        let extent = AreaExtent::symmetric((size / 2) as i32)?;
        debug!(
            "RankFilter::new {:?} {:?} size {} taps {}",
            kind,
            shape,
            size,
            match &footprint {
                Footprint::Offsets(o) => o.len(),
                Footprint::Separable { .. } => 2 * size as usize,
            }
        );
        Ok(Self {
            source,
            kind,
            footprint,
            extent,
            layout,
        })
    }

    pub fn kind(&self) -> RankKind {
        self.kind
    }

    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    /// Neighborhood contract of the mask
    pub fn extent(&self) -> AreaExtent {
        self.extent
    }

    fn run<T: Sample>(&self, src: &PixelRegion, out: &mut PixelRegion) -> FilterResult<()> {
        let input = materialize::<T>(src, src.rect(), false)?;
        let mut output = materialize_mut::<T>(out, out.rect(), false)?;
        for band in 0..input.bands() {
            match &self.footprint {
                Footprint::Offsets(offsets) => {
                    self.offsets_pass(&input, &mut output, band, offsets)?
                }
                Footprint::Separable { half } => {
                    self.separable_pass(&input, &mut output, band, *half)?
                }
            }
        }
        output.flush()?;
        Ok(())
    }

    fn offsets_pass<T: Sample>(
        &self,
        input: &WorkingBuffer<'_, T>,
        output: &mut WorkingBuffer<'_, T>,
        band: usize,
        offsets: &[(i32, i32)],
    ) -> FilterResult<()> {
        let dest = output.rect();
        let mut window = Vec::with_capacity(offsets.len());
        for y in dest.y..dest.bottom() {
            for x in dest.x..dest.right() {
                window.clear();
                window.extend(offsets.iter().map(|&(dx, dy)| input.get(x + dx, y + dy, band)));
                output.set(x, y, band, select(&mut window, self.kind))?;
            }
        }
        Ok(())
    }

    fn separable_pass<T: Sample>(
        &self,
        input: &WorkingBuffer<'_, T>,
        output: &mut WorkingBuffer<'_, T>,
        band: usize,
        half: i32,
    ) -> FilterResult<()> {
        let src = input.rect();
        let dest = output.rect();
        let dw = dest.width as usize;
        let mut window = Vec::with_capacity((2 * half + 1) as usize);

        // rows[r * dw + i] holds the row pass of source row r at dest column i
        let mut rows = Vec::with_capacity(src.height as usize * dw);
        for y in src.y..src.bottom() {
            for x in dest.x..dest.right() {
                window.clear();
                window.extend((-half..=half).map(|dx| input.get(x + dx, y, band)));
                rows.push(select(&mut window, self.kind));
            }
        }
        for y in dest.y..dest.bottom() {
            let top = (y - half - src.y) as usize;
            for (i, x) in (dest.x..dest.right()).enumerate() {
                window.clear();
                window.extend((0..=2 * half as usize).map(|j| rows[(top + j) * dw + i]));
                output.set(x, y, band, select(&mut window, self.kind))?;
            }
        }
        Ok(())
    }
}

impl<S: RegionSource> TileOp for RankFilter<S> {
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
            ElementType::Bit | ElementType::Byte => self.run::<u8>(&src, &mut out)?,
            ElementType::UShort => self.run::<u16>(&src, &mut out)?,
            ElementType::Short => self.run::<i16>(&src, &mut out)?,
            ElementType::Int => self.run::<i32>(&src, &mut out)?,
            ElementType::Float => self.run::<f32>(&src, &mut out)?,
            ElementType::Double => self.run::<f64>(&src, &mut out)?,
        }
        Ok(out)
    }
}

fn order<T: Sample>(a: &T, b: &T) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Pick the order statistic of `values`; the slice is reordered
fn select<T: Sample>(values: &mut [T], kind: RankKind) -> T {
    match kind {
        RankKind::Min => values.iter().copied().min_by(order).unwrap_or_default(),
        RankKind::Max => values.iter().copied().max_by(order).unwrap_or_default(),
        RankKind::Median => {
            if values.is_empty() {
                return T::default();
            }
            let mid = values.len() / 2;
            *values.select_nth_unstable_by(mid, order).1
        }
    }
}
