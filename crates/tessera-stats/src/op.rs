//! Statistics operator
//!
//! [`StatisticsOp`] passes its source's pixels through unchanged and
//! exposes named statistics of them as properties. The first property
//! query visits every tile of the layout once; the result is cached and
//! every later query returns the same state.

use std::sync::{Mutex, OnceLock, PoisonError};

use log::debug;
use tessera_core::{ImageLayout, PixelRegion, Rect, RegionSource, TileOp};

use crate::extrema::Extrema;
use crate::histogram::{Histogram, HistogramSpec};
use crate::mean::MeanAccumulator;
use crate::sampling::SamplingGrid;
use crate::{StatsError, StatsResult};

/// A statistic to compute
#[derive(Debug, Clone, PartialEq)]
pub enum StatisticRequest {
    Mean,
    Histogram(HistogramSpec),
    Extrema,
}

impl StatisticRequest {
    /// Property name under which the result is published
    pub fn name(&self) -> &'static str {
        match self {
            StatisticRequest::Mean => "mean",
            StatisticRequest::Histogram(_) => "histogram",
            StatisticRequest::Extrema => "extrema",
        }
    }
}

/// Running state of one statistic
#[derive(Debug, Clone, PartialEq)]
pub enum StatisticState {
    Mean(MeanAccumulator),
    Histogram(Histogram),
    Extrema(Extrema),
}

impl StatisticState {
    /// Fresh state for `request` over `bands` bands
    pub fn create(request: &StatisticRequest, bands: usize) -> StatsResult<Self> {
        Ok(match request {
            StatisticRequest::Mean => StatisticState::Mean(MeanAccumulator::new(bands)),
            StatisticRequest::Histogram(spec) => {
                if spec.bands() != bands {
                    return Err(StatsError::BandMismatch {
                        expected: bands,
                        actual: spec.bands(),
                    });
                }
                StatisticState::Histogram(Histogram::new(spec.clone()))
            }
            StatisticRequest::Extrema => StatisticState::Extrema(Extrema::new(bands)),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            StatisticState::Mean(_) => "mean",
            StatisticState::Histogram(_) => "histogram",
            StatisticState::Extrema(_) => "extrema",
        }
    }

    /// Fold the sampled pixels of one region into the state
    pub fn accumulate(&mut self, region: &PixelRegion, grid: &SamplingGrid) -> StatsResult<()> {
        match self {
            StatisticState::Mean(m) => m.accumulate(region, grid),
            StatisticState::Histogram(h) => h.accumulate(region, grid),
            StatisticState::Extrema(e) => e.accumulate(region, grid),
        }
    }

    pub fn as_mean(&self) -> Option<&MeanAccumulator> {
        match self {
            StatisticState::Mean(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_histogram(&self) -> Option<&Histogram> {
        match self {
            StatisticState::Histogram(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_extrema(&self) -> Option<&Extrema> {
        match self {
            StatisticState::Extrema(e) => Some(e),
            _ => None,
        }
    }
}

/// Pass-through operator publishing statistics of its source
pub struct StatisticsOp<S> {
    source: S,
    layout: ImageLayout,
    grid: SamplingGrid,
    requests: Vec<StatisticRequest>,
    states: OnceLock<Vec<StatisticState>>,
    computing: Mutex<()>,
}

impl<S: RegionSource> StatisticsOp<S> {
    /// Create the operator
    ///
    /// `layout` is the source's tile grid and is used both for pass-through
    /// tiles and for the statistics pass.
    ///
    /// # Errors
    ///
    /// Fails when the layout or a histogram request disagrees with the
    /// source band count, and when a statistic is requested twice.
    pub fn new(
        source: S,
        layout: ImageLayout,
        grid: SamplingGrid,
        requests: Vec<StatisticRequest>,
    ) -> StatsResult<Self> {
        if layout.bands() != source.bands() {
            return Err(StatsError::BandMismatch {
                expected: source.bands(),
                actual: layout.bands(),
            });
        }
        for (i, r) in requests.iter().enumerate() {
            StatisticState::create(r, source.bands())?;
            if requests[..i].iter().any(|q| q.name() == r.name()) {
                return Err(StatsError::InvalidParameters(format!(
                    "statistic {:?} requested twice",
                    r.name()
                )));
            }
        }
        Ok(Self {
            source,
            layout,
            grid,
            requests,
            states: OnceLock::new(),
            computing: Mutex::new(()),
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn grid(&self) -> &SamplingGrid {
        &self.grid
    }

    pub fn requests(&self) -> &[StatisticRequest] {
        &self.requests
    }

    /// Look up a computed statistic by name
    ///
    /// The first call runs the statistics pass.
    pub fn property(&self, name: &str) -> StatsResult<&StatisticState> {
        self.states()?
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| StatsError::UnknownProperty(name.to_string()))
    }

    /// Every computed statistic, in request order
    pub fn states(&self) -> StatsResult<&[StatisticState]> {
        if let Some(states) = self.states.get() {
            return Ok(states);
        }
        // Concurrent first callers wait here for a single pass
        let _guard = self.computing.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(states) = self.states.get() {
            return Ok(states);
        }
        let computed = self.compute()?;
        Ok(self.states.get_or_init(|| computed))
    }

    fn compute(&self) -> StatsResult<Vec<StatisticState>> {
        let bands = self.source.bands();
        let mut states = self
            .requests
            .iter()
            .map(|r| StatisticState::create(r, bands))
            .collect::<StatsResult<Vec<_>>>()?;

        let (mut visited, mut skipped) = (0usize, 0usize);
        let mut samples = 0u64;
        for tile in self.layout.tiles() {
            let Some(sampled) = self.grid.sampled_rect(tile) else {
                skipped += 1;
                continue;
            };
            samples += self.grid.sample_count(sampled);
            let region = self.source.get_data(tile)?;
            for state in states.iter_mut() {
                state.accumulate(&region, &self.grid)?;
            }
            visited += 1;
        }
        debug!(
            "StatisticsOp {:?}: {} tiles visited, {} skipped, {} samples",
            self.requests.iter().map(|r| r.name()).collect::<Vec<_>>(),
            visited,
            skipped,
            samples
        );
        Ok(states)
    }
}

impl<S: RegionSource> TileOp for StatisticsOp<S> {
    type Error = StatsError;

    fn layout(&self) -> &ImageLayout {
        &self.layout
    }

    fn compute_tile(&self, dest: Rect) -> StatsResult<PixelRegion> {
        Ok(self.source.get_data(dest)?)
    }
}
