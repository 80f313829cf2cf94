//! tessera-stats - Streaming image statistics
//!
//! Statistics are accumulated tile by tile over an optional region of
//! interest and a subsampling grid anchored at a fixed origin:
//!
//! - Per-band mean
//! - Per-band histograms with moments, entropy, p-tile and Otsu thresholds
//! - Per-band extrema
//! - A pass-through operator that computes requested statistics lazily and
//!   publishes them as named properties

mod error;
pub mod extrema;
pub mod histogram;
pub mod mean;
pub mod op;
pub mod sampling;

pub use error::{StatsError, StatsResult};
pub use extrema::Extrema;
pub use histogram::{Histogram, HistogramSpec};
pub use mean::MeanAccumulator;
pub use op::{StatisticRequest, StatisticState, StatisticsOp};
pub use sampling::{SamplingGrid, start_position};
