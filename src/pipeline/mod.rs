//! Dashboard Data Pipeline
//!
//! Pure, synchronous transformations run once per render:
//!
//! - **snapshot**: raw feed → per-region values at one instant
//! - **annotate**: snapshot + static geometry → choropleth collection
//! - **totals**: collection → global and subset sums
//! - **series**: selected location history → sorted chart points + maxima
//!
//! # Data Flow
//!
//! ```text
//! RawRecord[] ──snapshot──► RegionSnapshot ──annotate──► RegionCollection
//!                                                              │
//!                                                           totals
//!                                                              ▼
//!                                                       AggregateTotals
//!
//! SelectedLocationSeries ──series──► FormattedSeries
//! ```
//!
//! # Example
//!
//! ```rust
//! use covidboard::data::{RawRecord, RegionCollection, RegionFeature, RegionProperties};
//! use covidboard::pipeline::{map_view, QueryContext};
//! use chrono::Utc;
//!
//! let records = vec![RawRecord::new("open-JHU", "Illinois", "17031")
//!     .observation("2020-03-02", 7.0, 1.0)];
//! let geometry = RegionCollection::new(vec![
//!     RegionFeature::new(RegionProperties::new("17031").scope("Illinois")),
//! ]);
//!
//! let view = map_view(&records, &geometry, &QueryContext::default(), Utc::now());
//! assert_eq!(view.scale_max, 7.0);
//! ```

pub mod annotate;
pub mod series;
pub mod snapshot;
pub mod totals;

pub use annotate::{annotate, scale_max, AnnotationCache, DEFAULT_SCALE_MAX};
pub use series::{format_series, FormattedSeries, MetricMaxes, SeriesPoint};
pub use snapshot::{
    build_snapshot, latest_timestamp, resolve_target, RegionMetrics, RegionSnapshot,
    SnapshotFilter,
};
pub use totals::{aggregate_totals, AggregateTotals, Counter, MetricTotal, Tab};

use crate::data::{RawRecord, RegionCollection};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything a pipeline call needs besides the data itself
#[derive(Debug, Clone, PartialEq)]
pub struct QueryContext {
    /// Source and scope filters for the snapshot
    pub filter: SnapshotFilter,
    /// Region name the subset totals are restricted to
    pub subset_name: String,
    /// Color scale bound when no region has data
    pub fallback_scale_max: f64,
}

impl Default for QueryContext {
    fn default() -> Self {
        Self {
            filter: SnapshotFilter::new("open-JHU", "Illinois"),
            subset_name: "Illinois".to_string(),
            fallback_scale_max: DEFAULT_SCALE_MAX,
        }
    }
}

/// Map data for one render
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    /// Instant the snapshot was taken at
    pub target: DateTime<Utc>,
    pub snapshot: RegionSnapshot,
    pub annotated: RegionCollection,
    pub scale_max: f64,
}

/// Summary of a map view, for logs and CLI output
#[derive(Debug, Clone, Serialize)]
pub struct MapViewSummary {
    pub target: DateTime<Utc>,
    pub regions_in_snapshot: usize,
    pub features: usize,
    pub features_with_data: usize,
    pub scale_max: f64,
}

impl MapView {
    pub fn summary(&self) -> MapViewSummary {
        MapViewSummary {
            target: self.target,
            regions_in_snapshot: self.snapshot.len(),
            features: self.annotated.len(),
            features_with_data: self
                .annotated
                .iter()
                .filter(|f| f.properties.confirmed.is_some())
                .count(),
            scale_max: self.scale_max,
        }
    }
}

/// Run snapshot → annotate → scale for the subset map
///
/// The snapshot instant is the feed's latest date, or `now` when the feed is
/// empty.
pub fn map_view(
    records: &[RawRecord],
    geometry: &RegionCollection,
    ctx: &QueryContext,
    now: DateTime<Utc>,
) -> MapView {
    let target = resolve_target(records, now);
    let snapshot = build_snapshot(records, target, &ctx.filter);
    let annotated = annotate(geometry, &snapshot);
    let scale_max = scale_max(&annotated, ctx.fallback_scale_max);

    MapView {
        target,
        snapshot,
        annotated,
        scale_max,
    }
}
