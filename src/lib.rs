//! # Covidboard
//!
//! Data core of a COVID-19 dashboard: turns raw per-region time series into
//! map-ready region values, summary totals and chart series.
//!
//! ## Modules
//!
//! - [`data`]: Feed records, typed GeoJSON regions, location histories, loading
//! - [`pipeline`]: Snapshot builder, feature annotator, totals reducer, series formatter
//! - [`display`]: Number, date, tooltip and hover label formatting
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust
//! use covidboard::data::{RawRecord, RegionCollection, RegionFeature, RegionProperties};
//! use covidboard::pipeline::{aggregate_totals, build_snapshot, annotate, SnapshotFilter};
//! use chrono::{TimeZone, Utc};
//!
//! let records = vec![RawRecord::new("jhu", "Illinois", "17031")
//!     .observation("2020-03-01", 5.0, 0.0)
//!     .observation("2020-03-02", 7.0, 1.0)];
//! let counties = RegionCollection::new(vec![
//!     RegionFeature::new(RegionProperties::new("17031").scope("Illinois")),
//!     RegionFeature::new(RegionProperties::new("17043").scope("Illinois")),
//! ]);
//!
//! let target = Utc.with_ymd_and_hms(2020, 3, 2, 0, 0, 0).unwrap();
//! let snapshot = build_snapshot(&records, target, &SnapshotFilter::new("jhu", "Illinois"));
//! let annotated = annotate(&counties, &snapshot);
//! let totals = aggregate_totals(&annotated, "Illinois");
//!
//! assert_eq!(totals.confirmed.subset, 7.0);
//! assert_eq!(annotated.features[1].properties.confirmed, None);
//! ```

pub mod config;
pub mod data;
pub mod display;
pub mod pipeline;

pub use data::{
    DataError, DataResult, DailyCounts, Metric, MetricValue, RawRecord, RegionCollection,
    RegionFeature, RegionProperties, SelectedLocationSeries,
};

pub use pipeline::{
    aggregate_totals, annotate, build_snapshot, format_series, map_view, scale_max,
    AggregateTotals, AnnotationCache, FormattedSeries, MapView, MetricMaxes, QueryContext,
    RegionMetrics, RegionSnapshot, SeriesPoint, SnapshotFilter, Tab,
};

pub use display::{hover_label, location_tooltip, number_with_commas, HoverInfo, Tooltip};

pub use config::{generate_default_config, Config, ConfigError, LoggingConfig};
