//! Dashboard Data Model
//!
//! - **types**: Feed records, typed map regions, location histories
//! - **time**: Date string parsing
//! - **loader**: Reading datasets from disk
//! - **error**: Loading errors

pub mod error;
pub mod loader;
pub mod time;
pub mod types;

pub use error::{DataError, DataResult};
pub use loader::{load_location_series, load_raw_records, load_regions, parse_regions};
pub use time::parse_date;
pub use types::{
    coerce_number, DailyCounts, Metric, MetricValue, RawRecord, RegionCollection, RegionFeature,
    RegionProperties, SelectedLocationSeries,
};
