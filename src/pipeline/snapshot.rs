//! Region Snapshot Builder
//!
//! Collapses the raw time-series feed into one value per region for a single
//! instant, filtered to one data source and one province/state.

use crate::data::{parse_date, RawRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metric values of one region at the snapshot instant
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RegionMetrics {
    pub confirmed: Option<f64>,
    pub deaths: Option<f64>,
}

impl RegionMetrics {
    pub fn new(confirmed: f64, deaths: f64) -> Self {
        Self {
            confirmed: Some(confirmed),
            deaths: Some(deaths),
        }
    }
}

/// Which records are eligible for a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotFilter {
    /// Required `project_id` of the record
    pub source_id: String,
    /// Required `province_state` of the record
    pub region_scope: String,
}

impl SnapshotFilter {
    pub fn new(source_id: impl Into<String>, region_scope: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            region_scope: region_scope.into(),
        }
    }

    /// Check if a record passes both filters
    pub fn matches(&self, record: &RawRecord) -> bool {
        record.source_id == self.source_id && record.region_scope == self.region_scope
    }
}

/// Region key → metrics at one instant
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct RegionSnapshot(BTreeMap<String, RegionMetrics>);

impl RegionSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, region_key: impl Into<String>, metrics: RegionMetrics) {
        self.0.insert(region_key.into(), metrics);
    }

    pub fn get(&self, region_key: &str) -> Option<&RegionMetrics> {
        self.0.get(region_key)
    }

    pub fn contains(&self, region_key: &str) -> bool {
        self.0.contains_key(region_key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RegionMetrics)> {
        self.0.iter()
    }
}

impl FromIterator<(String, RegionMetrics)> for RegionSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, RegionMetrics)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Build the per-region snapshot for `target`
///
/// Only dates equal to `target` to the millisecond match. When several
/// records carry the same region key, the last one wins. No match at all
/// yields an empty snapshot.
pub fn build_snapshot(
    records: &[RawRecord],
    target: DateTime<Utc>,
    filter: &SnapshotFilter,
) -> RegionSnapshot {
    let target_millis = target.timestamp_millis();
    let mut snapshot = RegionSnapshot::new();
    let mut eligible = 0usize;

    for record in records.iter().filter(|r| filter.matches(r)) {
        let Some(region_key) = record.region_key.as_deref() else {
            tracing::debug!("Skipping {} record without a region key", record.region_scope);
            continue;
        };
        eligible += 1;

        if record.dates.len() != record.confirmed.len() || record.dates.len() != record.deaths.len()
        {
            tracing::warn!(
                "Region {}: {} dates, {} confirmed, {} deaths; using aligned prefix",
                region_key,
                record.dates.len(),
                record.confirmed.len(),
                record.deaths.len()
            );
        }

        for i in 0..record.aligned_len() {
            let matches = parse_date(&record.dates[i])
                .map(|d| d.timestamp_millis() == target_millis)
                .unwrap_or(false);
            if !matches {
                continue;
            }
            snapshot.insert(
                region_key,
                RegionMetrics {
                    confirmed: record.confirmed[i],
                    deaths: record.deaths[i],
                },
            );
        }
    }

    tracing::debug!(
        "Snapshot at {}: {} of {} eligible regions matched",
        target,
        snapshot.len(),
        eligible
    );
    snapshot
}

/// Latest date in the feed, read from its first record
pub fn latest_timestamp(records: &[RawRecord]) -> Option<DateTime<Utc>> {
    records
        .first()?
        .dates
        .iter()
        .filter_map(|d| parse_date(d))
        .max()
}

/// Snapshot instant to use: the feed's latest date, or `now` without data
pub fn resolve_target(records: &[RawRecord], now: DateTime<Utc>) -> DateTime<Utc> {
    latest_timestamp(records).unwrap_or(now)
}
