//! Feature Annotator
//!
//! Merges a region snapshot into the static county geometry so the map can
//! color each region. The geometry is shared across renders and is never
//! modified; every call produces a new collection.

use crate::data::{RawRecord, RegionCollection, RegionFeature};
use crate::pipeline::snapshot::{build_snapshot, RegionSnapshot, SnapshotFilter};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Scale upper bound used when no region has a confirmed count
pub const DEFAULT_SCALE_MAX: f64 = 2.0;

/// Annotate `geometry` with the snapshot's values
///
/// Feature count and order are preserved. Regions missing from the
/// snapshot keep the properties they came with, so "no data" stays unset
/// instead of turning into zero.
pub fn annotate(geometry: &RegionCollection, snapshot: &RegionSnapshot) -> RegionCollection {
    let mut matched = 0usize;

    let features = geometry
        .iter()
        .map(|feature| {
            let metrics = feature
                .properties
                .region_key
                .as_deref()
                .and_then(|key| snapshot.get(key));

            match metrics {
                Some(metrics) => {
                    matched += 1;
                    let mut annotated = feature.clone();
                    annotated.properties.confirmed = metrics.confirmed;
                    annotated.properties.deaths = metrics.deaths;
                    annotated
                }
                None => feature.clone(),
            }
        })
        .collect::<Vec<RegionFeature>>();

    tracing::debug!(
        "Annotated {} of {} features from a {}-region snapshot",
        matched,
        features.len(),
        snapshot.len()
    );
    RegionCollection::new(features)
}

/// Upper bound of the choropleth color scale
///
/// The largest confirmed count on the map, or `fallback` when no feature
/// has one.
pub fn scale_max(collection: &RegionCollection, fallback: f64) -> f64 {
    collection
        .iter()
        .filter_map(|f| f.properties.confirmed)
        .filter(|v| !v.is_nan())
        .fold(None, |max: Option<f64>, v| Some(max.map_or(v, |m| m.max(v))))
        .unwrap_or(fallback)
}

struct CacheEntry {
    records: Arc<Vec<RawRecord>>,
    target: DateTime<Utc>,
    filter: SnapshotFilter,
    annotated: Arc<RegionCollection>,
}

impl CacheEntry {
    fn is_fresh(
        &self,
        records: &Arc<Vec<RawRecord>>,
        target: DateTime<Utc>,
        filter: &SnapshotFilter,
    ) -> bool {
        Arc::ptr_eq(&self.records, records)
            && self.target == target
            && &self.filter == filter
            && !self.annotated.is_empty()
    }
}

/// Memoized annotation for a hosting view
///
/// Keyed on the identity of the raw dataset (`Arc` pointer), the snapshot
/// instant and the filters. An empty cached result is always recomputed.
pub struct AnnotationCache {
    geometry: Arc<RegionCollection>,
    entry: Option<CacheEntry>,
    computations: usize,
}

impl AnnotationCache {
    /// Create a cache over shared static geometry
    pub fn new(geometry: Arc<RegionCollection>) -> Self {
        Self {
            geometry,
            entry: None,
            computations: 0,
        }
    }

    /// Get the annotated collection, recomputing only when the key changed
    pub fn get(
        &mut self,
        records: &Arc<Vec<RawRecord>>,
        target: DateTime<Utc>,
        filter: &SnapshotFilter,
    ) -> Arc<RegionCollection> {
        if let Some(entry) = &self.entry {
            if entry.is_fresh(records, target, filter) {
                tracing::trace!("Annotation cache hit");
                return Arc::clone(&entry.annotated);
            }
        }

        let snapshot = build_snapshot(records, target, filter);
        let annotated = Arc::new(annotate(&self.geometry, &snapshot));
        self.computations += 1;

        self.entry = Some(CacheEntry {
            records: Arc::clone(records),
            target,
            filter: filter.clone(),
            annotated: Arc::clone(&annotated),
        });
        annotated
    }

    /// Drop the cached result
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Number of times the annotation has been computed
    pub fn computations(&self) -> usize {
        self.computations
    }

    /// The shared geometry this cache annotates
    pub fn geometry(&self) -> &Arc<RegionCollection> {
        &self.geometry
    }
}
