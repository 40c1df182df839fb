//! Aggregate Totals Reducer
//!
//! Sums confirmed/deaths/recovered over a feature collection for the
//! dashboard's summary counters: once globally and once restricted to the
//! configured subset region (Illinois).

use crate::data::{Metric, RegionCollection};
use serde::Serialize;

/// One metric's sum, globally and within the subset region
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MetricTotal {
    pub global: f64,
    pub subset: f64,
}

/// Totals for all three metrics
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AggregateTotals {
    pub confirmed: MetricTotal,
    pub deaths: MetricTotal,
    pub recovered: MetricTotal,
}

impl AggregateTotals {
    pub fn get(&self, metric: Metric) -> &MetricTotal {
        match metric {
            Metric::Confirmed => &self.confirmed,
            Metric::Deaths => &self.deaths,
            Metric::Recovered => &self.recovered,
        }
    }

    fn get_mut(&mut self, metric: Metric) -> &mut MetricTotal {
        match metric {
            Metric::Confirmed => &mut self.confirmed,
            Metric::Deaths => &mut self.deaths,
            Metric::Recovered => &mut self.recovered,
        }
    }

    /// Summary counters shown at the top of a dashboard tab
    pub fn counters(&self, tab: Tab) -> Vec<Counter> {
        match tab {
            Tab::Subset => vec![
                Counter::new("Total Confirmed", self.confirmed.subset),
                Counter::new("Total Deaths", self.deaths.subset),
            ],
            Tab::World => vec![
                Counter::new("Total Confirmed", self.confirmed.global),
                Counter::new("Total Deaths", self.deaths.global),
                Counter::new("Total Recovered", self.recovered.global),
            ],
        }
    }
}

/// Dashboard tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    /// The configured subset region (the Illinois tab)
    Subset,
    /// The whole world
    World,
}

/// A labelled summary count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Counter {
    pub label: String,
    pub value: f64,
}

impl Counter {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Sum every metric over `collection` in one pass
///
/// Unset, zero and NaN values contribute nothing. A feature counts toward
/// the subset sums when its `region_scope` equals `subset_name`.
pub fn aggregate_totals(collection: &RegionCollection, subset_name: &str) -> AggregateTotals {
    let mut totals = AggregateTotals::default();

    for feature in collection.iter() {
        let props = &feature.properties;
        let in_subset = props.region_scope.as_deref() == Some(subset_name);

        for metric in Metric::all() {
            let Some(value) = props.get(*metric).filter(|v| *v != 0.0 && !v.is_nan()) else {
                continue;
            };
            let total = totals.get_mut(*metric);
            total.global += value;
            if in_subset {
                total.subset += value;
            }
        }
    }

    tracing::debug!(
        "Totals over {} features: confirmed {} ({} in {})",
        collection.len(),
        totals.confirmed.global,
        totals.confirmed.subset,
        subset_name
    );
    totals
}
