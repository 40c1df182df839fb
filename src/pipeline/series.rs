//! Time-Series Formatter
//!
//! Turns a selected location's date-keyed history into a chart-ready,
//! date-sorted sequence plus per-metric maxima for axis scaling.
//!
//! Placeholders chart as zero. The input series is only borrowed, so the
//! tooltip can still show the raw `"<5"` text for the same date.

use crate::data::{parse_date, Metric, SelectedLocationSeries};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

/// One chart point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// Date string as delivered (also the tooltip lookup key)
    pub date: String,
    pub confirmed: f64,
    pub deaths: f64,
    pub recovered: f64,
}

impl SeriesPoint {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Confirmed => self.confirmed,
            Metric::Deaths => self.deaths,
            Metric::Recovered => self.recovered,
        }
    }
}

/// Largest charted value per metric
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MetricMaxes {
    pub confirmed: f64,
    pub deaths: f64,
    pub recovered: f64,
}

impl MetricMaxes {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Confirmed => self.confirmed,
            Metric::Deaths => self.deaths,
            Metric::Recovered => self.recovered,
        }
    }

    fn observe(&mut self, metric: Metric, value: f64) {
        let slot = match metric {
            Metric::Confirmed => &mut self.confirmed,
            Metric::Deaths => &mut self.deaths,
            Metric::Recovered => &mut self.recovered,
        };
        *slot = slot.max(value);
    }

    /// Y-axis upper bound; `None` lets the chart pick one
    pub fn overall(&self) -> Option<f64> {
        let max = self.confirmed.max(self.deaths).max(self.recovered);
        (max > 0.0).then_some(max)
    }

    /// Whether the recovered line is worth drawing
    pub fn show_recovered(&self) -> bool {
        self.recovered > 0.0
    }
}

/// Chart-ready location history
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FormattedSeries {
    pub points: Vec<SeriesPoint>,
    pub maxes: MetricMaxes,
}

/// Format a location's history for the popup line chart
///
/// Every date is kept. Points are ordered by parsed date; dates that do not
/// parse go last, in key order.
pub fn format_series(series: &SelectedLocationSeries) -> FormattedSeries {
    let mut maxes = MetricMaxes::default();

    let mut keyed: Vec<(Option<DateTime<Utc>>, SeriesPoint)> = series
        .data
        .iter()
        .map(|(date, counts)| {
            for metric in Metric::all() {
                maxes.observe(*metric, counts.get(*metric).chart_value());
            }
            let point = SeriesPoint {
                date: date.clone(),
                confirmed: counts.confirmed.chart_value(),
                deaths: counts.deaths.chart_value(),
                recovered: counts.recovered.chart_value(),
            };
            (parse_date(date), point)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let unparsed = keyed.iter().filter(|(d, _)| d.is_none()).count();
    if unparsed > 0 {
        tracing::warn!("{} series dates could not be parsed; ordered last", unparsed);
    }

    FormattedSeries {
        points: keyed.into_iter().map(|(_, point)| point).collect(),
        maxes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DailyCounts, MetricValue};
    use serde_json::json;

    fn placeholder_series() -> SelectedLocationSeries {
        serde_json::from_value(json!({
            "title": "Cook, Illinois, USA",
            "data": {
                "2020-03-02": {"confirmed": "<5", "deaths": 0, "recovered": 0},
                "2020-03-01": {"confirmed": 10, "deaths": 1, "recovered": 2}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_placeholders_chart_as_zero() {
        let series = placeholder_series();
        let formatted = format_series(&series);

        assert_eq!(
            formatted.points,
            vec![
                SeriesPoint {
                    date: "2020-03-01".to_string(),
                    confirmed: 10.0,
                    deaths: 1.0,
                    recovered: 2.0,
                },
                SeriesPoint {
                    date: "2020-03-02".to_string(),
                    confirmed: 0.0,
                    deaths: 0.0,
                    recovered: 0.0,
                },
            ]
        );
        assert_eq!(
            formatted.maxes,
            MetricMaxes {
                confirmed: 10.0,
                deaths: 1.0,
                recovered: 2.0
            }
        );

        // source data is untouched for the tooltip
        assert_eq!(
            series.data["2020-03-02"].confirmed,
            MetricValue::Placeholder("<5".to_string())
        );
    }

    #[test]
    fn test_sorted_by_date_not_string() {
        let mut series = SelectedLocationSeries::default();
        for date in ["3/10/2020", "3/9/2020", "2020-03-11", "not a date"] {
            series.data.insert(date.to_string(), DailyCounts::default());
        }

        let formatted = format_series(&series);
        let dates: Vec<&str> = formatted.points.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["3/9/2020", "3/10/2020", "2020-03-11", "not a date"]);
    }

    #[test]
    fn test_all_placeholder_dates_are_kept() {
        let series: SelectedLocationSeries = serde_json::from_value(json!({
            "data": {
                "2020-04-01": {"confirmed": "<5", "deaths": "<5", "recovered": null},
                "2020-04-02": {}
            }
        }))
        .unwrap();

        let formatted = format_series(&series);
        assert_eq!(formatted.points.len(), 2);
        assert_eq!(formatted.maxes, MetricMaxes::default());
        assert_eq!(formatted.maxes.overall(), None);
        assert!(!formatted.maxes.show_recovered());
    }

    #[test]
    fn test_maxes_helpers() {
        let formatted = format_series(&placeholder_series());
        assert_eq!(formatted.maxes.overall(), Some(10.0));
        assert!(formatted.maxes.show_recovered());
        assert_eq!(formatted.points[0].get(Metric::Recovered), 2.0);
        assert_eq!(formatted.maxes.get(Metric::Deaths), 1.0);
    }

    #[test]
    fn test_empty_series() {
        let formatted = format_series(&SelectedLocationSeries::default());
        assert!(formatted.points.is_empty());
        assert_eq!(formatted.maxes, MetricMaxes::default());
    }
}
