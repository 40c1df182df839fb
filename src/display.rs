//! Display formatting for counters, tooltips and axis labels
//!
//! Tooltips read the raw location history, not the chart points, so a
//! suppressed count shows as `<5` rather than `0`.

use crate::data::{parse_date, Metric, MetricValue, RegionProperties, SelectedLocationSeries};
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "April", "May", "Jun", "Jul", "Aug", "Sept", "Oct", "Nov", "Dec",
];

/// Format a count with thousands separators (`1234567` → `1,234,567`)
pub fn number_with_commas(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let raw = if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    };

    let (sign, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Tooltip header date, e.g. `Mar 2, 2020`
pub fn tooltip_date(date: DateTime<Utc>) -> String {
    format!(
        "{} {}, {}",
        MONTH_NAMES[date.month0() as usize],
        date.day(),
        date.year()
    )
}

/// X-axis tick label, e.g. `3/2`
pub fn axis_tick(date: DateTime<Utc>) -> String {
    format!("{}/{}", date.month(), date.day())
}

/// Render a raw metric value for display
pub fn display_value(value: &MetricValue) -> String {
    match value {
        MetricValue::Count(v) => number_with_commas(*v),
        MetricValue::Placeholder(text) => text.clone(),
        MetricValue::Missing => String::new(),
    }
}

/// One tooltip row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipLine {
    pub metric: Metric,
    pub text: String,
}

/// Popup chart tooltip for one date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub header: String,
    pub lines: Vec<TooltipLine>,
}

/// Build the tooltip for `date_label` from the raw location history
///
/// Returns `None` when the series has no entry for the date.
pub fn location_tooltip(
    series: &SelectedLocationSeries,
    date_label: &str,
    metrics: &[Metric],
) -> Option<Tooltip> {
    let counts = series.data.get(date_label)?;
    let header = parse_date(date_label)
        .map(tooltip_date)
        .unwrap_or_else(|| date_label.to_string());

    let lines = metrics
        .iter()
        .map(|metric| TooltipLine {
            metric: *metric,
            text: format!("{}: {}", metric, display_value(counts.get(*metric))),
        })
        .collect();

    Some(Tooltip { header, lines })
}

/// Map hover popup contents
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverInfo {
    pub location_name: String,
    pub confirmed: f64,
}

impl std::fmt::Display for HoverInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} cases",
            self.location_name,
            number_with_commas(self.confirmed)
        )
    }
}

/// Hover popup for a county: `County, ST, USA` and its confirmed count
pub fn hover_label(props: &RegionProperties) -> HoverInfo {
    let parts = [props.region_name.as_deref(), props.state_code.as_deref()];
    let mut location_name: Vec<&str> = parts
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty() && *s != "null")
        .collect();
    location_name.push("USA");

    HoverInfo {
        location_name: location_name.join(", "),
        confirmed: props.confirmed.unwrap_or(0.0),
    }
}
