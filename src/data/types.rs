//! Core data types for the dashboard data core
//!
//! This module defines the shapes delivered by the dashboard's data feeds:
//! - `RawRecord`: one region's flat time series
//! - `RegionFeature` / `RegionCollection`: typed GeoJSON features for the map
//! - `SelectedLocationSeries`: one location's per-date history for the popup chart
//! - `MetricValue`: a count or a placeholder such as `"<5"`

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// One row of the raw time-series feed
///
/// `dates`, `confirmed` and `deaths` are index-aligned. Field names follow
/// the feed (`project_id`, `province_state`, `FIPS`, `date`); camelCase
/// aliases are accepted as well.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawRecord {
    /// Data provenance tag (e.g. `open-JHU`)
    #[serde(
        rename = "project_id",
        alias = "sourceId",
        default,
        deserialize_with = "lenient_string"
    )]
    pub source_id: String,
    /// Province/state the region belongs to
    #[serde(
        rename = "province_state",
        alias = "regionScope",
        default,
        deserialize_with = "lenient_string"
    )]
    pub region_scope: String,
    /// Region identifier (county FIPS code); records without one are ignored
    #[serde(rename = "FIPS", alias = "regionKey", default, deserialize_with = "region_key")]
    pub region_key: Option<String>,
    /// Observation dates, as delivered
    #[serde(rename = "date", alias = "dates", default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub confirmed: Vec<Option<f64>>,
    #[serde(default)]
    pub deaths: Vec<Option<f64>>,
}

impl RawRecord {
    /// Create a record with empty series
    pub fn new(
        source_id: impl Into<String>,
        region_scope: impl Into<String>,
        region_key: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            region_scope: region_scope.into(),
            region_key: Some(region_key.into()),
            dates: Vec::new(),
            confirmed: Vec::new(),
            deaths: Vec::new(),
        }
    }

    /// Builder: append one observation
    pub fn observation(mut self, date: impl Into<String>, confirmed: f64, deaths: f64) -> Self {
        self.dates.push(date.into());
        self.confirmed.push(Some(confirmed));
        self.deaths.push(Some(deaths));
        self
    }

    /// Number of indices present in every aligned sequence
    pub fn aligned_len(&self) -> usize {
        self.dates.len().min(self.confirmed.len()).min(self.deaths.len())
    }
}

/// A single metric value as found in a location's history
///
/// Small counts are suppressed upstream and arrive as strings like `"<5"`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// An exact count
    Count(f64),
    /// A non-numeric stand-in (suppressed small count, etc.)
    Placeholder(String),
    /// No value for this metric
    #[default]
    Missing,
}

impl MetricValue {
    /// The numeric value, if this is a count
    pub fn as_count(&self) -> Option<f64> {
        match self {
            MetricValue::Count(v) => Some(*v),
            _ => None,
        }
    }

    /// Value used for charting: placeholders and missing values chart as 0
    pub fn chart_value(&self) -> f64 {
        self.as_count().unwrap_or(0.0)
    }
}

impl From<JsonValue> for MetricValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => MetricValue::Missing,
            JsonValue::Number(n) => match n.as_f64() {
                Some(v) => MetricValue::Count(v),
                None => MetricValue::Placeholder(n.to_string()),
            },
            JsonValue::String(s) => MetricValue::Placeholder(s),
            other => MetricValue::Placeholder(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for MetricValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(JsonValue::deserialize(deserializer)?.into())
    }
}

/// Metric values for one date of a location's history
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DailyCounts {
    #[serde(default)]
    pub confirmed: MetricValue,
    #[serde(default)]
    pub deaths: MetricValue,
    #[serde(default)]
    pub recovered: MetricValue,
}

impl DailyCounts {
    /// Look up one metric
    pub fn get(&self, metric: Metric) -> &MetricValue {
        match metric {
            Metric::Confirmed => &self.confirmed,
            Metric::Deaths => &self.deaths,
            Metric::Recovered => &self.recovered,
        }
    }
}

/// Full history of the location selected on the map
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectedLocationSeries {
    /// Popup title (location name)
    #[serde(default)]
    pub title: Option<String>,
    /// Date string → metric values
    #[serde(default)]
    pub data: BTreeMap<String, DailyCounts>,
}

/// The three metrics tracked by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Confirmed,
    Deaths,
    Recovered,
}

impl Metric {
    /// All metrics, in chart legend order
    pub fn all() -> &'static [Metric] {
        &[Metric::Confirmed, Metric::Deaths, Metric::Recovered]
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Confirmed => write!(f, "confirmed"),
            Metric::Deaths => write!(f, "deaths"),
            Metric::Recovered => write!(f, "recovered"),
        }
    }
}

/// Typed properties of a map region
///
/// Metrics are `None` when the region has no data, which is different from
/// a reported zero. Properties this type does not model are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegionProperties {
    pub region_key: Option<String>,
    pub region_scope: Option<String>,
    /// County name (`COUNTYNAME`)
    pub region_name: Option<String>,
    /// Two-letter state code (`STATE`)
    pub state_code: Option<String>,
    pub country_region: Option<String>,
    pub confirmed: Option<f64>,
    pub deaths: Option<f64>,
    pub recovered: Option<f64>,
    pub extra: JsonObject,
}

const KEY_NAMES: [&str; 3] = ["regionKey", "FIPS", "fips"];
const SCOPE_NAMES: [&str; 2] = ["regionScope", "province_state"];
const NAME_NAMES: [&str; 2] = ["COUNTYNAME", "regionName"];
const STATE_NAMES: [&str; 2] = ["STATE", "stateCode"];
const COUNTRY_NAMES: [&str; 2] = ["country_region", "countryRegion"];
const METRIC_NAMES: [&str; 3] = ["confirmed", "deaths", "recovered"];

impl RegionProperties {
    /// Create properties for a region key
    pub fn new(region_key: impl Into<String>) -> Self {
        Self {
            region_key: Some(region_key.into()),
            ..Default::default()
        }
    }

    /// Builder: set the province/state scope
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.region_scope = Some(scope.into());
        self
    }

    /// Builder: set a metric value
    pub fn metric(mut self, metric: Metric, value: f64) -> Self {
        *self.metric_mut(metric) = Some(value);
        self
    }

    /// Read a metric
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Confirmed => self.confirmed,
            Metric::Deaths => self.deaths,
            Metric::Recovered => self.recovered,
        }
    }

    fn metric_mut(&mut self, metric: Metric) -> &mut Option<f64> {
        match metric {
            Metric::Confirmed => &mut self.confirmed,
            Metric::Deaths => &mut self.deaths,
            Metric::Recovered => &mut self.recovered,
        }
    }

    /// Build typed properties from a GeoJSON properties object
    pub fn from_json(props: &JsonObject) -> Self {
        let known: Vec<&str> = [
            &KEY_NAMES[..],
            &SCOPE_NAMES[..],
            &NAME_NAMES[..],
            &STATE_NAMES[..],
            &COUNTRY_NAMES[..],
            &METRIC_NAMES[..],
        ]
        .concat();

        let extra = props
            .iter()
            .filter(|(k, _)| !known.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            region_key: first_string(props, &KEY_NAMES),
            region_scope: first_string(props, &SCOPE_NAMES),
            region_name: first_string(props, &NAME_NAMES),
            state_code: first_string(props, &STATE_NAMES),
            country_region: first_string(props, &COUNTRY_NAMES),
            confirmed: props.get("confirmed").and_then(coerce_number),
            deaths: props.get("deaths").and_then(coerce_number),
            recovered: props.get("recovered").and_then(coerce_number),
            extra,
        }
    }

    /// Write properties back under the feed's canonical names
    ///
    /// Unset metrics are omitted rather than written as zero.
    pub fn to_json(&self) -> JsonObject {
        let mut props = self.extra.clone();
        let strings = [
            ("FIPS", &self.region_key),
            ("province_state", &self.region_scope),
            ("COUNTYNAME", &self.region_name),
            ("STATE", &self.state_code),
            ("country_region", &self.country_region),
        ];
        for (name, value) in strings {
            if let Some(v) = value {
                props.insert(name.to_string(), JsonValue::String(v.clone()));
            }
        }
        for metric in Metric::all() {
            if let Some(v) = self.get(*metric) {
                props.insert(metric.to_string(), JsonValue::from(v));
            }
        }
        props
    }
}

/// One map region: optional geometry plus typed properties
#[derive(Debug, Clone, PartialEq)]
pub struct RegionFeature {
    pub id: Option<geojson::feature::Id>,
    pub geometry: Option<Geometry>,
    pub properties: RegionProperties,
}

impl RegionFeature {
    /// Create a geometry-less feature (handy for totals and tests)
    pub fn new(properties: RegionProperties) -> Self {
        Self {
            id: None,
            geometry: None,
            properties,
        }
    }
}

impl From<Feature> for RegionFeature {
    fn from(feature: Feature) -> Self {
        let properties = feature
            .properties
            .as_ref()
            .map(RegionProperties::from_json)
            .unwrap_or_default();
        Self {
            id: feature.id,
            geometry: feature.geometry,
            properties,
        }
    }
}

impl From<&RegionFeature> for Feature {
    fn from(feature: &RegionFeature) -> Self {
        Feature {
            bbox: None,
            geometry: feature.geometry.clone(),
            id: feature.id.clone(),
            properties: Some(feature.properties.to_json()),
            foreign_members: None,
        }
    }
}

/// Ordered collection of map regions
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegionCollection {
    pub features: Vec<RegionFeature>,
}

impl RegionCollection {
    pub fn new(features: Vec<RegionFeature>) -> Self {
        Self { features }
    }

    /// Convert a GeoJSON FeatureCollection, keeping feature order
    pub fn from_geojson(collection: FeatureCollection) -> Self {
        Self {
            features: collection.features.into_iter().map(RegionFeature::from).collect(),
        }
    }

    /// Convert back to GeoJSON for a map source
    pub fn to_geojson(&self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self.features.iter().map(Feature::from).collect(),
            foreign_members: None,
        }
    }

    /// Keep only the counties of one state, dropping excluded keys
    ///
    /// County reference geometry covers the whole country and includes
    /// pseudo-counties (e.g. `17999`) that have no shape worth drawing.
    pub fn restrict_to_state(&self, state_code: &str, excluded_keys: &[String]) -> Self {
        let features = self
            .features
            .iter()
            .filter(|f| f.properties.state_code.as_deref() == Some(state_code))
            .filter(|f| match &f.properties.region_key {
                Some(key) => !excluded_keys.contains(key),
                None => true,
            })
            .cloned()
            .collect();
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionFeature> {
        self.features.iter()
    }
}

/// Coerce a loosely-typed property to a number
///
/// Numbers pass through and numeric strings are parsed. Null, empty strings
/// and anything non-numeric are unset.
pub fn coerce_number(value: &JsonValue) -> Option<f64> {
    let n = match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                s.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    n.filter(|v| v.is_finite())
}

fn first_string(props: &JsonObject, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| props.get(*name))
        .find_map(json_to_key)
}

/// Render a string-or-number JSON value as a key string
fn json_to_key(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                n.as_f64().map(|f| {
                    if f.fract() == 0.0 && f.abs() < 1e15 {
                        format!("{}", f as i64)
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        _ => None,
    }
}

fn region_key<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(json_to_key(&JsonValue::deserialize(deserializer)?))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(json_to_key(&JsonValue::deserialize(deserializer)?).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_record_from_feed_json() {
        let record: RawRecord = serde_json::from_value(json!({
            "project_id": "open-JHU",
            "province_state": "Illinois",
            "FIPS": 17031,
            "date": ["2020-03-01", "2020-03-02"],
            "confirmed": [5, 7],
            "deaths": [0, null]
        }))
        .unwrap();

        assert_eq!(record.source_id, "open-JHU");
        assert_eq!(record.region_scope, "Illinois");
        assert_eq!(record.region_key.as_deref(), Some("17031"));
        assert_eq!(record.confirmed, vec![Some(5.0), Some(7.0)]);
        assert_eq!(record.deaths, vec![Some(0.0), None]);
        assert_eq!(record.aligned_len(), 2);
    }

    #[test]
    fn test_raw_record_camel_case_and_nulls() {
        let record: RawRecord = serde_json::from_value(json!({
            "sourceId": "jhu",
            "regionScope": null,
            "regionKey": "17043",
            "dates": ["2020-03-01"],
            "confirmed": [1]
        }))
        .unwrap();

        assert_eq!(record.source_id, "jhu");
        assert_eq!(record.region_scope, "");
        assert_eq!(record.region_key.as_deref(), Some("17043"));
        assert_eq!(record.aligned_len(), 0);
    }

    #[test]
    fn test_metric_value_shapes() {
        let counts: DailyCounts =
            serde_json::from_value(json!({"confirmed": "<5", "deaths": 3})).unwrap();
        assert_eq!(counts.confirmed, MetricValue::Placeholder("<5".to_string()));
        assert_eq!(counts.deaths, MetricValue::Count(3.0));
        assert_eq!(counts.recovered, MetricValue::Missing);
        assert_eq!(counts.confirmed.chart_value(), 0.0);

        let odd: MetricValue = serde_json::from_value(json!(true)).unwrap();
        assert_eq!(odd, MetricValue::Placeholder("true".to_string()));
    }

    #[test]
    fn test_properties_from_county_geometry() {
        let props = json!({
            "FIPS": "17031",
            "STATE": "IL",
            "COUNTYNAME": "Cook",
            "LON": -87.8
        });
        let props = RegionProperties::from_json(props.as_object().unwrap());

        assert_eq!(props.region_key.as_deref(), Some("17031"));
        assert_eq!(props.state_code.as_deref(), Some("IL"));
        assert_eq!(props.region_name.as_deref(), Some("Cook"));
        assert_eq!(props.confirmed, None);
        assert_eq!(props.extra.get("LON"), Some(&json!(-87.8)));
    }

    #[test]
    fn test_properties_metric_coercion() {
        let props = json!({
            "province_state": "Illinois",
            "confirmed": "12",
            "deaths": "",
            "recovered": "n/a"
        });
        let props = RegionProperties::from_json(props.as_object().unwrap());

        assert_eq!(props.region_scope.as_deref(), Some("Illinois"));
        assert_eq!(props.confirmed, Some(12.0));
        assert_eq!(props.deaths, None);
        assert_eq!(props.recovered, None);
    }

    #[test]
    fn test_to_json_omits_unset_metrics() {
        let props = RegionProperties::new("17031").metric(Metric::Confirmed, 7.0);
        let json = props.to_json();

        assert_eq!(json.get("FIPS"), Some(&json!("17031")));
        assert_eq!(json.get("confirmed"), Some(&json!(7.0)));
        assert!(!json.contains_key("deaths"));
    }

    #[test]
    fn test_restrict_to_state() {
        let mut cook = RegionProperties::new("17031");
        cook.state_code = Some("IL".to_string());
        let mut unassigned = RegionProperties::new("17999");
        unassigned.state_code = Some("IL".to_string());
        let mut lake = RegionProperties::new("18089");
        lake.state_code = Some("IN".to_string());

        let collection = RegionCollection::new(vec![
            RegionFeature::new(cook),
            RegionFeature::new(unassigned),
            RegionFeature::new(lake),
        ]);
        let il = collection.restrict_to_state("IL", &["17999".to_string()]);

        assert_eq!(il.len(), 1);
        assert_eq!(il.features[0].properties.region_key.as_deref(), Some("17031"));
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(5)), Some(5.0));
        assert_eq!(coerce_number(&json!(" 7 ")), Some(7.0));
        assert_eq!(coerce_number(&json!("<5")), None);
        assert_eq!(coerce_number(&json!(null)), None);
        assert_eq!(coerce_number(&json!([1])), None);
    }
}
