//! Dataset loading
//!
//! Reads the dashboard's datasets from local JSON files. Fetching them over
//! the network is someone else's job; by the time data reaches this crate it
//! is a file on disk or a string in memory.

use crate::data::error::{DataError, DataResult};
use crate::data::types::{RawRecord, RegionCollection, SelectedLocationSeries};
use geojson::GeoJson;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Load the raw time-series feed (a JSON array of records)
pub fn load_raw_records(path: &Path) -> DataResult<Vec<RawRecord>> {
    let records: Vec<RawRecord> = read_json(path)?;
    tracing::debug!("Loaded {} raw records from {:?}", records.len(), path);
    Ok(records)
}

/// Load a selected location's history
pub fn load_location_series(path: &Path) -> DataResult<SelectedLocationSeries> {
    let series: SelectedLocationSeries = read_json(path)?;
    tracing::debug!("Loaded {} dates from {:?}", series.data.len(), path);
    Ok(series)
}

/// Load a GeoJSON FeatureCollection file as typed regions
pub fn load_regions(path: &Path) -> DataResult<RegionCollection> {
    let content = read_to_string(path)?;
    let regions = parse_regions(&content)?;
    tracing::debug!("Loaded {} region features from {:?}", regions.len(), path);
    Ok(regions)
}

/// Parse GeoJSON text as typed regions
pub fn parse_regions(content: &str) -> DataResult<RegionCollection> {
    match content.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => Ok(RegionCollection::from_geojson(fc)),
        GeoJson::Feature(_) => Err(DataError::NotFeatureCollection("Feature".to_string())),
        GeoJson::Geometry(_) => Err(DataError::NotFeatureCollection("Geometry".to_string())),
    }
}

fn read_to_string(path: &Path) -> DataResult<String> {
    std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> DataResult<T> {
    let content = read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| DataError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_raw_records() {
        let file = write_temp(
            r#"[{"project_id": "open-JHU", "province_state": "Illinois", "FIPS": "17031",
                 "date": ["2020-03-01"], "confirmed": [5], "deaths": [0]}]"#,
        );
        let records = load_raw_records(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].region_key.as_deref(), Some("17031"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_raw_records(Path::new("/nonexistent/raw.json")).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }

    #[test]
    fn test_load_invalid_json() {
        let file = write_temp("{not json");
        let err = load_location_series(file.path()).unwrap_err();
        assert!(matches!(err, DataError::Json { .. }));
    }

    #[test]
    fn test_load_regions() {
        let file = write_temp(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "geometry": null,
                 "properties": {"FIPS": "17031", "STATE": "IL", "confirmed": 7}}
            ]}"#,
        );
        let regions = load_regions(file.path()).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions.features[0].properties.confirmed, Some(7.0));
    }

    #[test]
    fn test_parse_regions_rejects_single_feature() {
        let err = parse_regions(r#"{"type": "Feature", "geometry": null, "properties": {}}"#)
            .unwrap_err();
        assert!(matches!(err, DataError::NotFeatureCollection(_)));
    }
}
