//! Data loading error types
//!
//! Errors raised while reading dashboard datasets from disk. The pipeline
//! itself never fails; only getting data into memory can.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading dashboard datasets
#[derive(Error, Debug)]
pub enum DataError {
    /// Reading a dataset file failed
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Dataset is not valid JSON for the expected shape
    #[error("Invalid JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// GeoJSON could not be parsed
    #[error("Invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),

    /// GeoJSON parsed but is not a FeatureCollection
    #[error("Expected a FeatureCollection, found {0}")]
    NotFeatureCollection(String),
}

/// Result type alias for data loading
pub type DataResult<T> = Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DataError::NotFeatureCollection("Feature".to_string());
        assert_eq!(err.to_string(), "Expected a FeatureCollection, found Feature");
    }

    #[test]
    fn test_io_error_mentions_path() {
        let err = DataError::Io {
            path: PathBuf::from("map_data/missing.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("missing.json"));
        assert!(msg.contains("file not found"));
    }
}
