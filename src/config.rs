//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::pipeline::{QueryContext, SnapshotFilter, DEFAULT_SCALE_MAX};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub geometry: GeometryConfig,

    #[serde(default)]
    pub datasets: DatasetsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Snapshot filters and totals settings
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_source_id")]
    pub source_id: String,

    #[serde(default = "default_region_scope")]
    pub region_scope: String,

    #[serde(default = "default_subset_name")]
    pub subset_name: String,

    #[serde(default = "default_fallback_scale_max")]
    pub fallback_scale_max: f64,
}

fn default_source_id() -> String {
    "open-JHU".to_string()
}

fn default_region_scope() -> String {
    "Illinois".to_string()
}

fn default_subset_name() -> String {
    "Illinois".to_string()
}

fn default_fallback_scale_max() -> f64 {
    DEFAULT_SCALE_MAX
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source_id: default_source_id(),
            region_scope: default_region_scope(),
            subset_name: default_subset_name(),
            fallback_scale_max: default_fallback_scale_max(),
        }
    }
}

/// Which counties of the reference geometry are drawn
#[derive(Debug, Clone, Deserialize)]
pub struct GeometryConfig {
    #[serde(default = "default_state_code")]
    pub state_code: String,

    #[serde(default = "default_excluded_keys")]
    pub excluded_region_keys: Vec<String>,
}

fn default_state_code() -> String {
    "IL".to_string()
}

fn default_excluded_keys() -> Vec<String> {
    vec!["17999".to_string()]
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            state_code: default_state_code(),
            excluded_region_keys: default_excluded_keys(),
        }
    }
}

/// Dataset file locations, relative to `data_dir`
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetsConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_raw_series")]
    pub raw_series: String,

    #[serde(default = "default_geojson_latest")]
    pub geojson_latest: String,

    #[serde(default = "default_county_geometry")]
    pub county_geometry: String,

    #[serde(default = "default_json_by_level_latest")]
    pub json_by_level_latest: String,

    // Chart feeds read by the dashboard's chart widgets
    #[serde(default = "default_top10")]
    pub top10: String,

    #[serde(default = "default_observed_cases")]
    pub observed_cases: String,

    #[serde(default = "default_simulated_cases")]
    pub simulated_cases: String,

    #[serde(default = "default_idph_daily")]
    pub idph_daily: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("covidboard").to_string_lossy().to_string())
        .unwrap_or_else(|| "./covidboard_data".to_string())
}

fn default_raw_series() -> String {
    "map_data/raw_time_series.json".to_string()
}

fn default_geojson_latest() -> String {
    "map_data/jhu_geojson_latest.json".to_string()
}

fn default_county_geometry() -> String {
    "map_data/us_counties.geojson".to_string()
}

fn default_json_by_level_latest() -> String {
    "map_data/jhu_json_by_level_latest.json".to_string()
}

fn default_top10() -> String {
    "top10.txt".to_string()
}

fn default_observed_cases() -> String {
    "observed_cases.txt".to_string()
}

fn default_simulated_cases() -> String {
    "simulated_cases.txt".to_string()
}

fn default_idph_daily() -> String {
    "idph_daily.txt".to_string()
}

impl Default for DatasetsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            raw_series: default_raw_series(),
            geojson_latest: default_geojson_latest(),
            county_geometry: default_county_geometry(),
            json_by_level_latest: default_json_by_level_latest(),
            top10: default_top10(),
            observed_cases: default_observed_cases(),
            simulated_cases: default_simulated_cases(),
            idph_daily: default_idph_daily(),
        }
    }
}

impl DatasetsConfig {
    /// Resolve a dataset path against `data_dir`
    pub fn path(&self, relative: &str) -> PathBuf {
        Path::new(&self.data_dir).join(relative)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("covidboard").join("config.toml")),
            Some(PathBuf::from("/etc/covidboard/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Build the pipeline's query context from this configuration
    pub fn query_context(&self) -> QueryContext {
        QueryContext {
            filter: SnapshotFilter::new(&self.dashboard.source_id, &self.dashboard.region_scope),
            subset_name: self.dashboard.subset_name.clone(),
            fallback_scale_max: self.dashboard.fallback_scale_max,
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(data_dir) = std::env::var("COVIDBOARD_DATA_DIR") {
            self.datasets.data_dir = data_dir;
        }

        // Dashboard overrides
        if let Ok(source_id) = std::env::var("COVIDBOARD_SOURCE_ID") {
            self.dashboard.source_id = source_id;
        }
        if let Ok(scope) = std::env::var("COVIDBOARD_REGION_SCOPE") {
            self.dashboard.region_scope = scope;
        }
        if let Ok(subset) = std::env::var("COVIDBOARD_SUBSET_NAME") {
            self.dashboard.subset_name = subset;
        }

        // Logging overrides
        if let Ok(level) = std::env::var("COVIDBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("COVIDBOARD_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Covidboard Configuration
#
# Environment variables override these settings:
# - COVIDBOARD_DATA_DIR
# - COVIDBOARD_SOURCE_ID
# - COVIDBOARD_REGION_SCOPE
# - COVIDBOARD_SUBSET_NAME
# - COVIDBOARD_LOG_LEVEL
# - COVIDBOARD_LOG_FORMAT

[dashboard]
# Only raw records from this data source are mapped
source_id = "open-JHU"

# Only raw records from this province/state are mapped
region_scope = "Illinois"

# Region name the subset totals are restricted to
subset_name = "Illinois"

# Color scale upper bound when no region has data
fallback_scale_max = 2.0

[geometry]
# State whose counties are drawn
state_code = "IL"

# Region keys dropped from the county geometry
excluded_region_keys = ["17999"]

[datasets]
# Directory holding the dataset files
data_dir = "~/.local/share/covidboard"

# Raw time-series feed (JSON array)
raw_series = "map_data/raw_time_series.json"

# Latest per-region GeoJSON (world totals)
geojson_latest = "map_data/jhu_geojson_latest.json"

# County reference geometry
county_geometry = "map_data/us_counties.geojson"

# Latest per-region values grouped by admin level
json_by_level_latest = "map_data/jhu_json_by_level_latest.json"

# Chart feeds
top10 = "top10.txt"
observed_cases = "observed_cases.txt"
simulated_cases = "simulated_cases.txt"
idph_daily = "idph_daily.txt"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/covidboard/covidboard.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();

        assert_eq!(config.dashboard.source_id, "open-JHU");
        assert_eq!(config.dashboard.fallback_scale_max, 2.0);
        assert_eq!(config.geometry.excluded_region_keys, vec!["17999"]);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::parse("[dashboard]\nsubset_name = \"Cook\"\n").unwrap();

        assert_eq!(config.dashboard.subset_name, "Cook");
        assert_eq!(config.dashboard.region_scope, "Illinois");
        assert_eq!(config.geometry.state_code, "IL");
    }

    #[test]
    fn test_query_context() {
        let config = Config::parse(
            "[dashboard]\nsource_id = \"jhu\"\nregion_scope = \"Ohio\"\nfallback_scale_max = 5.0\n",
        )
        .unwrap();
        let ctx = config.query_context();

        assert_eq!(ctx.filter, SnapshotFilter::new("jhu", "Ohio"));
        assert_eq!(ctx.subset_name, "Illinois");
        assert_eq!(ctx.fallback_scale_max, 5.0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[datasets]\ndata_dir = \"/srv/covid\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.datasets.data_dir, "/srv/covid");
        assert_eq!(
            config.datasets.path(&config.datasets.geojson_latest),
            PathBuf::from("/srv/covid/map_data/jhu_geojson_latest.json")
        );
    }

    #[test]
    fn test_dataset_locations() {
        let generated = Config::parse(&generate_default_config()).unwrap().datasets;
        let defaults = DatasetsConfig::default();

        for datasets in [&generated, &defaults] {
            assert_eq!(datasets.json_by_level_latest, "map_data/jhu_json_by_level_latest.json");
            assert_eq!(datasets.top10, "top10.txt");
            assert_eq!(datasets.observed_cases, "observed_cases.txt");
            assert_eq!(datasets.simulated_cases, "simulated_cases.txt");
            assert_eq!(datasets.idph_daily, "idph_daily.txt");
        }

        let config = Config::parse("[datasets]\ndata_dir = \"/srv/covid\"\n").unwrap();
        assert_eq!(
            config.datasets.path(&config.datasets.idph_daily),
            PathBuf::from("/srv/covid/idph_daily.txt")
        );
    }

    #[test]
    fn test_load_errors() {
        let err = Config::load(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[dashboard\nbroken").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
