//! Covidboard CLI
//!
//! Runs the dashboard data pipeline over local dataset files:
//! - Build a region snapshot
//! - Annotate county geometry for the map
//! - Compute summary totals
//! - Format a location's history for the popup chart

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use covidboard::config::{generate_default_config, Config, LoggingConfig};
use covidboard::data::{self, parse_date, Metric};
use covidboard::display::{axis_tick, location_tooltip, number_with_commas};
use covidboard::pipeline::{
    aggregate_totals, build_snapshot, format_series, map_view, resolve_target, Tab,
};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "covidboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "COVID-19 dashboard data pipeline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show per-region values at one date
    Snapshot {
        /// Raw time-series feed (default: from config)
        #[arg(long)]
        raw: Option<PathBuf>,
        /// Snapshot date (default: latest date in the feed)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Annotate county geometry with the latest snapshot
    Annotate {
        /// Raw time-series feed (default: from config)
        #[arg(long)]
        raw: Option<PathBuf>,
        /// County geometry GeoJSON (default: from config)
        #[arg(long)]
        geometry: Option<PathBuf>,
        /// Write the annotated GeoJSON here (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show summary totals for both dashboard tabs
    Totals {
        /// Per-region GeoJSON (default: from config)
        #[arg(long)]
        geojson: Option<PathBuf>,
    },

    /// Format a location's history for charting
    Series {
        /// Location history JSON file
        path: PathBuf,
        /// Also print the tooltip for this date
        #[arg(short, long)]
        tooltip: Option<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging)?;

    tracing::debug!("Covidboard v{}", env!("CARGO_PKG_VERSION"));
    let json = cli.format == "json";

    match cli.command {
        Commands::Snapshot { raw, date } => {
            let raw = raw.unwrap_or_else(|| config.datasets.path(&config.datasets.raw_series));
            let records = data::load_raw_records(&raw)?;
            let target = match date {
                Some(d) => parse_date(&d).with_context(|| format!("Invalid date: {}", d))?,
                None => resolve_target(&records, Utc::now()),
            };
            let ctx = config.query_context();
            let snapshot = build_snapshot(&records, target, &ctx.filter);

            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!("Snapshot at {} ({} regions)", target.format("%Y-%m-%d"), snapshot.len());
                println!("{:<10} {:>12} {:>10}", "REGION", "CONFIRMED", "DEATHS");
                for (key, metrics) in snapshot.iter() {
                    println!(
                        "{:<10} {:>12} {:>10}",
                        key,
                        metrics.confirmed.map(number_with_commas).unwrap_or_default(),
                        metrics.deaths.map(number_with_commas).unwrap_or_default()
                    );
                }
            }
        }

        Commands::Annotate {
            raw,
            geometry,
            output,
        } => {
            let raw = raw.unwrap_or_else(|| config.datasets.path(&config.datasets.raw_series));
            let geometry = geometry
                .unwrap_or_else(|| config.datasets.path(&config.datasets.county_geometry));

            let records = data::load_raw_records(&raw)?;
            let counties = data::load_regions(&geometry)?.restrict_to_state(
                &config.geometry.state_code,
                &config.geometry.excluded_region_keys,
            );
            let view = map_view(&records, &counties, &config.query_context(), Utc::now());
            let summary = view.summary();
            tracing::info!(
                "Annotated {} features ({} with data), scale max {}",
                summary.features,
                summary.features_with_data,
                summary.scale_max
            );

            let geojson = serde_json::to_string(&view.annotated.to_geojson())?;
            match output {
                Some(path) => {
                    write_output(&path, &geojson)?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&summary)?);
                    } else {
                        println!("Wrote {} features to {:?}", summary.features, path);
                        println!("Snapshot date: {}", summary.target.format("%Y-%m-%d"));
                        println!("Scale max:     {}", number_with_commas(summary.scale_max));
                    }
                }
                None => println!("{}", geojson),
            }
        }

        Commands::Totals { geojson } => {
            let geojson =
                geojson.unwrap_or_else(|| config.datasets.path(&config.datasets.geojson_latest));
            let regions = data::load_regions(&geojson)?;
            let totals = aggregate_totals(&regions, &config.dashboard.subset_name);

            if json {
                println!("{}", serde_json::to_string_pretty(&totals)?);
            } else {
                let tabs = [
                    (config.dashboard.subset_name.as_str(), Tab::Subset),
                    ("World", Tab::World),
                ];
                for (title, tab) in tabs {
                    println!("{}", title);
                    for counter in totals.counters(tab) {
                        println!(
                            "  {:<16} {:>14}",
                            counter.label,
                            number_with_commas(counter.value)
                        );
                    }
                }
            }
        }

        Commands::Series { path, tooltip } => {
            let series = data::load_location_series(&path)?;
            let formatted = format_series(&series);

            if json {
                println!("{}", serde_json::to_string_pretty(&formatted)?);
            } else {
                if let Some(title) = &series.title {
                    println!("{}", title);
                }
                println!("{:<8} {:>12} {:>10} {:>10}", "DATE", "CONFIRMED", "DEATHS", "RECOVERED");
                for point in &formatted.points {
                    let label = parse_date(&point.date)
                        .map(axis_tick)
                        .unwrap_or_else(|| point.date.clone());
                    println!(
                        "{:<8} {:>12} {:>10} {:>10}",
                        label,
                        number_with_commas(point.confirmed),
                        number_with_commas(point.deaths),
                        number_with_commas(point.recovered)
                    );
                }
                match formatted.maxes.overall() {
                    Some(max) => println!("Y-axis max: {}", number_with_commas(max)),
                    None => println!("Y-axis max: auto"),
                }
            }

            if let Some(date) = tooltip {
                let metrics: Vec<Metric> = Metric::all()
                    .iter()
                    .copied()
                    .filter(|m| *m != Metric::Recovered || formatted.maxes.show_recovered())
                    .collect();
                match location_tooltip(&series, &date, &metrics) {
                    Some(tip) => {
                        println!("{}", tip.header);
                        for line in tip.lines {
                            println!("  {}", line.text);
                        }
                    }
                    None => tracing::warn!("No data for {} in {:?}", date, path),
                }
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    write_output(&path, &content)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn write_output(path: &Path, content: &str) -> anyhow::Result<()> {
    std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))
}

fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("covidboard={}", logging.level))
    });

    let writer = match &logging.file {
        Some(file) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .with_context(|| format!("Failed to open log file {}", file))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(writer))
            .init();
    }
    Ok(())
}
