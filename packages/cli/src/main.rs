#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the civic report spatial and analytics core.
//!
//! Loads a JSON dump of reports into an in-memory store and runs one
//! duplicate check, clustering pass or dashboard query against it,
//! printing the result as pretty JSON.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use civic_report_issue_models::{IssueCategory, ReportStatus};
use civic_report_store_models::{BoundingBox, ReportQuery};
use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

mod commands;

// ---------------------------------------------------------------------------
// CLI definitions
// ---------------------------------------------------------------------------

/// Query citizen reports for duplicates, clusters and dashboard analytics.
#[derive(Parser)]
#[command(name = "civic_report")]
#[command(about = "Query citizen reports for duplicates, clusters and dashboard analytics")]
struct Cli {
    /// JSON file holding an array of reports.
    #[arg(long)]
    reports: PathBuf,

    /// TOML config file (default: `$CIVIC_REPORT_CONFIG`, then built-ins).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List non-archived reports within a radius of a point.
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Search radius in meters (default from config).
        #[arg(long)]
        radius: Option<f64>,
    },

    /// Find the closest existing report that a new submission duplicates.
    Duplicate {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Category of the new submission (e.g. "Pothole", "Water Leak").
        #[arg(long, value_parser = parse_category)]
        category: IssueCategory,

        /// Duplicate radius in meters (default from config).
        #[arg(long)]
        radius: Option<f64>,

        /// Only consider reports by this user.
        #[arg(long)]
        user: Option<Uuid>,
    },

    /// Find an earlier report by the same user with the exact same photo.
    ImageDuplicate {
        /// Path to the photo file.
        #[arg(long)]
        photo: PathBuf,

        /// Submitting user.
        #[arg(long)]
        user: Uuid,
    },

    /// Group matching reports into proximity clusters for the map.
    Clusters {
        #[command(flatten)]
        filters: FilterArgs,

        /// Cluster proximity in meters (default from config).
        #[arg(long)]
        proximity: Option<f64>,
    },

    /// Total reports, resolution rate and mean resolution time.
    Metrics {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Report counts per period.
    Trends {
        #[command(flatten)]
        filters: FilterArgs,

        /// Bucket size: "daily", "weekly" or "monthly".
        #[arg(long, default_value = "daily")]
        period: String,
    },

    /// Report counts per category.
    Categories {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Mean severity per period.
    Severity {
        #[command(flatten)]
        filters: FilterArgs,

        /// Bucket size: "daily", "weekly" or "monthly".
        #[arg(long, default_value = "daily")]
        period: String,
    },

    /// Concentrations of unresolved reports.
    HeatZones {
        #[command(flatten)]
        filters: FilterArgs,

        /// Cluster proximity in meters (default from config).
        #[arg(long)]
        proximity: Option<f64>,

        /// Smallest cluster that counts as a zone (default from config).
        #[arg(long)]
        min_reports: Option<usize>,
    },
}

/// Report filters shared by the clustering and analytics subcommands.
#[derive(Args)]
struct FilterArgs {
    /// Only reports in this category.
    #[arg(long, value_parser = parse_category)]
    category: Option<IssueCategory>,

    /// Only reports with this status ("Reported", "In Progress", "Fixed").
    #[arg(long, value_parser = parse_status)]
    status: Option<ReportStatus>,

    /// Earliest creation date, inclusive (YYYY-MM-DD or RFC 3339).
    #[arg(long, value_parser = parse_timestamp)]
    from: Option<DateTime<Utc>>,

    /// Latest creation date, inclusive (YYYY-MM-DD or RFC 3339).
    #[arg(long, value_parser = parse_end_timestamp)]
    to: Option<DateTime<Utc>>,

    /// Bounding box as "west,south,east,north".
    #[arg(long, value_parser = parse_bbox, allow_hyphen_values = true)]
    bbox: Option<BoundingBox>,

    /// Include archived reports.
    #[arg(long)]
    include_archived: bool,
}

impl FilterArgs {
    fn into_query(self) -> ReportQuery {
        ReportQuery {
            category: self.category,
            status: self.status,
            date_from: self.from,
            date_to: self.to,
            bbox: self.bbox,
            include_archived: self.include_archived,
            ..ReportQuery::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Argument parsers
// ---------------------------------------------------------------------------

fn parse_category(s: &str) -> Result<IssueCategory, String> {
    s.parse().map_err(|_| {
        let known: Vec<String> = IssueCategory::all().iter().map(ToString::to_string).collect();
        format!("unknown category {s:?} (expected one of: {})", known.join(", "))
    })
}

fn parse_status(s: &str) -> Result<ReportStatus, String> {
    s.parse().map_err(|_| {
        let known: Vec<String> = ReportStatus::all().iter().map(ToString::to_string).collect();
        format!("unknown status {s:?} (expected one of: {})", known.join(", "))
    })
}

/// Bare dates start at midnight UTC.
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp_at(s, 0, 0, 0)
}

/// Bare dates run to the last second of the day, so `--to` includes it.
fn parse_end_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp_at(s, 23, 59, 59)
}

fn parse_timestamp_at(s: &str, hour: u32, min: u32, sec: u32) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date
            .and_hms_opt(hour, min, sec)
            .map(|dt| dt.and_utc())
            .ok_or_else(|| format!("invalid date {s:?}"));
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp {s:?}: {e}"))
}

fn parse_bbox(s: &str) -> Result<BoundingBox, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid bounding box {s:?}: {e}"))?;

    match parts.as_slice() {
        &[west, south, east, north] => Ok(BoundingBox::new(west, south, east, north)),
        _ => Err(format!(
            "invalid bounding box {s:?}: expected west,south,east,north"
        )),
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = commands::load_config(cli.config.as_deref())?;
    let store = commands::load_store(&cli.reports)?;

    match cli.command {
        Commands::Nearby { lat, lon, radius } => {
            commands::nearby(&store, lat, lon, radius.unwrap_or(config.nearby_radius_meters))
        }
        Commands::Duplicate {
            lat,
            lon,
            category,
            radius,
            user,
        } => commands::duplicate(
            &store,
            lat,
            lon,
            category,
            radius.unwrap_or(config.duplicate_radius_meters),
            user,
        ),
        Commands::ImageDuplicate { photo, user } => commands::image_duplicate(&store, &photo, user),
        Commands::Clusters { filters, proximity } => commands::clusters(
            &store,
            &filters.into_query(),
            proximity.unwrap_or(config.cluster_proximity_meters),
        ),
        Commands::Metrics { filters } => commands::metrics(&store, &config, &filters.into_query()),
        Commands::Trends { filters, period } => {
            commands::trends(&store, &config, &filters.into_query(), &period)
        }
        Commands::Categories { filters } => {
            commands::categories(&store, &config, &filters.into_query())
        }
        Commands::Severity { filters, period } => {
            commands::severity(&store, &config, &filters.into_query(), &period)
        }
        Commands::HeatZones {
            filters,
            proximity,
            min_reports,
        } => {
            let mut params = config.heat_zone_params();
            if let Some(proximity) = proximity {
                params.proximity_meters = proximity;
            }
            if let Some(min_reports) = min_reports {
                params.min_reports = min_reports;
            }
            commands::heat_zones(&store, &config, &filters.into_query(), params)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_category_names_case_insensitively() {
        assert_eq!(parse_category("Water Leak").unwrap(), IssueCategory::WaterLeak);
        assert_eq!(parse_category("pothole").unwrap(), IssueCategory::Pothole);
        assert!(parse_category("Graffiti").unwrap_err().contains("Illegal Dumping"));
    }

    #[test]
    fn parses_bare_dates_as_midnight_utc() {
        let ts = parse_timestamp("2024-03-07").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-07T00:00:00+00:00");
        let ts = parse_timestamp("2024-03-07T12:30:00-06:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-07T18:30:00+00:00");
        assert!(parse_timestamp("last tuesday").is_err());
        let end = parse_end_timestamp("2024-03-07").unwrap();
        assert_eq!(end.to_rfc3339(), "2024-03-07T23:59:59+00:00");
    }

    #[test]
    fn parses_bounding_boxes() {
        let bbox = parse_bbox("-112.0, 40.0, -111.0, 41.0").unwrap();
        assert_eq!(bbox, BoundingBox::new(-112.0, 40.0, -111.0, 41.0));
        assert!(parse_bbox("1,2,3").is_err());
        assert!(parse_bbox("a,b,c,d").is_err());
    }

    #[test]
    fn cli_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "civic_report",
            "--reports",
            "reports.json",
            "duplicate",
            "--lat",
            "40.0",
            "--lon",
            "-111.0",
            "--category",
            "Pothole",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Duplicate { lon, category: IssueCategory::Pothole, .. } if (lon + 111.0).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn filters_build_a_query() {
        let cli = Cli::try_parse_from([
            "civic_report",
            "--reports",
            "reports.json",
            "metrics",
            "--status",
            "In Progress",
            "--from",
            "2024-01-01",
        ])
        .unwrap();
        let Commands::Metrics { filters } = cli.command else {
            panic!("expected metrics subcommand");
        };
        let query = filters.into_query();
        assert_eq!(query.status, Some(ReportStatus::InProgress));
        assert!(query.date_from.is_some());
        assert!(!query.include_archived);
    }
}
