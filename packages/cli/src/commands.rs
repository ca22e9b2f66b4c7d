//! Subcommand implementations. Each one runs a single query and prints the
//! result to stdout as pretty JSON.

use std::path::Path;
use std::sync::Arc;

use civic_report_analytics::{AnalyticsAggregator, AnalyticsConfig};
use civic_report_analytics_models::{HeatZoneParams, TimeGranularity};
use civic_report_issue_models::IssueCategory;
use civic_report_spatial::DuplicateCheck;
use civic_report_store::{MemoryReportStore, ReportStore};
use civic_report_store_models::ReportQuery;
use serde::Serialize;
use uuid::Uuid;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Loads the config from `path`, or from the environment when no path is
/// given.
pub fn load_config(path: Option<&Path>) -> Result<AnalyticsConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AnalyticsConfig::load(path)?,
        None => AnalyticsConfig::from_env()?,
    };
    log::debug!("Using config {config:?}");
    Ok(config)
}

/// Loads the report dump into an in-memory store.
pub fn load_store(path: &Path) -> Result<Arc<dyn ReportStore>, Box<dyn std::error::Error>> {
    Ok(Arc::new(MemoryReportStore::from_json_path(path)?))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn nearby(store: &Arc<dyn ReportStore>, lat: f64, lon: f64, radius: f64) -> CmdResult {
    let reports = civic_report_spatial::find_nearby_reports(store.as_ref(), lat, lon, radius)?;
    log::info!("{} reports within {radius} m", reports.len());
    print_json(&reports)
}

pub fn duplicate(
    store: &Arc<dyn ReportStore>,
    lat: f64,
    lon: f64,
    category: IssueCategory,
    radius: f64,
    user: Option<Uuid>,
) -> CmdResult {
    let mut check = DuplicateCheck::new(lat, lon, category).with_radius(radius);
    if let Some(user) = user {
        check = check.for_user(user);
    }

    let found = civic_report_spatial::check_for_duplicates(store.as_ref(), &check)?;
    match &found {
        Some(report) => log::info!("Duplicate of report {}", report.id),
        None => log::info!("No duplicate within {radius} m"),
    }
    print_json(&found)
}

pub fn image_duplicate(store: &Arc<dyn ReportStore>, photo: &Path, user: Uuid) -> CmdResult {
    let bytes = std::fs::read(photo)?;
    log::debug!(
        "Photo {} hashes to {}",
        photo.display(),
        civic_report_spatial::compute_image_hash(&bytes)
    );
    let found = civic_report_spatial::check_image_duplicate(store.as_ref(), &bytes, user)?;
    print_json(&found)
}

pub fn clusters(store: &Arc<dyn ReportStore>, query: &ReportQuery, proximity: f64) -> CmdResult {
    let reports = store.query(query)?;
    let clusters = civic_report_spatial::cluster_reports(&reports, proximity);
    log::info!(
        "{} reports in {} clusters",
        reports.len(),
        clusters.len()
    );
    print_json(&clusters)
}

fn aggregator(store: &Arc<dyn ReportStore>, config: &AnalyticsConfig) -> AnalyticsAggregator {
    AnalyticsAggregator::from_config(Arc::clone(store), config)
}

pub fn metrics(
    store: &Arc<dyn ReportStore>,
    config: &AnalyticsConfig,
    query: &ReportQuery,
) -> CmdResult {
    print_json(&aggregator(store, config).get_key_metrics(query)?)
}

pub fn trends(
    store: &Arc<dyn ReportStore>,
    config: &AnalyticsConfig,
    query: &ReportQuery,
    period: &str,
) -> CmdResult {
    let granularity: TimeGranularity = period.parse()?;
    print_json(&aggregator(store, config).get_trend_data(query, granularity)?)
}

pub fn categories(
    store: &Arc<dyn ReportStore>,
    config: &AnalyticsConfig,
    query: &ReportQuery,
) -> CmdResult {
    print_json(&aggregator(store, config).get_category_distribution(query)?)
}

pub fn severity(
    store: &Arc<dyn ReportStore>,
    config: &AnalyticsConfig,
    query: &ReportQuery,
    period: &str,
) -> CmdResult {
    let granularity: TimeGranularity = period.parse()?;
    print_json(&aggregator(store, config).get_severity_trends(query, granularity)?)
}

pub fn heat_zones(
    store: &Arc<dyn ReportStore>,
    config: &AnalyticsConfig,
    query: &ReportQuery,
    params: HeatZoneParams,
) -> CmdResult {
    print_json(&aggregator(store, config).get_heat_zones(query, params)?)
}
