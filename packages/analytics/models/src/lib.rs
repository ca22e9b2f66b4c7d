#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Analytics result types for the admin dashboard.
//!
//! Every type here is plain data. Rendering to JSON, CSV or PDF is up to
//! the presentation layer.

use std::collections::BTreeMap;
use std::str::FromStr;

use civic_report_issue_models::IssueCategory;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Proximity used to cluster heat zones when the caller has no preference.
pub const DEFAULT_HEAT_ZONE_PROXIMITY_METERS: f64 = 200.0;

/// Minimum cluster size for a heat zone when the caller has no preference.
pub const DEFAULT_HEAT_ZONE_MIN_REPORTS: usize = 3;

/// Calendar bucket size for trend queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeGranularity {
    /// `YYYY-MM-DD` buckets.
    Daily,
    /// ISO-8601 `YYYY-Www` buckets.
    Weekly,
    /// `YYYY-MM` buckets.
    Monthly,
}

impl TimeGranularity {
    /// The identifier accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for TimeGranularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeGranularity {
    type Err = InvalidGranularityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(InvalidGranularityError {
                value: s.to_string(),
            }),
        }
    }
}

/// Error returned for a period identifier other than `daily`, `weekly` or
/// `monthly`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidGranularityError {
    /// The rejected identifier.
    pub value: String,
}

impl std::fmt::Display for InvalidGranularityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid period '{}': must be 'daily', 'weekly', or 'monthly'",
            self.value
        )
    }
}

impl std::error::Error for InvalidGranularityError {}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetrics {
    /// Reports matching the filters.
    pub total_reports: u64,
    /// Percentage (0-100) of matching reports that are fixed.
    pub resolution_rate: f64,
    /// Mean seconds from creation to last update over fixed reports, or
    /// `None` when nothing is fixed.
    pub average_resolution_time: Option<f64>,
}

/// Report count for one calendar bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Bucket key (e.g. "2025-01-15", "2025-W03", "2025-01").
    pub period: String,
    /// Reports created in this bucket.
    pub count: u64,
}

/// Average severity for one calendar bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityTrendPoint {
    /// Bucket key.
    pub period: String,
    /// Mean severity score of reports in this bucket.
    pub average_severity: f64,
    /// Reports created in this bucket.
    pub report_count: u64,
}

/// Report counts per category. Only categories with at least one report
/// appear.
pub type CategoryDistribution = BTreeMap<IssueCategory, u64>;

/// A concentration of unresolved reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatZone {
    /// Cluster centroid latitude.
    pub latitude: f64,
    /// Cluster centroid longitude.
    pub longitude: f64,
    /// Unresolved reports in the zone.
    pub report_count: u64,
    /// IDs of those reports.
    pub report_ids: Vec<Uuid>,
}

/// Parameters for heat zone detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatZoneParams {
    /// Clustering distance threshold in meters.
    pub proximity_meters: f64,
    /// Smallest cluster that counts as a zone.
    pub min_reports: usize,
}

impl Default for HeatZoneParams {
    fn default() -> Self {
        Self {
            proximity_meters: DEFAULT_HEAT_ZONE_PROXIMITY_METERS,
            min_reports: DEFAULT_HEAT_ZONE_MIN_REPORTS,
        }
    }
}
