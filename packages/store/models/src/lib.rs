#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Report record and query parameter definitions.
//!
//! [`ReportRef`] is the read-only view of a citizen report handed out by
//! the report store. [`ReportQuery`] is the filter set callers pass to the
//! store. Both are plain data; the store owns the records and nothing in
//! the analytics core ever mutates them.

use chrono::{DateTime, Utc};
use civic_report_issue_models::{IssueCategory, ReportStatus, Severity};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A geographic bounding box in WGS84 coordinates.
///
/// Edges are inclusive. The box does not wrap across the antimeridian:
/// `west` is expected to be less than or equal to `east`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Whether the point lies inside the box (edges included).
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.south..=self.north).contains(&latitude)
            && (self.west..=self.east).contains(&longitude)
    }
}

/// A citizen report as exposed by the report store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRef {
    /// Primary key.
    pub id: Uuid,
    /// User who submitted the report.
    pub user_id: Uuid,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Issue category assigned by triage.
    #[serde(default)]
    pub category: IssueCategory,
    /// Severity score assigned by triage.
    #[serde(default)]
    pub severity: Severity,
    /// Workflow status.
    #[serde(default)]
    pub status: ReportStatus,
    /// When the report was submitted.
    pub created_at: DateTime<Utc>,
    /// Last modification; for fixed reports this is when it was resolved.
    pub updated_at: DateTime<Utc>,
    /// Soft-deleted by an admin.
    #[serde(default)]
    pub archived: bool,
    /// Lowercase hex SHA-256 of the submitted photo.
    #[serde(default)]
    pub image_hash: Option<String>,
}

impl ReportRef {
    /// Whether the report still needs attention.
    #[must_use]
    pub const fn is_unresolved(&self) -> bool {
        !self.status.is_resolved()
    }
}

/// Parameters for querying reports from the store.
///
/// The default query matches every non-archived report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportQuery {
    /// Only reports in this category.
    pub category: Option<IssueCategory>,
    /// Only reports with this status.
    pub status: Option<ReportStatus>,
    /// Minimum creation time (inclusive).
    pub date_from: Option<DateTime<Utc>>,
    /// Maximum creation time (inclusive).
    pub date_to: Option<DateTime<Utc>>,
    /// Spatial bounding box filter.
    pub bbox: Option<BoundingBox>,
    /// Include soft-deleted reports.
    #[serde(default)]
    pub include_archived: bool,
    /// Only reports submitted by this user.
    pub user_id: Option<Uuid>,
    /// Only reports whose photo hash equals this value.
    pub image_hash: Option<String>,
}

impl ReportQuery {
    /// Whether `report` satisfies every filter in this query.
    #[must_use]
    pub fn matches(&self, report: &ReportRef) -> bool {
        if report.archived && !self.include_archived {
            return false;
        }
        if self.category.is_some_and(|c| c != report.category) {
            return false;
        }
        if self.status.is_some_and(|s| s != report.status) {
            return false;
        }
        if self.date_from.is_some_and(|from| report.created_at < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| report.created_at > to) {
            return false;
        }
        if let Some(bbox) = &self.bbox
            && !bbox.contains(report.latitude, report.longitude)
        {
            return false;
        }
        if self.user_id.is_some_and(|u| u != report.user_id) {
            return false;
        }
        if let Some(hash) = &self.image_hash
            && report.image_hash.as_deref() != Some(hash.as_str())
        {
            return false;
        }
        true
    }
}
