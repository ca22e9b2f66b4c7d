//! Radius search and location-based duplicate detection.
//!
//! Both searches ask the store for the bounding box around the query point
//! (archived reports excluded) and then keep only the reports whose exact
//! haversine distance is within the radius.

use civic_report_issue_models::IssueCategory;
use civic_report_store::{ReportStore, StoreError};
use civic_report_store_models::{ReportQuery, ReportRef};
use uuid::Uuid;

use crate::distance::haversine_distance;
use crate::prefilter::search_box;

/// Radius used for duplicate checks when the caller has no preference.
pub const DEFAULT_DUPLICATE_RADIUS_METERS: f64 = 50.0;

/// A location-based duplicate check for a report about to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateCheck {
    /// Latitude of the new report.
    pub latitude: f64,
    /// Longitude of the new report.
    pub longitude: f64,
    /// Category of the new report.
    pub category: IssueCategory,
    /// Search radius in meters.
    pub radius_meters: f64,
    /// When set, only this user's reports count as duplicates. Independent
    /// reporters of the same issue are then not folded together.
    pub owning_user: Option<Uuid>,
}

impl DuplicateCheck {
    /// A check with the default 50 m radius and no user restriction.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64, category: IssueCategory) -> Self {
        Self {
            latitude,
            longitude,
            category,
            radius_meters: DEFAULT_DUPLICATE_RADIUS_METERS,
            owning_user: None,
        }
    }

    /// Overrides the search radius.
    #[must_use]
    pub const fn with_radius(mut self, radius_meters: f64) -> Self {
        self.radius_meters = radius_meters;
        self
    }

    /// Restricts matches to reports submitted by `user_id`.
    #[must_use]
    pub const fn for_user(mut self, user_id: Uuid) -> Self {
        self.owning_user = Some(user_id);
        self
    }
}

/// Returns every non-archived report within `radius_meters` of the point,
/// in store order.
///
/// # Errors
///
/// Returns [`StoreError`] if the store query fails.
pub fn find_nearby_reports(
    store: &dyn ReportStore,
    latitude: f64,
    longitude: f64,
    radius_meters: f64,
) -> Result<Vec<ReportRef>, StoreError> {
    let nearby = within_radius(
        store,
        latitude,
        longitude,
        radius_meters,
        ReportQuery::default(),
    )?;
    Ok(nearby.into_iter().map(|(report, _)| report).collect())
}

/// Returns the closest existing report that duplicates `check`, if any.
///
/// A duplicate is a non-archived report of the same category within the
/// radius, restricted to the owning user when one is given. Among several
/// candidates at the same minimum distance the first in store order wins.
///
/// # Errors
///
/// Returns [`StoreError`] if the store query fails.
pub fn check_for_duplicates(
    store: &dyn ReportStore,
    check: &DuplicateCheck,
) -> Result<Option<ReportRef>, StoreError> {
    // Category and user filtering commute with the radius filter, so they
    // are pushed down to the store to shrink the candidate set.
    let base = ReportQuery {
        category: Some(check.category),
        user_id: check.owning_user,
        ..ReportQuery::default()
    };
    let candidates = within_radius(
        store,
        check.latitude,
        check.longitude,
        check.radius_meters,
        base,
    )?;

    let mut best: Option<(ReportRef, f64)> = None;
    for (report, distance) in candidates {
        if best.as_ref().is_none_or(|(_, d)| distance < *d) {
            best = Some((report, distance));
        }
    }

    if let Some((report, distance)) = &best {
        log::debug!(
            "Duplicate {} report {} found {distance:.1}m from ({}, {})",
            check.category,
            report.id,
            check.latitude,
            check.longitude
        );
    }

    Ok(best.map(|(report, _)| report))
}

fn within_radius(
    store: &dyn ReportStore,
    latitude: f64,
    longitude: f64,
    radius_meters: f64,
    base: ReportQuery,
) -> Result<Vec<(ReportRef, f64)>, StoreError> {
    let query = ReportQuery {
        bbox: Some(search_box(latitude, longitude, radius_meters)),
        include_archived: false,
        ..base
    };
    let candidates = store.query(&query)?;
    let candidate_count = candidates.len();

    let hits: Vec<(ReportRef, f64)> = candidates
        .into_iter()
        .filter_map(|r| {
            let d = haversine_distance(latitude, longitude, r.latitude, r.longitude);
            (d <= radius_meters).then_some((r, d))
        })
        .collect();

    log::trace!(
        "Radius search {radius_meters}m around ({latitude}, {longitude}): {candidate_count} candidates, {} hits",
        hits.len()
    );

    Ok(hits)
}
