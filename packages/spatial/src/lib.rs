#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geospatial routines for citizen reports.
//!
//! Haversine distance, bounding-box prefiltering, radius search and
//! duplicate detection against a [`civic_report_store::ReportStore`], and
//! the greedy clustering used for map clusters and heat zones.
//!
//! [`cluster_reports`] is first-fit: each report joins the first existing
//! cluster whose centroid is close enough, not the nearest one. The result
//! depends on input order, so callers that need reproducible clusters must
//! feed reports in a stable order.

pub mod cluster;
pub mod distance;
pub mod duplicate;
pub mod fingerprint;
pub mod prefilter;

pub use cluster::{Cluster, DEFAULT_CLUSTER_PROXIMITY_METERS, cluster_reports};
pub use distance::{EARTH_RADIUS_METERS, haversine_distance};
pub use duplicate::{
    DEFAULT_DUPLICATE_RADIUS_METERS, DuplicateCheck, check_for_duplicates, find_nearby_reports,
};
pub use fingerprint::{check_image_duplicate, compute_image_hash};
pub use prefilter::search_box;
