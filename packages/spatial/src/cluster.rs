//! Greedy single-pass spatial clustering.
//!
//! Each report joins the *first* existing cluster, in creation order,
//! whose centroid lies within the proximity threshold. It does not look
//! for the nearest one. The result therefore depends on input order: a
//! point between two clusters lands in whichever was created first.
//! Centroids are running means of member coordinates.

use civic_report_store_models::ReportRef;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::distance::haversine_distance;

/// Proximity used for map clustering when the caller has no preference.
pub const DEFAULT_CLUSTER_PROXIMITY_METERS: f64 = 100.0;

/// A group of nearby reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Centroid latitude.
    pub latitude: f64,
    /// Centroid longitude.
    pub longitude: f64,
    /// Number of member reports.
    pub count: usize,
    /// Member report IDs in assignment order.
    pub report_ids: Vec<Uuid>,
}

impl Cluster {
    fn seed(report: &ReportRef) -> Self {
        Self {
            latitude: report.latitude,
            longitude: report.longitude,
            count: 1,
            report_ids: vec![report.id],
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn absorb(&mut self, report: &ReportRef) {
        let n = self.count as f64;
        self.latitude = self.latitude.mul_add(n, report.latitude) / (n + 1.0);
        self.longitude = self.longitude.mul_add(n, report.longitude) / (n + 1.0);
        self.count += 1;
        self.report_ids.push(report.id);
    }

    fn distance_to(&self, report: &ReportRef) -> f64 {
        haversine_distance(
            report.latitude,
            report.longitude,
            self.latitude,
            self.longitude,
        )
    }
}

/// Groups reports into clusters of radius `proximity_meters` around a
/// running centroid. Clusters are returned in creation order.
///
/// Runs in O(n·k) for n reports and k clusters, so callers should keep the
/// input to an already filtered set.
pub fn cluster_reports<'a, I>(reports: I, proximity_meters: f64) -> Vec<Cluster>
where
    I: IntoIterator<Item = &'a ReportRef>,
{
    let mut clusters: Vec<Cluster> = Vec::new();
    let mut total = 0_usize;

    for report in reports {
        total += 1;
        match clusters
            .iter_mut()
            .find(|c| c.distance_to(report) <= proximity_meters)
        {
            Some(cluster) => cluster.absorb(report),
            None => clusters.push(Cluster::seed(report)),
        }
    }

    log::debug!(
        "Clustered {total} reports into {} clusters ({proximity_meters}m proximity)",
        clusters.len()
    );

    clusters
}
